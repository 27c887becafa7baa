// Integration tests for the authentication page object
//
// Runs against the in-memory stand-in application in a real browser.

use board_e2e::pages::auth::{LOGIN_FAILURE, SIGNUP_SUCCESS};
use board_e2e::pages::{AuthPage, BasePage, HomePage};
use board_e2e::{Error, Scenario, TestDataFactory, TimeoutTier, flows};

mod common;

#[tokio::test]
async fn test_signup_then_login_and_logout() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    let auth = AuthPage::new(&session);
    let user = TestDataFactory::new_user();

    auth.signup(&user).await?;
    auth.assert_on_login_page().await?;
    auth.expect_success_message(SIGNUP_SUCCESS).await?;

    auth.login(&user.email, &user.password).await?;
    auth.assert_logged_in_as(&user.nickname).await?;
    HomePage::new(&session).assert_post_list_heading().await?;

    auth.logout().await?;
    auth.assert_logged_out().await?;
    assert!(session.current_url().ends_with('/'));

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    let user = TestDataFactory::new_user();
    flows::register(&session, &user).await?;

    let auth = AuthPage::new(&session);
    auth.login_expect_failure(&user.email, "not-the-password").await?;
    auth.expect_error_message(LOGIN_FAILURE).await?;
    assert!(session.current_url().ends_with("/login"));

    // A real login still works afterwards
    auth.login(&user.email, &user.password).await?;
    auth.assert_logged_in_as(&user.nickname).await?;

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_login_of_unknown_user_is_a_navigation_timeout() -> anyhow::Result<()> {
    let board = common::Board::start_with(|c| c.with_timeouts(common::quick_timeouts())).await?;
    let session = board.session().await?;

    let err = AuthPage::new(&session)
        .login("nobody@example.com", "test1234")
        .await
        .unwrap_err();
    assert!(
        matches!(err.root(), Error::NavigationTimeout { .. }),
        "unexpected error: {err}"
    );
    assert!(err.is_scenario_failure());

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_sessions_are_isolated() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let first = board.session().await?;
    let second = board.session().await?;

    let user = TestDataFactory::new_user();
    flows::register_and_login(&first, &user).await?;
    AuthPage::new(&first).assert_logged_in_as(&user.nickname).await?;

    // The second context has its own cookies
    HomePage::new(&second).open().await?;
    AuthPage::new(&second).assert_logged_out().await?;

    first.close().await?;
    second.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_auth_scenarios() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    for scenario in [Scenario::SignupRedirectsToLogin, Scenario::WrongPasswordRejected] {
        let session = board.session().await?;
        scenario.run(&session).await?;
        session.close().await?;
    }
    board.finish().await
}

#[tokio::test]
async fn test_navigation_links_follow_identity() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    let home = HomePage::new(&session);

    home.open().await?;
    home.click_login().await?;
    home.open().await?;
    home.click_signup().await?;

    flows::register_and_login(&session, &TestDataFactory::new_user()).await?;
    home.open().await?;
    BasePage::new(&session)
        .assert_text_hidden("로그인", TimeoutTier::Standard)
        .await?;
    home.click_category_management().await?;
    assert!(session.current_url().ends_with("/categories"));

    session.close().await?;
    board.finish().await
}
