// Integration tests for posts: publishing, editing, deletion, listing and
// ownership gating

use board_e2e::pages::post::{POST_DELETED, POST_UPDATED};
use board_e2e::pages::{AuthPage, HomePage, PostPage};
use board_e2e::{Scenario, TestDataFactory, flows};

mod common;

#[tokio::test]
async fn test_publish_shows_detail() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    let user = TestDataFactory::new_user();
    flows::register_and_login(&session, &user).await?;

    let post = TestDataFactory::new_post();
    let post_id = flows::publish_post(&session, &post).await?;
    assert!(session.current_url().ends_with(&format!("/posts/{post_id}")));

    let detail = PostPage::new(&session);
    assert_eq!(detail.current_post_id().await?, post_id);
    detail.assert_content(&post.title, &post.content).await?;
    detail.assert_author(&user.nickname).await?;
    detail.assert_comment_section_visible().await?;
    detail.assert_edit_delete_controls().await?;

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_edit_and_delete_post() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    flows::register_and_login(&session, &TestDataFactory::new_user()).await?;

    let post = TestDataFactory::new_post();
    let post_id = flows::publish_post(&session, &post).await?;

    let detail = PostPage::new(&session);
    let new_title = TestDataFactory::edited(&post.title);
    let edited_id = detail.edit(&new_title, "수정된 내용입니다.").await?;
    assert_eq!(edited_id, post_id);
    detail.assert_content(&new_title, "수정된 내용입니다.").await?;
    HomePage::new(&session).open().await?;
    HomePage::new(&session).assert_post_listed(&new_title).await?;

    detail.open(post_id).await?;
    detail.delete().await?;
    let home = HomePage::new(&session);
    home.assert_post_not_listed(&new_title).await?;
    board_e2e::pages::BasePage::new(&session)
        .assert_text_visible(POST_DELETED, board_e2e::TimeoutTier::Standard)
        .await?;

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_home_navigation_and_category_filter() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    flows::register_and_login(&session, &TestDataFactory::new_user()).await?;

    let filed = TestDataFactory::new_post();
    let filed_id = flows::publish_post_in_category(&session, &filed).await?;
    let loose = TestDataFactory::new_post();
    flows::publish_post(&session, &loose).await?;

    let home = HomePage::new(&session);
    home.open().await?;
    home.assert_post_list_heading().await?;
    home.assert_write_link_visible().await?;
    home.assert_post_listed(&filed.title).await?;
    home.assert_post_listed(&loose.title).await?;

    let url = home.filter_by_category(&filed.category_name).await?;
    assert!(url.contains("categoryId="));
    home.assert_post_listed(&filed.title).await?;
    home.assert_post_not_listed(&loose.title).await?;

    let detail_url = home.open_post_by_title(&filed.title).await?;
    assert!(detail_url.ends_with(&format!("/posts/{filed_id}")));

    home.open().await?;
    home.click_write().await?;
    assert!(session.current_url().ends_with("/posts/new"));

    session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_non_owner_sees_no_controls() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let author_session = board.session().await?;
    let visitor_session = board.session().await?;

    flows::register_and_login(&author_session, &TestDataFactory::new_user()).await?;
    let post = TestDataFactory::new_post();
    let post_id = flows::publish_post(&author_session, &post).await?;

    // Two concurrent contexts, one application
    let visitor = TestDataFactory::new_user();
    flows::register_and_login(&visitor_session, &visitor).await?;
    AuthPage::new(&visitor_session)
        .assert_logged_in_as(&visitor.nickname)
        .await?;

    let detail = PostPage::new(&visitor_session);
    detail.open(post_id).await?;
    detail.assert_content(&post.title, &post.content).await?;
    detail.assert_no_edit_delete_controls().await?;

    PostPage::new(&author_session).assert_edit_delete_controls().await?;

    author_session.close().await?;
    visitor_session.close().await?;
    board.finish().await
}

#[tokio::test]
async fn test_post_scenarios() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    for scenario in [Scenario::PostDetailShowsAuthor, Scenario::OwnershipGating] {
        let session = board.session().await?;
        scenario.run(&session).await?;
        session.close().await?;
    }
    board.finish().await
}

#[tokio::test]
async fn test_updated_message_after_edit() -> anyhow::Result<()> {
    let board = common::Board::start().await?;
    let session = board.session().await?;
    flows::register_and_login(&session, &TestDataFactory::new_user()).await?;
    let post = TestDataFactory::new_post();
    flows::publish_post(&session, &post).await?;

    PostPage::new(&session).edit(&post.title, "본문만 수정").await?;
    board_e2e::pages::BasePage::new(&session)
        .assert_text_visible(POST_UPDATED, board_e2e::TimeoutTier::Standard)
        .await?;

    session.close().await?;
    board.finish().await
}
