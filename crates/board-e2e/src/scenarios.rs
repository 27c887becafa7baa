// End-to-end scenarios
//
// Each scenario provisions its own users and records through the UI, so any
// number of them can run concurrently in separate sessions against one
// application instance.

use crate::error::{Error, Result};
use crate::fixtures::TestDataFactory;
use crate::flows;
use crate::pages::auth::SIGNUP_SUCCESS;
use crate::pages::category::{CATEGORY_CREATED, CATEGORY_DELETED, CATEGORY_UPDATED};
use crate::pages::comment::{COMMENT_CREATED, COMMENT_DELETED};
use crate::pages::{AuthPage, BasePage, CategoryPage, CommentPage, HomePage, PostPage};
use crate::session::Session;
use crate::wait::TimeoutTier;
use std::str::FromStr;

/// Every scenario the suite knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    CategoryRoundTrip,
    SignupRedirectsToLogin,
    WrongPasswordRejected,
    PostDetailShowsAuthor,
    OwnershipGating,
    ReplyNesting,
    IdempotentDeletion,
    UnauthenticatedGating,
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Scenario::CategoryRoundTrip,
        Scenario::SignupRedirectsToLogin,
        Scenario::WrongPasswordRejected,
        Scenario::PostDetailShowsAuthor,
        Scenario::OwnershipGating,
        Scenario::ReplyNesting,
        Scenario::IdempotentDeletion,
        Scenario::UnauthenticatedGating,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::CategoryRoundTrip => "category-round-trip",
            Scenario::SignupRedirectsToLogin => "signup-redirects-to-login",
            Scenario::WrongPasswordRejected => "wrong-password-rejected",
            Scenario::PostDetailShowsAuthor => "post-detail-shows-author",
            Scenario::OwnershipGating => "ownership-gating",
            Scenario::ReplyNesting => "reply-nesting",
            Scenario::IdempotentDeletion => "idempotent-deletion",
            Scenario::UnauthenticatedGating => "unauthenticated-gating",
        }
    }

    /// Runs the scenario in `session`; errors carry the scenario name.
    pub async fn run(self, session: &Session) -> Result<()> {
        let name = self.name();
        let session_id = session.id();
        tracing::info!(scenario = name, session = session_id, "scenario started");

        match self.dispatch(session).await {
            Ok(()) => {
                tracing::info!(scenario = name, session = session_id, "scenario passed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(scenario = name, session = session_id, error = %e, "scenario failed");
                Err(e.context(format!("scenario {name}")))
            }
        }
    }

    async fn dispatch(self, session: &Session) -> Result<()> {
        match self {
            Scenario::CategoryRoundTrip => category_round_trip(session).await,
            Scenario::SignupRedirectsToLogin => signup_redirects_to_login(session).await,
            Scenario::WrongPasswordRejected => wrong_password_rejected(session).await,
            Scenario::PostDetailShowsAuthor => post_detail_shows_author(session).await,
            Scenario::OwnershipGating => ownership_gating(session).await,
            Scenario::ReplyNesting => reply_nesting(session).await,
            Scenario::IdempotentDeletion => idempotent_deletion(session).await,
            Scenario::UnauthenticatedGating => unauthenticated_gating(session).await,
        }
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown scenario '{s}'")))
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A category created as N and renamed to M is listed as M, and no row is
/// named exactly N any more.
pub async fn category_round_trip(session: &Session) -> Result<()> {
    flows::register_and_login(session, &TestDataFactory::new_user()).await?;

    let categories = CategoryPage::new(session);
    let original = TestDataFactory::new_category_name();
    let renamed = TestDataFactory::edited(&original);

    categories.create(&original).await?;
    categories.expect_message(CATEGORY_CREATED).await?;

    categories.edit(&original, &renamed).await?;
    categories.expect_message(CATEGORY_UPDATED).await?;
    categories.assert_listed(&renamed).await?;

    let leftover = categories.count_exact(&original).await?;
    if leftover != 0 {
        return Err(Error::AssertionFailed(format!(
            "{leftover} categories still named '{original}' after renaming"
        )));
    }
    Ok(())
}

/// Signing up redirects to the login page with the completion message.
pub async fn signup_redirects_to_login(session: &Session) -> Result<()> {
    let user = TestDataFactory::new_user();
    flows::register(session, &user).await?;

    let auth = AuthPage::new(session);
    auth.assert_on_login_page().await?;
    auth.expect_success_message(SIGNUP_SUCCESS).await
}

/// A wrong password keeps the visitor on the login page with an error.
pub async fn wrong_password_rejected(session: &Session) -> Result<()> {
    let user = TestDataFactory::new_user();
    flows::register(session, &user).await?;

    let auth = AuthPage::new(session);
    auth.login_expect_failure(&user.email, "wrongpassword").await?;
    auth.assert_on_login_page().await?;
    BasePage::new(session)
        .assert_text_matches("이메일 또는 비밀번호", TimeoutTier::Standard)
        .await?;
    Ok(())
}

/// A published post's detail page shows its title, body and author.
pub async fn post_detail_shows_author(session: &Session) -> Result<()> {
    let user = TestDataFactory::new_user();
    flows::register_and_login(session, &user).await?;

    let post = TestDataFactory::new_post();
    flows::publish_post(session, &post).await?;

    let detail = PostPage::new(session);
    detail.assert_content(&post.title, &post.content).await?;
    detail.assert_author(&user.nickname).await?;
    detail.assert_comment_section_visible().await
}

/// Another user viewing a post gets no edit or delete affordance.
pub async fn ownership_gating(session: &Session) -> Result<()> {
    let author = TestDataFactory::new_user();
    flows::register_and_login(session, &author).await?;
    let post = TestDataFactory::new_post();
    let post_id = flows::publish_post(session, &post).await?;
    PostPage::new(session).assert_edit_delete_controls().await?;

    let auth = AuthPage::new(session);
    auth.logout().await?;

    let visitor = TestDataFactory::new_user();
    flows::register_and_login(session, &visitor).await?;
    auth.assert_logged_in_as(&visitor.nickname).await?;

    let detail = PostPage::new(session);
    detail.open(post_id).await?;
    detail.assert_content(&post.title, &post.content).await?;
    detail.assert_no_edit_delete_controls().await
}

/// A reply shows on the parent's page, credited to the replying user.
pub async fn reply_nesting(session: &Session) -> Result<()> {
    let user = TestDataFactory::new_user();
    flows::register_and_login(session, &user).await?;
    flows::publish_post(session, &TestDataFactory::new_post()).await?;

    let comments = CommentPage::new(session);
    let parent_text = TestDataFactory::new_comment();
    let parent = comments.create(&parent_text).await?;
    comments.expect_message(COMMENT_CREATED).await?;

    let reply_text = TestDataFactory::new_comment();
    let reply = comments.reply(&parent_text, &reply_text).await?;
    if reply.id == parent.id {
        return Err(Error::AssertionFailed(format!(
            "reply resolved to its parent comment {}",
            parent.id
        )));
    }

    comments.assert_visible(&parent_text).await?;
    comments.assert_visible(&reply_text).await?;
    comments.assert_authored_by(&reply_text, &user.nickname).await
}

/// Deleted categories and comments stay gone; deleting them again finds
/// nothing to act on.
pub async fn idempotent_deletion(session: &Session) -> Result<()> {
    flows::register_and_login(session, &TestDataFactory::new_user()).await?;

    let categories = CategoryPage::new(session);
    let name = TestDataFactory::new_category_name();
    categories.create(&name).await?;
    categories.delete(&name).await?;
    categories.expect_message(CATEGORY_DELETED).await?;

    categories.open().await?;
    categories.assert_absent(&name).await?;
    expect_entity_not_found(categories.delete(&name).await, &name)?;

    let post_id = flows::publish_post(session, &TestDataFactory::new_post()).await?;
    let comments = CommentPage::new(session);
    let body = TestDataFactory::new_comment();
    comments.create(&body).await?;
    comments.delete(&body).await?;
    comments.expect_message(COMMENT_DELETED).await?;

    PostPage::new(session).open(post_id).await?;
    comments.assert_absent(&body).await?;
    expect_entity_not_found(comments.delete(&body).await, &body)
}

/// After logout a post offers a login link and no comment input, and the
/// write form redirects to login.
pub async fn unauthenticated_gating(session: &Session) -> Result<()> {
    flows::register_and_login(session, &TestDataFactory::new_user()).await?;
    let post_id = flows::publish_post(session, &TestDataFactory::new_post()).await?;

    let auth = AuthPage::new(session);
    auth.logout().await?;

    PostPage::new(session).open(post_id).await?;
    auth.assert_logged_out().await?;
    CommentPage::new(session).assert_input_absent().await?;

    BasePage::new(session).navigate("/posts/new").await?;
    auth.assert_on_login_page().await?;

    HomePage::new(session).open().await?;
    HomePage::new(session).assert_login_link_visible().await
}

fn expect_entity_not_found(outcome: Result<()>, label: &str) -> Result<()> {
    match outcome {
        Err(e) if matches!(e.root(), Error::EntityNotFound { .. }) => Ok(()),
        Err(e) => Err(e),
        Ok(()) => Err(Error::AssertionFailed(format!(
            "'{label}' was deleted twice; it must not be listed after the first deletion"
        ))),
    }
}
