// Reusable multi-page flows
//
// Plain async functions over a session. Scenarios compose these instead of
// registering global commands.

use crate::error::Result;
use crate::fixtures::{PostFixture, UserFixture};
use crate::pages::{AuthPage, CategoryPage, PostPage};
use crate::session::Session;

/// Signs `user` up; the session stays anonymous on the login page.
pub async fn register(session: &Session, user: &UserFixture) -> Result<()> {
    AuthPage::new(session).signup(user).await
}

/// Signs `user` up and logs in; the session ends authenticated on home.
pub async fn register_and_login(session: &Session, user: &UserFixture) -> Result<()> {
    let auth = AuthPage::new(session);
    auth.signup(user).await?;
    auth.login(&user.email, &user.password).await
}

/// Publishes `post` without categories; returns the new post's id.
pub async fn publish_post(session: &Session, post: &PostFixture) -> Result<u64> {
    PostPage::new(session)
        .create(&post.title, &post.content, &[])
        .await
}

/// Creates the category `post.category_name` and publishes `post` filed
/// under it; returns the post's id.
pub async fn publish_post_in_category(session: &Session, post: &PostFixture) -> Result<u64> {
    let category_id = create_category(session, &post.category_name).await?;
    PostPage::new(session)
        .create(&post.title, &post.content, &[category_id])
        .await
}

/// Creates a category; returns its id.
pub async fn create_category(session: &Session, name: &str) -> Result<u64> {
    let categories = CategoryPage::new(session);
    categories.create(name).await?;
    categories.resolve_id(name).await
}
