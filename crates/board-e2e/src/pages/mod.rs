// Page objects
//
// One type per screen of the board application. Each borrows the scenario's
// `Session` through a shared `BasePage`, so a page object cannot outlive the
// browser context it drives.

pub mod auth;
pub mod base;
pub mod category;
pub mod comment;
pub mod home;
pub mod post;

pub use auth::AuthPage;
pub use base::BasePage;
pub use category::CategoryPage;
pub use comment::CommentPage;
pub use home::HomePage;
pub use post::PostPage;
