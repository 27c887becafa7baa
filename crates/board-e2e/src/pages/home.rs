// Home page object: post list, navigation links, category filter

use super::base::BasePage;
use crate::error::Result;
use crate::selectors;
use crate::session::Session;
use crate::wait::{TimeoutTier, UrlPattern};

pub const POST_LIST_HEADING: &str = "게시글 목록";

const WRITE_LINK: &str = "글쓰기";
const LOGIN_LINK: &str = "로그인";
const SIGNUP_LINK: &str = "회원가입";
const CATEGORY_LINK: &str = "카테고리 관리";

pub(crate) const POST_DETAIL_URL: &str = r"/posts/\d+$";

pub struct HomePage<'s> {
    base: BasePage<'s>,
}

impl<'s> HomePage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    pub async fn open(&self) -> Result<()> {
        self.base.navigate("/").await
    }

    pub async fn assert_post_list_heading(&self) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::role_named("heading", POST_LIST_HEADING),
                TimeoutTier::Standard,
            )
            .await
    }

    pub async fn click_write(&self) -> Result<()> {
        self.follow_link(WRITE_LINK, "**/posts/new").await
    }

    pub async fn click_login(&self) -> Result<()> {
        self.follow_link(LOGIN_LINK, "**/login").await
    }

    pub async fn click_signup(&self) -> Result<()> {
        self.follow_link(SIGNUP_LINK, "**/signup").await
    }

    pub async fn click_category_management(&self) -> Result<()> {
        self.follow_link(CATEGORY_LINK, "**/categories").await
    }

    /// Opens the first listed post whose link contains `title`.
    ///
    /// Returns the detail page URL.
    pub async fn open_post_by_title(&self, title: &str) -> Result<String> {
        let link = self.post_link(title);
        self.base.expect_visible(&link, TimeoutTier::Standard).await?;
        self.base.click(&link).await?;
        self.base
            .wait_for_url(&UrlPattern::regex(POST_DETAIL_URL)?, TimeoutTier::Standard)
            .await
    }

    /// Follows the category filter link containing `name`.
    pub async fn filter_by_category(&self, name: &str) -> Result<String> {
        let link = selectors::chain([
            selectors::link_with_href("categoryId="),
            selectors::has_text(name),
        ]);
        self.base.click(&link).await?;
        self.base
            .wait_for_url(&UrlPattern::regex("categoryId=")?, TimeoutTier::Standard)
            .await
    }

    pub async fn assert_post_listed(&self, title: &str) -> Result<()> {
        self.base
            .expect_visible(&self.post_link(title), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_post_not_listed(&self, title: &str) -> Result<()> {
        self.base
            .expect_hidden(&self.post_link(title), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_write_link_visible(&self) -> Result<()> {
        self.assert_link_visible(WRITE_LINK).await
    }

    pub async fn assert_login_link_visible(&self) -> Result<()> {
        self.assert_link_visible(LOGIN_LINK).await
    }

    async fn assert_link_visible(&self, name: &str) -> Result<()> {
        self.base
            .expect_visible(&selectors::role_named("link", name), TimeoutTier::Standard)
            .await
    }

    async fn follow_link(&self, name: &str, destination: &str) -> Result<()> {
        self.base.click(&selectors::role_named("link", name)).await?;
        self.base.assert_url_glob(destination).await?;
        Ok(())
    }

    fn post_link(&self, title: &str) -> String {
        selectors::chain([selectors::link_with_href("/posts/"), selectors::has_text(title)])
    }
}
