// Post page object: create, edit, delete and detail assertions
//
// Posts are addressed by URL (`/posts/<id>`), never by rendered ids, so the
// detail-page URL is the post's handle.

use super::base::BasePage;
use super::home::POST_DETAIL_URL;
use crate::dialog::DialogDisposition;
use crate::error::{Error, Result};
use crate::selectors;
use crate::session::Session;
use crate::wait::{TimeoutTier, UrlPattern};
use regex::Regex;
use std::sync::LazyLock;

pub const POST_CREATED: &str = "게시글이 작성되었습니다";
pub const POST_UPDATED: &str = "게시글이 수정되었습니다";
pub const POST_DELETED: &str = "게시글이 삭제되었습니다";

const SUBMIT_BUTTON: &str = "작성하기|수정하기";
const EDIT_LINK: &str = "수정";
const COMMENT_HEADING: &str = "댓글";

static POST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/posts/(\d+)(?:[/?#]|$)").expect("static pattern"));

/// Extracts the post id from a detail or edit URL.
pub fn parse_post_id(url: &str) -> Option<u64> {
    POST_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub struct PostPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PostPage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    pub async fn open(&self, post_id: u64) -> Result<()> {
        self.base.navigate(&format!("/posts/{post_id}")).await
    }

    /// Publishes a post filed under `category_ids`; ends on its detail page.
    ///
    /// Returns the new post's id.
    pub async fn create(&self, title: &str, content: &str, category_ids: &[u64]) -> Result<u64> {
        tracing::info!(%title, categories = category_ids.len(), "creating post");
        self.base.navigate("/posts/new").await?;
        self.fill_form(title, content).await?;
        for id in category_ids {
            self.base
                .check(&selectors::checkbox_value(&id.to_string()))
                .await?;
        }
        self.submit().await
    }

    /// Rewrites the post on the current detail page; ends back on it.
    pub async fn edit(&self, title: &str, content: &str) -> Result<u64> {
        tracing::info!(%title, "editing post");
        self.base
            .click(&selectors::role_named("link", EDIT_LINK))
            .await?;
        self.base.assert_url_glob("**/edit").await?;
        self.base.wait_for_idle().await?;
        self.fill_form(title, content).await?;
        self.submit().await
    }

    /// Deletes the post on the current detail page, accepting the confirm
    /// dialog; ends on the home page.
    pub async fn delete(&self) -> Result<()> {
        let post_id = self.current_post_id().await?;
        tracing::info!(post_id, "deleting post");

        let session = self.base.session();
        let ticket = session.dialogs().arm(DialogDisposition::Accept)?;
        self.base.click(&self.delete_button(post_id)).await?;
        ticket.settled(session.budget(TimeoutTier::Standard)).await?;
        self.base.assert_url_glob("**/").await?;
        Ok(())
    }

    /// The detail page shows `title` as its heading and `content` in the body.
    pub async fn assert_content(&self, title: &str, content: &str) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::role_named("heading", title),
                TimeoutTier::Standard,
            )
            .await?;
        self.base
            .expect_visible(
                &selectors::chain([".post-content".to_string(), selectors::has_text(content)]),
                TimeoutTier::Standard,
            )
            .await
    }

    /// The main region credits `nickname`.
    pub async fn assert_author(&self, nickname: &str) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::chain(["main".to_string(), selectors::text(nickname)]),
                TimeoutTier::Standard,
            )
            .await
    }

    pub async fn assert_comment_section_visible(&self) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::role_named("heading", COMMENT_HEADING),
                TimeoutTier::Standard,
            )
            .await
    }

    /// Neither the edit link nor the delete form of the current post is shown.
    pub async fn assert_no_edit_delete_controls(&self) -> Result<()> {
        let post_id = self.current_post_id().await?;
        self.base
            .expect_hidden(
                &selectors::role_named("link", EDIT_LINK),
                TimeoutTier::Standard,
            )
            .await?;
        self.base
            .expect_hidden(&self.delete_button(post_id), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_edit_delete_controls(&self) -> Result<()> {
        let post_id = self.current_post_id().await?;
        self.base
            .expect_visible(
                &selectors::role_named("link", EDIT_LINK),
                TimeoutTier::Standard,
            )
            .await?;
        self.base
            .expect_visible(&self.delete_button(post_id), TimeoutTier::Standard)
            .await
    }

    /// Id of the post whose detail page is open.
    pub async fn current_post_id(&self) -> Result<u64> {
        let url = self
            .base
            .wait_for_url(&UrlPattern::regex(POST_DETAIL_URL)?, TimeoutTier::Standard)
            .await?;
        parse_post_id(&url).ok_or_else(|| Error::NavigationTimeout {
            pattern: POST_DETAIL_URL.to_string(),
            last_url: url,
            budget: self.base.config().budget(TimeoutTier::Standard),
        })
    }

    async fn fill_form(&self, title: &str, content: &str) -> Result<()> {
        self.base.fill(&selectors::field("title"), title).await?;
        self.base.fill(&selectors::field("content"), content).await
    }

    async fn submit(&self) -> Result<u64> {
        self.base
            .click(&selectors::role("button", SUBMIT_BUTTON))
            .await?;
        let url = self
            .base
            .wait_for_url(&UrlPattern::regex(POST_DETAIL_URL)?, TimeoutTier::Standard)
            .await?;
        let post_id = parse_post_id(&url).ok_or_else(|| Error::NavigationTimeout {
            pattern: POST_DETAIL_URL.to_string(),
            last_url: url.clone(),
            budget: self.base.config().budget(TimeoutTier::Standard),
        })?;
        tracing::debug!(post_id, "post saved");
        Ok(post_id)
    }

    fn delete_button(&self, post_id: u64) -> String {
        selectors::form_submit(&format!("/posts/{post_id}/delete"))
    }
}
