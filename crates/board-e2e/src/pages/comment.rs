// Comment page object, driven on a post detail page

use super::base::BasePage;
use crate::dialog::DialogDisposition;
use crate::error::Result;
use crate::resolver::{EntityKind, EntityResolver, ResolvedEntity};
use crate::selectors;
use crate::session::Session;
use crate::wait::TimeoutTier;

pub const COMMENT_CREATED: &str = "댓글이 작성되었습니다";
pub const COMMENT_UPDATED: &str = "댓글이 수정되었습니다";
pub const COMMENT_DELETED: &str = "댓글이 삭제되었습니다";

const CONTENT_FIELD: &str = r#"textarea[name="content"]"#;
const SUBMIT_BUTTON: &str = "댓글 작성";
const REPLY_BUTTON: &str = "작성";

pub struct CommentPage<'s> {
    base: BasePage<'s>,
    resolver: EntityResolver,
}

impl<'s> CommentPage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BasePage::new(session),
            resolver: EntityResolver::new(EntityKind::Comment),
        }
    }

    /// Posts a top-level comment and waits for it to show.
    pub async fn create(&self, content: &str) -> Result<ResolvedEntity> {
        tracing::info!(%content, "writing comment");
        self.base.fill(CONTENT_FIELD, content).await?;
        self.base
            .click(&selectors::role_named("button", SUBMIT_BUTTON))
            .await?;
        self.assert_visible(content).await?;
        self.resolve(content).await
    }

    /// Rewrites the comment showing `old` through its inline form.
    pub async fn edit(&self, old: &str, new: &str) -> Result<()> {
        let comment = self.resolve(old).await?;
        tracing::info!(id = comment.id, "editing comment");

        self.base.click(&comment.edit_trigger()).await?;
        self.base
            .expect_visible(&comment.edit_form(), TimeoutTier::Standard)
            .await?;
        self.base.fill(&comment.edit_input(), new).await?;
        self.base.click(&comment.submit_button("edit")).await?;
        self.assert_visible(new).await
    }

    /// Deletes the comment showing `content`, accepting the confirm dialog.
    pub async fn delete(&self, content: &str) -> Result<()> {
        let comment = self.resolve(content).await?;
        tracing::info!(id = comment.id, "deleting comment");

        let session = self.base.session();
        let ticket = session.dialogs().arm(DialogDisposition::Accept)?;
        self.base.click(&comment.submit_button("delete")).await?;
        ticket.settled(session.budget(TimeoutTier::Standard)).await?;
        self.assert_absent(content).await
    }

    /// Replies to the comment showing `parent`; returns the new reply.
    pub async fn reply(&self, parent: &str, content: &str) -> Result<ResolvedEntity> {
        let parent = self.resolve(parent).await?;
        tracing::info!(parent = parent.id, "replying to comment");

        self.base.click(&parent.reply_trigger()).await?;
        let form = parent.reply_form();
        self.base.expect_visible(&form, TimeoutTier::Standard).await?;
        self.base
            .fill(&selectors::chain([form.as_str(), CONTENT_FIELD]), content)
            .await?;
        self.base
            .click(&selectors::chain([
                form.clone(),
                selectors::role_named("button", REPLY_BUTTON),
            ]))
            .await?;
        // Replies render inside the parent's block.
        let scoped = selectors::chain([parent.thread(), self.resolver.candidates(content)]);
        self.base.expect_visible(&scoped, TimeoutTier::Standard).await?;
        let thread = self.base.first(&parent.thread()).await;
        self.resolver.resolve_within(&thread, content).await
    }

    pub async fn resolve(&self, content: &str) -> Result<ResolvedEntity> {
        self.resolver
            .resolve(self.base.session().page(), content)
            .await
    }

    pub async fn assert_visible(&self, content: &str) -> Result<()> {
        self.base
            .expect_visible(&self.resolver.candidates(content), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_absent(&self, content: &str) -> Result<()> {
        self.base
            .expect_hidden(&self.resolver.candidates(content), TimeoutTier::Standard)
            .await
    }

    /// The comment showing `content` is credited to `nickname`.
    ///
    /// The author line is the header directly before the content container;
    /// headers of nested replies further down the block are not consulted.
    pub async fn assert_authored_by(&self, content: &str, nickname: &str) -> Result<()> {
        let comment = self.resolve(content).await?;
        let header = selectors::chain([
            comment.container(),
            r#"xpath=preceding-sibling::div[contains(@class, "comment-header")][1]"#.to_string(),
            selectors::text(nickname),
        ]);
        self.base.expect_visible(&header, TimeoutTier::Standard).await
    }

    /// No comment input is offered (anonymous visitors).
    pub async fn assert_input_absent(&self) -> Result<()> {
        self.base
            .expect_hidden(CONTENT_FIELD, TimeoutTier::Standard)
            .await
    }

    /// The comment showing `content` offers neither edit nor delete.
    pub async fn assert_no_edit_delete_controls(&self, content: &str) -> Result<()> {
        let comment = self.resolve(content).await?;
        self.base
            .expect_hidden(&comment.edit_trigger(), TimeoutTier::Standard)
            .await?;
        self.base
            .expect_hidden(&comment.submit_button("delete"), TimeoutTier::Standard)
            .await
    }

    pub async fn expect_message(&self, message: &str) -> Result<()> {
        self.base
            .assert_text_visible(message, TimeoutTier::Standard)
            .await
    }
}
