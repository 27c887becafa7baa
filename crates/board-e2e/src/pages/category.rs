// Category management page object
//
// Edit and delete go through the entity resolver: the row is found by its
// visible name, its numeric id recovered, and the id-scoped controls driven.

use super::base::BasePage;
use crate::dialog::DialogDisposition;
use crate::error::Result;
use crate::resolver::{EntityKind, EntityResolver, ResolvedEntity};
use crate::selectors;
use crate::session::Session;
use crate::wait::TimeoutTier;

pub const CATEGORY_CREATED: &str = "카테고리가 생성되었습니다";
pub const CATEGORY_UPDATED: &str = "카테고리가 수정되었습니다";
pub const CATEGORY_DELETED: &str = "카테고리가 삭제되었습니다";
pub const EMPTY_STATE: &str = "등록된 카테고리가 없습니다";

const NAME_FIELD: &str = "categoryName";
const ADD_BUTTON: &str = "추가하기";

pub struct CategoryPage<'s> {
    base: BasePage<'s>,
    resolver: EntityResolver,
}

impl<'s> CategoryPage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BasePage::new(session),
            resolver: EntityResolver::new(EntityKind::Category),
        }
    }

    pub async fn open(&self) -> Result<()> {
        self.base.navigate("/categories").await
    }

    /// Adds a category and waits for it to be listed.
    pub async fn create(&self, name: &str) -> Result<()> {
        tracing::info!(%name, "creating category");
        self.open().await?;
        self.base.fill(&selectors::id(NAME_FIELD), name).await?;
        self.base
            .click(&selectors::role_named("button", ADD_BUTTON))
            .await?;
        self.assert_listed(name).await
    }

    /// Renames the category listed as `old_name` through its inline form.
    pub async fn edit(&self, old_name: &str, new_name: &str) -> Result<()> {
        let category = self.resolve(old_name).await?;
        tracing::info!(id = category.id, %old_name, %new_name, "renaming category");

        self.base.click(&category.edit_trigger()).await?;
        self.base
            .expect_visible(&category.edit_form(), TimeoutTier::Standard)
            .await?;
        self.base.fill(&category.edit_input(), new_name).await?;
        self.base.click(&category.submit_button("edit")).await?;
        self.assert_listed(new_name).await
    }

    /// Deletes the category listed as `name`, accepting the confirm dialog.
    ///
    /// Fails with `EntityNotFound` when no such category is listed.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let category = self.resolve(name).await?;
        tracing::info!(id = category.id, %name, "deleting category");

        let session = self.base.session();
        let ticket = session.dialogs().arm(DialogDisposition::Accept)?;
        self.base.click(&category.submit_button("delete")).await?;
        ticket.settled(session.budget(TimeoutTier::Standard)).await?;
        self.assert_absent(name).await
    }

    /// Resolves the row showing `name` on the current page.
    pub async fn resolve(&self, name: &str) -> Result<ResolvedEntity> {
        self.resolver.resolve(self.base.session().page(), name).await
    }

    /// Numeric id of the category listed as `name`.
    pub async fn resolve_id(&self, name: &str) -> Result<u64> {
        Ok(self.resolve(name).await?.id)
    }

    /// Number of rows whose whole name is exactly `name`.
    ///
    /// Label lookups match substrings, so `assert_absent("A")` also waits on a
    /// row named `A (수정됨)`; this count tells the two apart.
    pub async fn count_exact(&self, name: &str) -> Result<usize> {
        let rows = self
            .base
            .session()
            .locator(&self.resolver.candidates(name))
            .await;
        let mut exact = 0;
        for i in 0..rows.count().await? {
            let text = rows.nth(i as i32).text_content().await?;
            if text.as_deref().map(str::trim) == Some(name) {
                exact += 1;
            }
        }
        Ok(exact)
    }

    pub async fn assert_listed(&self, name: &str) -> Result<()> {
        self.base
            .expect_visible(&self.resolver.candidates(name), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_absent(&self, name: &str) -> Result<()> {
        self.base
            .expect_hidden(&self.resolver.candidates(name), TimeoutTier::Standard)
            .await
    }

    pub async fn assert_empty_state(&self) -> Result<()> {
        self.base
            .assert_text_visible(EMPTY_STATE, TimeoutTier::Standard)
            .await
    }

    pub async fn expect_message(&self, message: &str) -> Result<()> {
        self.base
            .assert_text_visible(message, TimeoutTier::Standard)
            .await
    }
}
