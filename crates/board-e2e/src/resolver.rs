// Entity resolver
//
// The board application renders no test ids. The only handle on a server
// record is the numeric suffix of a container's `id` attribute:
//
//   <span id="category-name-7">Rust</span>
//   <div id="comment-content-12">first!</div>
//
// Resolution finds the first container (document order) whose id follows the
// entity's convention and whose text contains the label, and extracts the
// number. Anything else is `EntityNotFound`: acting on a guessed id would
// touch an unrelated record. Handles are rebuilt on every lookup and must not
// be held across an edit or delete.
//
// Comments additionally assume a block layout: the content container's parent
// element holds the comment's header, its controls and every nested reply.
//
//   <div class="comment">
//     <div class="comment-header"><strong>nickname</strong></div>
//     <div id="comment-content-12">first!</div>
//     ...controls, reply-form-12...
//     <div class="comment">...replies to 12...</div>
//   </div>
//
// `ResolvedEntity::thread` relies on it to scope reply lookups, and comment
// authorship is read from the header just before the container.

use crate::error::{Error, Result};
use crate::selectors;
use playwright_rs::protocol::{Locator, Page};
use regex::Regex;
use std::sync::LazyLock;

static CATEGORY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^category-name-(\d+)$").expect("static pattern"));
static COMMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^comment-content-(\d+)$").expect("static pattern"));

/// Record types addressed through rendered identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Category,
    Comment,
}

impl EntityKind {
    /// Singular name used in element ids (`category-edit-7`)
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Comment => "comment",
        }
    }

    /// Path segment of form actions (`/categories/7/edit`)
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Category => "categories",
            EntityKind::Comment => "comments",
        }
    }

    /// Prefix of the container id carrying the record id
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Category => "category-name-",
            EntityKind::Comment => "comment-content-",
        }
    }

    /// Inline handler that reveals the edit form
    pub fn edit_handler(&self) -> &'static str {
        match self {
            EntityKind::Category => "editCategory",
            EntityKind::Comment => "editComment",
        }
    }

    /// Field name inside the edit form (`edit-name-7`)
    pub fn edit_field(&self) -> &'static str {
        match self {
            EntityKind::Category => "name",
            EntityKind::Comment => "content",
        }
    }

    fn id_pattern(&self) -> &'static Regex {
        match self {
            EntityKind::Category => &CATEGORY_ID,
            EntityKind::Comment => &COMMENT_ID,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Category => "Category",
            EntityKind::Comment => "Comment",
        })
    }
}

/// Extracts the record id from a container's `id` attribute.
pub fn parse_entity_id(kind: EntityKind, id_attr: &str) -> Option<u64> {
    kind.id_pattern()
        .captures(id_attr.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A record located in the current DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub kind: EntityKind,
    pub id: u64,
    /// Trimmed text of the matched container
    pub display_text: String,
}

impl ResolvedEntity {
    /// Button revealing the inline edit form: `editCategory(<id>)`.
    pub fn edit_trigger(&self) -> String {
        selectors::inline_handler(self.kind.edit_handler(), self.id)
    }

    /// Inline edit form: `category-edit-<id>`.
    pub fn edit_form(&self) -> String {
        selectors::id(&format!("{}-edit-{}", self.kind.slug(), self.id))
    }

    /// Input inside the edit form: `edit-name-<id>` / `edit-content-<id>`.
    pub fn edit_input(&self) -> String {
        selectors::id(&format!("edit-{}-{}", self.kind.edit_field(), self.id))
    }

    /// Form action path: `/categories/<id>/<verb>`.
    pub fn form_action(&self, verb: &str) -> String {
        format!("/{}/{}/{}", self.kind.plural(), self.id, verb)
    }

    /// Submit button of the form posting to [`Self::form_action`].
    pub fn submit_button(&self, verb: &str) -> String {
        selectors::form_submit(&self.form_action(verb))
    }

    /// Button revealing the reply form: `showReplyForm(<id>)`.
    pub fn reply_trigger(&self) -> String {
        selectors::inline_handler("showReplyForm", self.id)
    }

    /// Reply form container: `reply-form-<id>`.
    pub fn reply_form(&self) -> String {
        selectors::id(&format!("reply-form-{}", self.id))
    }

    /// The identifier container itself: `[id="comment-content-<id>"]`.
    pub fn container(&self) -> String {
        selectors::id(&format!("{}{}", self.kind.id_prefix(), self.id))
    }

    /// Block enclosing the container, its controls and nested replies
    /// (see the comment block layout above).
    pub fn thread(&self) -> String {
        selectors::chain([self.container(), "xpath=..".to_string()])
    }
}

/// Identifier-recovery protocol for one entity kind
#[derive(Debug, Clone, Copy)]
pub struct EntityResolver {
    kind: EntityKind,
}

impl EntityResolver {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Selector for every container of this kind that contains `label`.
    pub fn candidates(&self, label: &str) -> String {
        selectors::chain([
            selectors::id_prefix(self.kind.id_prefix()),
            selectors::has_text(label),
        ])
    }

    /// Resolves `label` anywhere on the page.
    pub async fn resolve(&self, page: &Page, label: &str) -> Result<ResolvedEntity> {
        let candidates = page.locator(&self.candidates(label)).await;
        self.resolve_candidates(&candidates, label).await
    }

    /// Resolves `label` inside `scope` only.
    ///
    /// Use when the label is not unique on the page.
    pub async fn resolve_within(&self, scope: &Locator, label: &str) -> Result<ResolvedEntity> {
        let candidates = scope.locator(&self.candidates(label));
        self.resolve_candidates(&candidates, label).await
    }

    async fn resolve_candidates(
        &self,
        candidates: &Locator,
        label: &str,
    ) -> Result<ResolvedEntity> {
        let count = candidates.count().await?;
        if count == 0 {
            return Err(self.not_found(
                label,
                format!(
                    "no element with id '{}<n>' contains the label",
                    self.kind.id_prefix()
                ),
            ));
        }
        if count > 1 {
            tracing::debug!(kind = %self.kind, label, count, "label matched several containers; taking the first");
        }

        let first = candidates.first();
        let id_attr = first.get_attribute("id").await?;
        let Some(id) = id_attr
            .as_deref()
            .and_then(|attr| parse_entity_id(self.kind, attr))
        else {
            return Err(self.not_found(
                label,
                format!(
                    "id attribute {:?} does not follow '{}<n>'",
                    id_attr.unwrap_or_default(),
                    self.kind.id_prefix()
                ),
            ));
        };

        let display_text = first
            .text_content()
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        tracing::debug!(kind = %self.kind, label, id, "entity resolved");
        Ok(ResolvedEntity {
            kind: self.kind,
            id,
            display_text,
        })
    }

    fn not_found(&self, label: &str, reason: String) -> Error {
        Error::EntityNotFound {
            kind: self.kind,
            label: label.to_string(),
            reason,
        }
    }
}
