// In-memory board state
//
// One `Store` per stub instance behind a `parking_lot::Mutex`. Every record
// type shares a single id sequence so ids never collide across kinds, which
// keeps rendered identifiers (`category-name-3`, `comment-content-4`)
// unambiguous in tests.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

pub type UserId = u64;

/// Failures surfaced to the browser as flash messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("이미 사용 중인 이메일입니다.")]
    DuplicateEmail,

    #[error("이메일 또는 비밀번호가 올바르지 않습니다.")]
    BadCredentials,

    #[error("필수 항목을 입력해주세요.")]
    MissingField(&'static str),

    #[error("이미 존재하는 카테고리입니다.")]
    DuplicateCategory,

    #[error("요청한 항목을 찾을 수 없습니다.")]
    NotFound,

    #[error("권한이 없습니다.")]
    Forbidden,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: u64,
    pub author: UserId,
    pub title: String,
    pub content: String,
    pub categories: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: u64,
    pub post: u64,
    pub parent: Option<u64>,
    pub author: UserId,
    pub content: String,
}

/// Message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

#[derive(Debug, Default)]
struct BrowserSession {
    user: Option<UserId>,
    flash: Option<Flash>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<u64, Category>,
    posts: BTreeMap<u64, Post>,
    comments: BTreeMap<u64, Comment>,
    sessions: HashMap<String, BrowserSession>,
}

fn required(value: &str, field: &'static str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StoreError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

impl Store {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // --- browser sessions ---

    /// Opens a session and returns its cookie token.
    pub fn open_session(&mut self) -> String {
        let token = format!("s{:08x}", self.allocate());
        self.sessions.insert(token.clone(), BrowserSession::default());
        token
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    pub fn current_user(&self, token: &str) -> Option<&User> {
        let id = self.sessions.get(token)?.user?;
        self.users.get(&id)
    }

    pub fn set_flash(&mut self, token: &str, flash: Flash) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.flash = Some(flash);
        }
    }

    pub fn take_flash(&mut self, token: &str) -> Option<Flash> {
        self.sessions.get_mut(token)?.flash.take()
    }

    // --- users ---

    pub fn signup(&mut self, email: &str, password: &str, nickname: &str) -> StoreResult<UserId> {
        let email = required(email, "email")?;
        let nickname = required(nickname, "nickname")?;
        if password.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        if self.users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = self.allocate();
        self.users.insert(
            id,
            User {
                id,
                email,
                password: password.to_string(),
                nickname,
            },
        );
        Ok(id)
    }

    pub fn login(&mut self, token: &str, email: &str, password: &str) -> StoreResult<UserId> {
        let user = self
            .users
            .values()
            .find(|u| u.email == email.trim() && u.password == password)
            .ok_or(StoreError::BadCredentials)?;
        let id = user.id;
        if let Some(session) = self.sessions.get_mut(token) {
            session.user = Some(id);
        }
        Ok(id)
    }

    pub fn logout(&mut self, token: &str) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.user = None;
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    // --- categories ---

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category(&self, id: u64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn create_category(&mut self, name: &str) -> StoreResult<u64> {
        let name = required(name, "name")?;
        if self.categories.values().any(|c| c.name == name) {
            return Err(StoreError::DuplicateCategory);
        }
        let id = self.allocate();
        self.categories.insert(id, Category { id, name });
        Ok(id)
    }

    pub fn rename_category(&mut self, id: u64, name: &str) -> StoreResult<()> {
        let name = required(name, "name")?;
        if self.categories.values().any(|c| c.id != id && c.name == name) {
            return Err(StoreError::DuplicateCategory);
        }
        let category = self.categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        category.name = name;
        Ok(())
    }

    /// Removes the category and unfiles every post from it.
    pub fn delete_category(&mut self, id: u64) -> StoreResult<()> {
        self.categories.remove(&id).ok_or(StoreError::NotFound)?;
        for post in self.posts.values_mut() {
            post.categories.retain(|c| *c != id);
        }
        Ok(())
    }

    // --- posts ---

    /// Posts newest first, optionally only those filed under `category`.
    pub fn posts(&self, category: Option<u64>) -> Vec<&Post> {
        self.posts
            .values()
            .rev()
            .filter(|p| category.is_none_or(|c| p.categories.contains(&c)))
            .collect()
    }

    pub fn post(&self, id: u64) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn create_post(
        &mut self,
        author: UserId,
        title: &str,
        content: &str,
        categories: &[u64],
    ) -> StoreResult<u64> {
        let title = required(title, "title")?;
        let content = required(content, "content")?;
        let id = self.allocate();
        self.posts.insert(
            id,
            Post {
                id,
                author,
                title,
                content,
                categories: self.known_categories(categories),
            },
        );
        Ok(id)
    }

    pub fn update_post(
        &mut self,
        editor: UserId,
        id: u64,
        title: &str,
        content: &str,
        categories: &[u64],
    ) -> StoreResult<()> {
        let title = required(title, "title")?;
        let content = required(content, "content")?;
        let categories = self.known_categories(categories);
        let post = self.owned_post_mut(editor, id)?;
        post.title = title;
        post.content = content;
        post.categories = categories;
        Ok(())
    }

    /// Deletes the post and its comments.
    pub fn delete_post(&mut self, editor: UserId, id: u64) -> StoreResult<()> {
        self.owned_post_mut(editor, id)?;
        self.posts.remove(&id);
        self.comments.retain(|_, c| c.post != id);
        Ok(())
    }

    fn owned_post_mut(&mut self, editor: UserId, id: u64) -> StoreResult<&mut Post> {
        let post = self.posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if post.author != editor {
            return Err(StoreError::Forbidden);
        }
        Ok(post)
    }

    fn known_categories(&self, ids: &[u64]) -> Vec<u64> {
        let mut known: Vec<u64> = ids
            .iter()
            .copied()
            .filter(|id| self.categories.contains_key(id))
            .collect();
        known.sort_unstable();
        known.dedup();
        known
    }

    // --- comments ---

    /// Comments of `post` whose parent is `parent`, oldest first.
    pub fn comments(&self, post: u64, parent: Option<u64>) -> Vec<&Comment> {
        self.comments
            .values()
            .filter(|c| c.post == post && c.parent == parent)
            .collect()
    }

    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.comments.get(&id)
    }

    pub fn add_comment(
        &mut self,
        author: UserId,
        post: u64,
        parent: Option<u64>,
        content: &str,
    ) -> StoreResult<u64> {
        let content = required(content, "content")?;
        if !self.posts.contains_key(&post) {
            return Err(StoreError::NotFound);
        }
        if let Some(parent) = parent {
            if self.comments.get(&parent).is_none_or(|p| p.post != post) {
                return Err(StoreError::NotFound);
            }
        }
        let id = self.allocate();
        self.comments.insert(
            id,
            Comment {
                id,
                post,
                parent,
                author,
                content,
            },
        );
        Ok(id)
    }

    /// Returns the post the comment belongs to.
    pub fn edit_comment(&mut self, editor: UserId, id: u64, content: &str) -> StoreResult<u64> {
        let content = required(content, "content")?;
        let comment = self.comments.get_mut(&id).ok_or(StoreError::NotFound)?;
        if comment.author != editor {
            return Err(StoreError::Forbidden);
        }
        comment.content = content;
        Ok(comment.post)
    }

    /// Deletes the comment with its whole reply subtree; returns the post.
    pub fn delete_comment(&mut self, editor: UserId, id: u64) -> StoreResult<u64> {
        let comment = self.comments.get(&id).ok_or(StoreError::NotFound)?;
        if comment.author != editor {
            return Err(StoreError::Forbidden);
        }
        let post = comment.post;

        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            doomed.extend(
                self.comments
                    .values()
                    .filter(|c| c.parent == Some(parent))
                    .map(|c| c.id),
            );
            i += 1;
        }
        for id in doomed {
            self.comments.remove(&id);
        }
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user() -> (Store, String, UserId) {
        let mut store = Store::default();
        let token = store.open_session();
        let user = store.signup("a@example.com", "pw", "작성자").unwrap();
        store.login(&token, "a@example.com", "pw").unwrap();
        (store, token, user)
    }

    #[test]
    fn test_signup_rejects_duplicate_email() {
        let (mut store, _, _) = store_with_user();
        assert_eq!(
            store.signup("a@example.com", "x", "other"),
            Err(StoreError::DuplicateEmail)
        );
    }

    #[test]
    fn test_login_and_logout() {
        let (mut store, token, user) = store_with_user();
        assert_eq!(store.current_user(&token).map(|u| u.id), Some(user));

        assert_eq!(
            store.login(&token, "a@example.com", "wrong"),
            Err(StoreError::BadCredentials)
        );
        store.logout(&token);
        assert!(store.current_user(&token).is_none());
    }

    #[test]
    fn test_flash_is_shown_once() {
        let (mut store, token, _) = store_with_user();
        store.set_flash(&token, Flash::Success("ok".into()));
        assert_eq!(store.take_flash(&token), Some(Flash::Success("ok".into())));
        assert_eq!(store.take_flash(&token), None);
    }

    #[test]
    fn test_posts_are_owner_gated() {
        let (mut store, _, author) = store_with_user();
        let other = store.signup("b@example.com", "pw", "방문자").unwrap();
        let post = store.create_post(author, "제목", "본문", &[]).unwrap();

        assert_eq!(
            store.update_post(other, post, "x", "y", &[]),
            Err(StoreError::Forbidden)
        );
        assert_eq!(store.delete_post(other, post), Err(StoreError::Forbidden));
        store.delete_post(author, post).unwrap();
        assert!(store.post(post).is_none());
    }

    #[test]
    fn test_category_filter_and_delete() {
        let (mut store, _, author) = store_with_user();
        let rust = store.create_category("Rust").unwrap();
        let go = store.create_category("Go").unwrap();
        let filed = store.create_post(author, "filed", "x", &[rust, 999]).unwrap();
        store.create_post(author, "loose", "x", &[]).unwrap();

        assert_eq!(store.post(filed).unwrap().categories, vec![rust]);
        let in_rust: Vec<_> = store.posts(Some(rust)).iter().map(|p| p.id).collect();
        assert_eq!(in_rust, vec![filed]);
        assert!(store.posts(Some(go)).is_empty());
        assert_eq!(store.posts(None).len(), 2);

        store.delete_category(rust).unwrap();
        assert!(store.post(filed).unwrap().categories.is_empty());
        assert_eq!(store.delete_category(rust), Err(StoreError::NotFound));
    }

    #[test]
    fn test_rename_category_keeps_names_unique() {
        let (mut store, _, _) = store_with_user();
        let a = store.create_category("A").unwrap();
        store.create_category("B").unwrap();
        assert_eq!(store.rename_category(a, "B"), Err(StoreError::DuplicateCategory));
        store.rename_category(a, "A (수정됨)").unwrap();
        assert_eq!(store.category(a).unwrap().name, "A (수정됨)");
    }

    #[test]
    fn test_delete_comment_removes_replies() {
        let (mut store, _, author) = store_with_user();
        let post = store.create_post(author, "t", "c", &[]).unwrap();
        let root = store.add_comment(author, post, None, "부모").unwrap();
        let reply = store.add_comment(author, post, Some(root), "답글").unwrap();
        let nested = store.add_comment(author, post, Some(reply), "답글의 답글").unwrap();
        let sibling = store.add_comment(author, post, None, "형제").unwrap();

        assert_eq!(store.delete_comment(author, root), Ok(post));
        assert!(store.comment(reply).is_none());
        assert!(store.comment(nested).is_none());
        assert!(store.comment(sibling).is_some());
    }

    #[test]
    fn test_reply_parent_must_belong_to_post() {
        let (mut store, _, author) = store_with_user();
        let first = store.create_post(author, "1", "c", &[]).unwrap();
        let second = store.create_post(author, "2", "c", &[]).unwrap();
        let comment = store.add_comment(author, first, None, "c").unwrap();
        assert_eq!(
            store.add_comment(author, second, Some(comment), "x"),
            Err(StoreError::NotFound)
        );
    }
}
