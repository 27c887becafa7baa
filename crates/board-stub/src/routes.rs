// Request handlers
//
// Every request is tied to a browser session through the `board_session`
// cookie; one is issued on first contact. Mutating forms answer with 303
// redirects and leave a flash message for the page they redirect to.

use crate::render;
use crate::store::{Flash, Store, StoreError, StoreResult, User};
use axum::Router;
use axum::extract::{Path, Query, RawForm, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "board_session";

pub const SIGNUP_DONE: &str = "회원가입이 완료되었습니다. 로그인해주세요.";
pub const POST_CREATED: &str = "게시글이 작성되었습니다.";
pub const POST_UPDATED: &str = "게시글이 수정되었습니다.";
pub const POST_DELETED: &str = "게시글이 삭제되었습니다.";
pub const CATEGORY_CREATED: &str = "카테고리가 생성되었습니다.";
pub const CATEGORY_UPDATED: &str = "카테고리가 수정되었습니다.";
pub const CATEGORY_DELETED: &str = "카테고리가 삭제되었습니다.";
pub const COMMENT_CREATED: &str = "댓글이 작성되었습니다.";
pub const COMMENT_UPDATED: &str = "댓글이 수정되었습니다.";
pub const COMMENT_DELETED: &str = "댓글이 삭제되었습니다.";

/// Shared handler state
#[derive(Clone, Default)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/posts", post(create_post))
        .route("/posts/new", get(new_post_page))
        .route("/posts/{id}", get(post_detail))
        .route("/posts/{id}/edit", get(edit_post_page).post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
        .route("/posts/{id}/comments", post(add_comment))
        .route("/categories", get(categories_page).post(create_category))
        .route("/categories/{id}/edit", post(rename_category))
        .route("/categories/{id}/delete", post(delete_category))
        .route("/comments/{id}/edit", post(edit_comment))
        .route("/comments/{id}/delete", post(delete_comment))
        .with_state(state)
}

/// The browser session a request belongs to
struct Visit {
    token: String,
    fresh: bool,
}

impl Visit {
    fn begin(store: &mut Store, headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.to_string())
            .filter(|token| store.has_session(token));

        match existing {
            Some(token) => Self { token, fresh: false },
            None => Self {
                token: store.open_session(),
                fresh: true,
            },
        }
    }

    fn finish(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.fresh {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.token);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().insert(SET_COOKIE, value);
            }
        }
        response
    }

    fn page(self, store: &mut Store, title: &str, body: &str) -> Response {
        let flash = store.take_flash(&self.token);
        let user = store.current_user(&self.token).cloned();
        let html = render::layout(title, user.as_ref(), flash, body);
        self.finish(Html(html))
    }

    fn redirect(self, to: &str) -> Response {
        self.finish(Redirect::to(to))
    }

    /// Redirects with a flash message for the destination page.
    fn redirect_with(self, store: &mut Store, flash: Flash, to: &str) -> Response {
        store.set_flash(&self.token, flash);
        self.redirect(to)
    }

    fn not_found(self, store: &mut Store) -> Response {
        let mut response = self.page(store, "404", "<h2>페이지를 찾을 수 없습니다.</h2>");
        *response.status_mut() = StatusCode::NOT_FOUND;
        response
    }
}

/// Decoded `application/x-www-form-urlencoded` body with repeated keys
struct FormData(Vec<(String, String)>);

impl FormData {
    fn parse(raw: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(raw).into_owned().collect())
    }

    fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    fn ids(&self, name: &str) -> Vec<u64> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .filter_map(|(_, value)| value.trim().parse().ok())
            .collect()
    }
}

fn flash_error(err: StoreError) -> Flash {
    Flash::Error(err.to_string())
}

fn with_user<F>(app: &AppState, headers: &HeaderMap, action: F) -> Response
where
    F: FnOnce(&mut Store, Visit, User) -> Response,
{
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, headers);
    match store.current_user(&visit.token).cloned() {
        Some(user) => action(&mut *store, visit, user),
        None => visit.redirect("/login"),
    }
}

fn outcome<T>(
    store: &mut Store,
    visit: Visit,
    result: StoreResult<T>,
    success: (&str, &str),
    failure_to: &str,
) -> Response {
    match result {
        Ok(_) => visit.redirect_with(store, Flash::Success(success.0.to_string()), success.1),
        Err(err) => visit.redirect_with(store, flash_error(err), failure_to),
    }
}

#[derive(Debug, Deserialize)]
struct HomeQuery {
    #[serde(rename = "categoryId")]
    category_id: Option<u64>,
}

async fn home(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HomeQuery>,
) -> Response {
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    let body = render::home(&store, &store.posts(query.category_id));
    visit.page(&mut store, "게시판", &body)
}

async fn signup_page(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    visit.page(&mut store, "회원가입", &render::signup())
}

async fn signup(State(app): State<AppState>, headers: HeaderMap, RawForm(raw): RawForm) -> Response {
    let form = FormData::parse(&raw);
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    let result = store.signup(form.get("email"), form.get("password"), form.get("nickname"));
    if let Ok(id) = &result {
        tracing::debug!(user = *id, "user signed up");
    }
    outcome(&mut store, visit, result, (SIGNUP_DONE, "/login"), "/signup")
}

async fn login_page(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    visit.page(&mut store, "로그인", &render::login())
}

async fn login(State(app): State<AppState>, headers: HeaderMap, RawForm(raw): RawForm) -> Response {
    let form = FormData::parse(&raw);
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    match store.login(&visit.token, form.get("email"), form.get("password")) {
        Ok(_) => visit.redirect("/"),
        Err(err) => visit.redirect_with(&mut store, flash_error(err), "/login"),
    }
}

async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    store.logout(&visit.token);
    visit.redirect("/")
}

async fn new_post_page(State(app): State<AppState>, headers: HeaderMap) -> Response {
    with_user(&app, &headers, |store, visit, _| {
        let body = render::post_form(store, None);
        visit.page(store, "게시글 작성", &body)
    })
}

async fn create_post(State(app): State<AppState>, headers: HeaderMap, RawForm(raw): RawForm) -> Response {
    let form = FormData::parse(&raw);
    with_user(&app, &headers, |store, visit, user| {
        match store.create_post(user.id, form.get("title"), form.get("content"), &form.ids("categoryIds")) {
            Ok(id) => visit.redirect_with(
                store,
                Flash::Success(POST_CREATED.to_string()),
                &format!("/posts/{id}"),
            ),
            Err(err) => visit.redirect_with(store, flash_error(err), "/posts/new"),
        }
    })
}

async fn post_detail(State(app): State<AppState>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    let mut store = app.store.lock();
    let visit = Visit::begin(&mut store, &headers);
    let Some(post) = store.post(id).cloned() else {
        return visit.not_found(&mut store);
    };
    let viewer = store.current_user(&visit.token).cloned();
    let body = render::post_detail(&store, &post, viewer.as_ref());
    visit.page(&mut store, &post.title, &body)
}

async fn edit_post_page(State(app): State<AppState>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    with_user(&app, &headers, |store, visit, user| {
        let Some(post) = store.post(id).cloned() else {
            return visit.not_found(store);
        };
        if post.author != user.id {
            return visit.redirect_with(store, flash_error(StoreError::Forbidden), &format!("/posts/{id}"));
        }
        let body = render::post_form(store, Some(&post));
        visit.page(store, "게시글 수정", &body)
    })
}

async fn update_post(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    RawForm(raw): RawForm,
) -> Response {
    let form = FormData::parse(&raw);
    with_user(&app, &headers, |store, visit, user| {
        let detail = format!("/posts/{id}");
        match store.update_post(user.id, id, form.get("title"), form.get("content"), &form.ids("categoryIds")) {
            Ok(()) => visit.redirect_with(store, Flash::Success(POST_UPDATED.to_string()), &detail),
            Err(err @ StoreError::MissingField(_)) => {
                visit.redirect_with(store, flash_error(err), &format!("/posts/{id}/edit"))
            }
            Err(err) => visit.redirect_with(store, flash_error(err), &detail),
        }
    })
}

async fn delete_post(State(app): State<AppState>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    with_user(&app, &headers, |store, visit, user| {
        let result = store.delete_post(user.id, id);
        outcome(store, visit, result, (POST_DELETED, "/"), &format!("/posts/{id}"))
    })
}

async fn add_comment(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(post): Path<u64>,
    RawForm(raw): RawForm,
) -> Response {
    let form = FormData::parse(&raw);
    let parent = form.ids("parentId").first().copied();
    with_user(&app, &headers, |store, visit, user| {
        let detail = format!("/posts/{post}");
        let result = store.add_comment(user.id, post, parent, form.get("content"));
        outcome(store, visit, result, (COMMENT_CREATED, &detail), &detail)
    })
}

async fn edit_comment(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    RawForm(raw): RawForm,
) -> Response {
    let form = FormData::parse(&raw);
    with_user(&app, &headers, |store, visit, user| {
        let back = comment_page(store, id);
        let result = store.edit_comment(user.id, id, form.get("content"));
        outcome(store, visit, result, (COMMENT_UPDATED, &back), &back)
    })
}

async fn delete_comment(State(app): State<AppState>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    with_user(&app, &headers, |store, visit, user| {
        let back = comment_page(store, id);
        let result = store.delete_comment(user.id, id);
        outcome(store, visit, result, (COMMENT_DELETED, &back), &back)
    })
}

/// Detail page of the post a comment belongs to, or home if it is gone.
fn comment_page(store: &Store, comment: u64) -> String {
    store
        .comment(comment)
        .map(|c| format!("/posts/{}", c.post))
        .unwrap_or_else(|| "/".to_string())
}

async fn categories_page(State(app): State<AppState>, headers: HeaderMap) -> Response {
    with_user(&app, &headers, |store, visit, _| {
        let body = render::categories(store);
        visit.page(store, "카테고리 관리", &body)
    })
}

async fn create_category(State(app): State<AppState>, headers: HeaderMap, RawForm(raw): RawForm) -> Response {
    let form = FormData::parse(&raw);
    with_user(&app, &headers, |store, visit, _| {
        let result = store.create_category(form.get("name"));
        outcome(store, visit, result, (CATEGORY_CREATED, "/categories"), "/categories")
    })
}

async fn rename_category(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    RawForm(raw): RawForm,
) -> Response {
    let form = FormData::parse(&raw);
    with_user(&app, &headers, |store, visit, _| {
        let result = store.rename_category(id, form.get("name"));
        outcome(store, visit, result, (CATEGORY_UPDATED, "/categories"), "/categories")
    })
}

async fn delete_category(State(app): State<AppState>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    with_user(&app, &headers, |store, visit, _| {
        let result = store.delete_category(id);
        outcome(store, visit, result, (CATEGORY_DELETED, "/categories"), "/categories")
    })
}
