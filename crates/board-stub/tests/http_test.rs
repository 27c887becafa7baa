// HTTP-level tests for the stand-in application
//
// Drives the router in-process with `tower::ServiceExt::oneshot`, carrying the
// session cookie by hand, so no socket or browser is involved.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

struct Client {
    app: Router,
    cookie: Option<String>,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Client {
    fn new() -> Self {
        Self {
            app: board_stub::app(),
            cookie: None,
        }
    }

    /// Second browser against the same application state.
    fn sibling(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set) = response.headers().get(SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, path: &str) -> Reply {
        let mut request = Request::builder().uri(path);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> Reply {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    async fn register_and_login(&mut self, email: &str, nickname: &str) {
        self.get("/").await;
        let signup = self
            .post(
                "/signup",
                &[("email", email), ("password", "test1234"), ("nickname", nickname)],
            )
            .await;
        assert_eq!(signup.location.as_deref(), Some("/login"));
        let login = self
            .post("/login", &[("email", email), ("password", "test1234")])
            .await;
        assert_eq!(login.location.as_deref(), Some("/"));
    }
}

fn id_after(body: &str, marker: &str) -> u64 {
    let start = body.find(marker).unwrap() + marker.len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_signup_redirects_to_login_with_message() {
    let mut client = Client::new();
    client.get("/signup").await;

    let reply = client
        .post(
            "/signup",
            &[("email", "a@example.com"), ("password", "test1234"), ("nickname", "테스트유저")],
        )
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/login"));

    let login = client.get("/login").await;
    assert!(login.body.contains(board_stub::SIGNUP_DONE));

    // Shown once
    let again = client.get("/login").await;
    assert!(!again.body.contains(board_stub::SIGNUP_DONE));
}

#[tokio::test]
async fn test_wrong_password_returns_to_login() {
    let mut client = Client::new();
    client.register_and_login("a@example.com", "작성자").await;
    client.post("/logout", &[]).await;

    let reply = client
        .post("/login", &[("email", "a@example.com"), ("password", "nope")])
        .await;
    assert_eq!(reply.location.as_deref(), Some("/login"));
    let page = client.get("/login").await;
    assert!(page.body.contains("이메일 또는 비밀번호가 올바르지 않습니다."));
}

#[tokio::test]
async fn test_login_required_pages_redirect() {
    let mut client = Client::new();
    for path in ["/posts/new", "/categories"] {
        let reply = client.get(path).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(reply.location.as_deref(), Some("/login"), "{path}");
    }
}

#[tokio::test]
async fn test_user_menu_and_logout() {
    let mut client = Client::new();
    client.register_and_login("a@example.com", "작성자").await;

    let home = client.get("/").await;
    assert!(home.body.contains(r#"id="userDropdown""#));
    assert!(home.body.contains(r#"<form action="/logout""#));
    assert!(home.body.contains("게시글 목록"));

    let reply = client.post("/logout", &[]).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
    let home = client.get("/").await;
    assert!(!home.body.contains("userDropdown"));
    assert!(home.body.contains(r#"<a href="/login">로그인</a>"#));
}

#[tokio::test]
async fn test_category_lifecycle_markup() {
    let mut client = Client::new();
    client.register_and_login("a@example.com", "작성자").await;

    let empty = client.get("/categories").await;
    assert!(empty.body.contains("등록된 카테고리가 없습니다"));

    client.post("/categories", &[("name", "테스트카테고리1")]).await;
    let listed = client.get("/categories").await;
    assert!(listed.body.contains(board_stub::CATEGORY_CREATED));
    let id = id_after(&listed.body, r#"id="category-name-"#);
    assert!(listed.body.contains(&format!(r#"onclick="editCategory({id})""#)));
    assert!(listed.body.contains(&format!(r#"id="category-edit-{id}""#)));

    client
        .post(
            &format!("/categories/{id}/edit"),
            &[("name", "테스트카테고리1 (수정됨)")],
        )
        .await;
    let renamed = client.get("/categories").await;
    assert!(renamed.body.contains(&format!(
        r#"<span id="category-name-{id}">테스트카테고리1 (수정됨)</span>"#
    )));

    client.post(&format!("/categories/{id}/delete"), &[]).await;
    let gone = client.get("/categories").await;
    assert!(gone.body.contains(board_stub::CATEGORY_DELETED));
    assert!(!gone.body.contains("category-name-"));

    // Deleting again finds nothing
    client.post(&format!("/categories/{id}/delete"), &[]).await;
    let again = client.get("/categories").await;
    assert!(again.body.contains("요청한 항목을 찾을 수 없습니다."));
}

#[tokio::test]
async fn test_post_ownership_gating() {
    let mut author = Client::new();
    author.register_and_login("a@example.com", "작성자").await;
    let created = author
        .post("/posts", &[("title", "테스트 게시글 1"), ("content", "본문")])
        .await;
    let location = created.location.unwrap();
    assert!(location.starts_with("/posts/"));

    let own = author.get(&location).await;
    assert!(own.body.contains(r#"<div class="post-content">본문</div>"#));
    assert!(own.body.contains("작성자"));
    assert!(own.body.contains(&format!(r#"action="{location}/delete""#)));

    let mut visitor = author.sibling();
    visitor.register_and_login("b@example.com", "방문자").await;
    let foreign = visitor.get(&location).await;
    assert!(foreign.body.contains("테스트 게시글 1"));
    assert!(!foreign.body.contains(&format!(r#"href="{location}/edit""#)));
    assert!(!foreign.body.contains(&format!("{location}/delete")));

    let denied = visitor.post(&format!("{location}/delete"), &[]).await;
    assert_eq!(denied.location.as_deref(), Some(location.as_str()));
    assert_eq!(author.get(&location).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_category_filter() {
    let mut client = Client::new();
    client.register_and_login("a@example.com", "작성자").await;
    client.post("/categories", &[("name", "러스트")]).await;
    let page = client.get("/categories").await;
    let category = id_after(&page.body, r#"id="category-name-"#).to_string();

    client
        .post(
            "/posts",
            &[("title", "분류된 글"), ("content", "x"), ("categoryIds", category.as_str())],
        )
        .await;
    client
        .post("/posts", &[("title", "미분류 글"), ("content", "x")])
        .await;

    let all = client.get("/").await;
    assert!(all.body.contains("분류된 글") && all.body.contains("미분류 글"));
    assert!(all.body.contains(&format!(r#"href="/?categoryId={category}""#)));

    let filtered = client.get(&format!("/?categoryId={category}")).await;
    assert!(filtered.body.contains("분류된 글"));
    assert!(!filtered.body.contains("미분류 글"));
}

#[tokio::test]
async fn test_threaded_comments() {
    let mut client = Client::new();
    client.register_and_login("a@example.com", "작성자").await;
    let post = client
        .post("/posts", &[("title", "t"), ("content", "c")])
        .await
        .location
        .unwrap();

    let created = client
        .post(&format!("{post}/comments"), &[("content", "부모 댓글")])
        .await;
    assert_eq!(created.location.as_deref(), Some(post.as_str()));
    let page = client.get(&post).await;
    let parent = id_after(&page.body, r#"id="comment-content-"#);
    assert!(page.body.contains(&format!(r#"onclick="showReplyForm({parent})""#)));

    let parent_id = parent.to_string();
    client
        .post(
            &format!("{post}/comments"),
            &[("parentId", parent_id.as_str()), ("content", "답글")],
        )
        .await;
    let page = client.get(&post).await;
    let parent_at = page.body.find("부모 댓글").unwrap();
    let reply_at = page.body.find(">답글</div>").unwrap();
    assert!(parent_at < reply_at);

    client
        .post(&format!("/comments/{parent}/edit"), &[("content", "수정된 댓글")])
        .await;
    let page = client.get(&post).await;
    assert!(page.body.contains(board_stub::COMMENT_UPDATED));
    assert!(page.body.contains("수정된 댓글"));

    let deleted = client.post(&format!("/comments/{parent}/delete"), &[]).await;
    assert_eq!(deleted.location.as_deref(), Some(post.as_str()));
    let page = client.get(&post).await;
    assert!(!page.body.contains("comment-content-"));
}

#[tokio::test]
async fn test_unknown_post_is_404() {
    let mut client = Client::new();
    assert_eq!(client.get("/posts/999").await.status, StatusCode::NOT_FOUND);
}
