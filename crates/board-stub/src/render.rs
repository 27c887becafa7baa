// HTML rendering
//
// Markup follows the board application's conventions: numeric ids only in
// `category-name-<id>` / `comment-content-<id>` containers, id-scoped inline
// edit and reply forms revealed by `onclick` handlers, and native confirm
// dialogs on every delete form.

use crate::store::{Comment, Flash, Post, Store, User};
use std::fmt::Write;

/// Escapes text for element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const SCRIPT: &str = r#"<script>
function reveal(id) { var el = document.getElementById(id); if (el) { el.hidden = false; } }
function editCategory(id) { reveal('category-edit-' + id); }
function editComment(id) { reveal('comment-edit-' + id); }
function showReplyForm(id) { reveal('reply-form-' + id); }
</script>"#;

/// Wraps `body` in the site layout with navigation and the pending flash.
pub fn layout(title: &str, user: Option<&User>, flash: Option<Flash>, body: &str) -> String {
    let mut nav = String::from(r#"<a href="/">게시판</a> <a href="/posts/new">글쓰기</a> "#);
    match user {
        Some(user) => {
            nav.push_str(r#"<a href="/categories">카테고리 관리</a> "#);
            let _ = write!(
                nav,
                r#"<div class="dropdown"><button type="button" id="userDropdown" onclick="reveal('userMenu')">{nickname}</button><div id="userMenu" hidden><form action="/logout" method="post"><button type="submit">로그아웃</button></form></div></div>"#,
                nickname = escape(&user.nickname)
            );
        }
        None => nav.push_str(r#"<a href="/login">로그인</a> <a href="/signup">회원가입</a>"#),
    }

    let flash = match flash {
        Some(Flash::Success(msg)) => format!(
            r#"<div class="alert alert-success" role="alert">{}</div>"#,
            escape(&msg)
        ),
        Some(Flash::Error(msg)) => format!(
            r#"<div class="alert alert-danger" role="alert">{}</div>"#,
            escape(&msg)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head><meta charset="utf-8"><title>{title}</title>{SCRIPT}</head>
<body>
<nav>{nav}</nav>
<main>
{flash}
{body}
</main>
</body>
</html>"#,
        title = escape(title)
    )
}

pub fn home(store: &Store, posts: &[&Post]) -> String {
    let mut html = String::from("<h2>게시글 목록</h2>\n<div class=\"category-filter\">");
    html.push_str(r#"<a href="/">전체</a>"#);
    for category in store.categories() {
        let _ = write!(
            html,
            r#" <a href="/?categoryId={id}">{name}</a>"#,
            id = category.id,
            name = escape(&category.name)
        );
    }
    html.push_str("</div>\n");

    if posts.is_empty() {
        html.push_str("<p>게시글이 없습니다.</p>");
        return html;
    }
    html.push_str("<ul class=\"post-list\">");
    for post in posts {
        let author = store.user(post.author).map(|u| u.nickname.as_str()).unwrap_or("");
        let _ = write!(
            html,
            r#"<li><a href="/posts/{id}">{title}</a> <span class="author">{author}</span></li>"#,
            id = post.id,
            title = escape(&post.title),
            author = escape(author)
        );
    }
    html.push_str("</ul>");
    html
}

pub fn signup() -> String {
    r#"<h2>회원가입</h2>
<form action="/signup" method="post">
<label for="email">이메일</label><input type="email" id="email" name="email">
<label for="password">비밀번호</label><input type="password" id="password" name="password">
<label for="nickname">닉네임</label><input type="text" id="nickname" name="nickname">
<button type="submit">회원가입</button>
</form>"#
        .to_string()
}

pub fn login() -> String {
    r#"<h2>로그인</h2>
<form action="/login" method="post">
<label for="email">이메일</label><input type="email" id="email" name="email">
<label for="password">비밀번호</label><input type="password" id="password" name="password">
<button type="submit">로그인</button>
</form>"#
        .to_string()
}

/// Create form when `post` is `None`, edit form otherwise.
pub fn post_form(store: &Store, post: Option<&Post>) -> String {
    let (action, heading, submit, title, content, filed) = match post {
        Some(p) => (
            format!("/posts/{}/edit", p.id),
            "게시글 수정",
            "수정하기",
            p.title.as_str(),
            p.content.as_str(),
            p.categories.as_slice(),
        ),
        None => ("/posts".to_string(), "게시글 작성", "작성하기", "", "", &[][..]),
    };

    let mut boxes = String::new();
    for category in store.categories() {
        let checked = if filed.contains(&category.id) { " checked" } else { "" };
        let _ = write!(
            boxes,
            r#"<label><input type="checkbox" name="categoryIds" value="{id}"{checked}> {name}</label>"#,
            id = category.id,
            name = escape(&category.name)
        );
    }

    format!(
        r#"<h2>{heading}</h2>
<form action="{action}" method="post">
<label for="title">제목</label><input type="text" id="title" name="title" value="{title}">
<label for="content">내용</label><textarea id="content" name="content">{content}</textarea>
<div class="categories">{boxes}</div>
<button type="submit">{submit}</button>
</form>"#,
        title = escape(title),
        content = escape(content)
    )
}

pub fn post_detail(store: &Store, post: &Post, viewer: Option<&User>) -> String {
    let author = store.user(post.author).map(|u| u.nickname.as_str()).unwrap_or("");
    let mut html = format!(
        r#"<article>
<h1>{title}</h1>
<p class="meta">작성자: <span class="author">{author}</span></p>
"#,
        title = escape(&post.title),
        author = escape(author)
    );

    for id in &post.categories {
        if let Some(category) = store.category(*id) {
            let _ = write!(
                html,
                r#"<span class="badge">{}</span> "#,
                escape(&category.name)
            );
        }
    }
    let _ = write!(
        html,
        "\n<div class=\"post-content\">{}</div>\n",
        escape(&post.content)
    );

    if viewer.is_some_and(|v| v.id == post.author) {
        let _ = write!(
            html,
            r#"<a href="/posts/{id}/edit">수정</a>
<form action="/posts/{id}/delete" method="post" onsubmit="return confirm('게시글을 삭제하시겠습니까?')"><button type="submit">삭제</button></form>
"#,
            id = post.id
        );
    }
    html.push_str("</article>\n<section class=\"comments\">\n<h3>댓글</h3>\n");

    if viewer.is_some() {
        let _ = write!(
            html,
            r#"<form action="/posts/{id}/comments" method="post"><textarea name="content"></textarea><button type="submit">댓글 작성</button></form>
"#,
            id = post.id
        );
    }
    for comment in store.comments(post.id, None) {
        comment_tree(&mut html, store, comment, viewer, 0);
    }
    html.push_str("</section>");
    html
}

fn comment_tree(html: &mut String, store: &Store, comment: &Comment, viewer: Option<&User>, depth: usize) {
    let author = store.user(comment.author).map(|u| u.nickname.as_str()).unwrap_or("");
    let _ = write!(
        html,
        r#"<div class="comment" style="margin-left: {indent}px">
<div class="comment-header"><strong>{author}</strong></div>
<div id="comment-content-{id}">{content}</div>
"#,
        indent = depth * 24,
        id = comment.id,
        author = escape(author),
        content = escape(&comment.content)
    );

    if viewer.is_some_and(|v| v.id == comment.author) {
        let _ = write!(
            html,
            r#"<button type="button" onclick="editComment({id})">수정</button>
<form action="/comments/{id}/delete" method="post" onsubmit="return confirm('댓글을 삭제하시겠습니까?')"><button type="submit">삭제</button></form>
<form id="comment-edit-{id}" action="/comments/{id}/edit" method="post" hidden><textarea id="edit-content-{id}" name="content">{content}</textarea><button type="submit">저장</button></form>
"#,
            id = comment.id,
            content = escape(&comment.content)
        );
    }
    if viewer.is_some() {
        let _ = write!(
            html,
            r#"<button type="button" onclick="showReplyForm({id})">답글</button>
<form id="reply-form-{id}" action="/posts/{post}/comments" method="post" hidden><input type="hidden" name="parentId" value="{id}"><textarea name="content"></textarea><button type="submit">작성</button></form>
"#,
            id = comment.id,
            post = comment.post
        );
    }

    for reply in store.comments(comment.post, Some(comment.id)) {
        comment_tree(html, store, reply, viewer, depth + 1);
    }
    html.push_str("</div>\n");
}

pub fn categories(store: &Store) -> String {
    let mut html = String::from(
        r#"<h2>카테고리 관리</h2>
<form action="/categories" method="post">
<input type="text" id="categoryName" name="name" placeholder="카테고리 이름">
<button type="submit">추가하기</button>
</form>
"#,
    );

    let mut any = false;
    html.push_str("<ul class=\"category-list\">\n");
    for category in store.categories() {
        any = true;
        let _ = write!(
            html,
            r#"<li><span id="category-name-{id}">{name}</span>
<button type="button" onclick="editCategory({id})">수정</button>
<form action="/categories/{id}/delete" method="post" onsubmit="return confirm('카테고리를 삭제하시겠습니까?')"><button type="submit">삭제</button></form>
<form id="category-edit-{id}" action="/categories/{id}/edit" method="post" hidden><input type="text" id="edit-name-{id}" name="name" value="{name}"><button type="submit">저장</button></form>
</li>
"#,
            id = category.id,
            name = escape(&category.name)
        );
    }
    html.push_str("</ul>");
    if !any {
        html.push_str("\n<p>등록된 카테고리가 없습니다.</p>");
    }
    html
}
