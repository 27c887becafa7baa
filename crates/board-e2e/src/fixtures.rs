// Test data factory
//
// Every identifier is `<prefix><time><suffix>`: a process-monotonic millisecond
// clock plus a random base-36 suffix. The clock keeps values from one process
// strictly increasing; the suffix separates processes that read the same
// millisecond. No coordination between sessions is needed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Password used for every generated user
pub const DEFAULT_PASSWORD: &str = "test1234";

/// Body used for generated posts
pub const DEFAULT_POST_CONTENT: &str = "이것은 테스트 게시글 내용입니다.";

/// Suffix appended to a label by the edit flows
pub const EDITED_SUFFIX: &str = " (수정됨)";

const SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static LAST_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Credentials and display name for one scenario's user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFixture {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

/// Content for one scenario's post, with a category it may be filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFixture {
    pub title: String,
    pub content: String,
    pub category_name: String,
}

/// Generator for collision-free fixture values
#[derive(Debug, Clone, Copy, Default)]
pub struct TestDataFactory;

impl TestDataFactory {
    /// `test<time><suffix>@example.com`
    pub fn new_email() -> String {
        format!("test{}@example.com", unique_token())
    }

    /// `테스트유저<time><suffix>`
    pub fn new_nickname() -> String {
        format!("테스트유저{}", unique_token())
    }

    /// `테스트 게시글 <time><suffix>`
    pub fn new_title() -> String {
        format!("테스트 게시글 {}", unique_token())
    }

    /// `테스트카테고리<time><suffix>`
    pub fn new_category_name() -> String {
        format!("테스트카테고리{}", unique_token())
    }

    /// `테스트 댓글 <time><suffix>`
    pub fn new_comment() -> String {
        format!("테스트 댓글 {}", unique_token())
    }

    pub fn new_user() -> UserFixture {
        UserFixture {
            email: Self::new_email(),
            password: DEFAULT_PASSWORD.to_string(),
            nickname: Self::new_nickname(),
        }
    }

    pub fn new_post() -> PostFixture {
        PostFixture {
            title: Self::new_title(),
            content: DEFAULT_POST_CONTENT.to_string(),
            category_name: Self::new_category_name(),
        }
    }

    /// The label an edit flow renames `original` to.
    pub fn edited(original: &str) -> String {
        format!("{original}{EDITED_SUFFIX}")
    }
}

fn unique_token() -> String {
    format!("{}{}", next_millis(), random_suffix())
}

/// Wall-clock milliseconds, bumped so consecutive calls never repeat.
fn next_millis() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let previous = LAST_MILLIS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
