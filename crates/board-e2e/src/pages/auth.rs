// Authentication page object: signup, login, logout
//
// Session states: Anonymous -> (signup) -> Anonymous on /login
//                 Anonymous -> (login)  -> Authenticated on /
//                 Authenticated -> (logout) -> Anonymous on /

use super::base::BasePage;
use crate::error::{Error, Result};
use crate::fixtures::UserFixture;
use crate::selectors;
use crate::session::Session;
use crate::wait::TimeoutTier;

pub const SIGNUP_SUCCESS: &str = "회원가입이 완료되었습니다. 로그인해주세요.";
pub const LOGIN_FAILURE: &str = "이메일 또는 비밀번호가 올바르지 않습니다.";

const LOGIN_BUTTON: &str = "로그인";
const SIGNUP_BUTTON: &str = "회원가입";
const USER_MENU: &str = "userDropdown";
const LOGOUT_ACTION: &str = "/logout";

pub struct AuthPage<'s> {
    base: BasePage<'s>,
}

impl<'s> AuthPage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    pub async fn goto_login(&self) -> Result<()> {
        self.base.navigate("/login").await
    }

    pub async fn goto_signup(&self) -> Result<()> {
        self.base.navigate("/signup").await
    }

    /// Registers `user`; ends anonymous on the login page.
    pub async fn signup(&self, user: &UserFixture) -> Result<()> {
        tracing::info!(email = %user.email, nickname = %user.nickname, "signing up");
        self.goto_signup().await?;
        self.base.fill(&selectors::field("email"), &user.email).await?;
        self.base.fill(&selectors::field("password"), &user.password).await?;
        self.base.fill(&selectors::field("nickname"), &user.nickname).await?;
        self.base
            .click(&selectors::role_named("button", SIGNUP_BUTTON))
            .await?;
        self.base
            .assert_url_glob("**/login")
            .await
            .map_err(|e| e.context(format!("Signup of {} did not redirect to login", user.email)))?;
        Ok(())
    }

    /// Logs in; ends authenticated on the home page.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        tracing::info!(%email, "logging in");
        self.submit_credentials(email, password).await?;
        self.base
            .assert_url_glob("**/")
            .await
            .map_err(|e| e.context(format!("Login as {email} did not reach home")))?;
        Ok(())
    }

    /// Submits credentials that must be rejected; ends on the login page
    /// with the failure message shown.
    pub async fn login_expect_failure(&self, email: &str, password: &str) -> Result<()> {
        tracing::info!(%email, "logging in with credentials expected to fail");
        self.submit_credentials(email, password).await?;
        self.base.assert_url_glob("**/login").await?;
        self.expect_error_message(LOGIN_FAILURE).await
    }

    /// Logs out through the user menu; ends anonymous on the home page.
    ///
    /// The menu is optional: when it does not show within the short tier the
    /// logout form is submitted directly.
    pub async fn logout(&self) -> Result<()> {
        tracing::info!("logging out");
        let menu = selectors::id(USER_MENU);
        match self.base.expect_visible(&menu, TimeoutTier::Short).await {
            Ok(()) => {
                self.base.click(&menu).await?;
            }
            Err(Error::VisibilityTimeout { .. }) => {
                tracing::debug!("no user menu; submitting logout form directly");
            }
            Err(e) => return Err(e),
        }

        let logout = selectors::form_submit(LOGOUT_ACTION);
        self.base.expect_visible(&logout, TimeoutTier::Standard).await?;
        self.base.click(&logout).await?;
        self.base.assert_url_glob("**/").await?;
        Ok(())
    }

    /// Waits for an error message containing `message`.
    pub async fn expect_error_message(&self, message: &str) -> Result<()> {
        self.base
            .assert_text_visible(message, TimeoutTier::Standard)
            .await
    }

    /// Waits for a success message containing `message`.
    pub async fn expect_success_message(&self, message: &str) -> Result<()> {
        self.base
            .assert_text_visible(message, TimeoutTier::Standard)
            .await
    }

    /// The user menu shows `nickname`.
    pub async fn assert_logged_in_as(&self, nickname: &str) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::role_named("button", nickname),
                TimeoutTier::Standard,
            )
            .await
    }

    /// The navigation offers a login link, i.e. nobody is logged in.
    pub async fn assert_logged_out(&self) -> Result<()> {
        self.base
            .expect_visible(
                &selectors::role_named("link", LOGIN_BUTTON),
                TimeoutTier::Standard,
            )
            .await
    }

    pub async fn assert_on_login_page(&self) -> Result<()> {
        self.base.assert_url_glob("**/login").await?;
        self.base
            .expect_visible(&selectors::field("password"), TimeoutTier::Standard)
            .await
    }

    async fn submit_credentials(&self, email: &str, password: &str) -> Result<()> {
        self.goto_login().await?;
        self.base.fill(&selectors::field("email"), email).await?;
        self.base.fill(&selectors::field("password"), password).await?;
        self.base
            .click(&selectors::role_named("button", LOGIN_BUTTON))
            .await
    }
}

