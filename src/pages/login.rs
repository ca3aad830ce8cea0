use tracing::debug;

use crate::error::E2eResult;
use crate::locator::Locator;
use crate::session::Session;

/// Storefront login form
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    session: &'a Session,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn username() -> Locator {
        Locator::id("user-name")
    }

    fn password() -> Locator {
        Locator::id("password")
    }

    fn login_button() -> Locator {
        Locator::id("login-button")
    }

    /// Navigate to `base_url` and wait until the document is ready
    pub fn open(&self, base_url: &str) -> E2eResult<()> {
        debug!(url = base_url, "Opening login page");
        self.session.navigate(base_url)?;
        self.session.wait_for_page_load()
    }

    pub fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        self.session.type_text(&Self::username(), username)?;
        self.session.type_text(&Self::password(), password)?;
        self.session.click(&Self::login_button())
    }

    /// Text of the error banner shown after a rejected login
    pub fn error_message(&self) -> E2eResult<String> {
        self.session.read_text(&super::error_banner())
    }
}
