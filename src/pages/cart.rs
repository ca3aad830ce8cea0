use crate::error::E2eResult;
use crate::locator::Locator;
use crate::session::Session;

/// Shopping cart
#[derive(Debug, Clone, Copy)]
pub struct CartPage<'a> {
    session: &'a Session,
}

impl<'a> CartPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn checkout(&self) -> E2eResult<()> {
        self.session.click(&Locator::id("checkout"))
    }
}
