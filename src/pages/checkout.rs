//! The three checkout steps: customer information, order overview and the
//! confirmation page.

use crate::error::E2eResult;
use crate::locator::Locator;
use crate::session::Session;

/// Header text of the order confirmation
pub const ORDER_COMPLETE_HEADER: &str = "Thank you for your order!";

#[derive(Debug, Clone, Copy)]
pub struct CheckoutInformationPage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutInformationPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn enter_information(&self, first_name: &str, last_name: &str, postal_code: &str) -> E2eResult<()> {
        self.session.type_text(&Locator::id("first-name"), first_name)?;
        self.session.type_text(&Locator::id("last-name"), last_name)?;
        self.session.type_text(&Locator::id("postal-code"), postal_code)
    }

    pub fn continue_checkout(&self) -> E2eResult<()> {
        self.session.click(&Locator::id("continue"))
    }

    pub fn error_message(&self) -> E2eResult<String> {
        self.session.read_text(&super::error_banner())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckoutOverviewPage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutOverviewPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn line_items() -> Locator {
        Locator::css(".cart_item .inventory_item_name")
    }

    /// Whether a line item named `name` (any case) is part of the order
    pub fn is_product_listed(&self, name: &str) -> E2eResult<bool> {
        if self.session.wait_for_visible(&Self::line_items()).is_err() {
            return Ok(false);
        }
        for item in self.session.find_all(&Self::line_items())? {
            if self.session.text_of(item)?.trim().eq_ignore_ascii_case(name.trim()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn finish(&self) -> E2eResult<()> {
        self.session.click(&Locator::id("finish"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckoutCompletePage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutCompletePage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Whether the confirmation header is shown
    pub fn is_complete(&self) -> bool {
        self.session.is_displayed(&Locator::css("h2.complete-header"))
    }
}
