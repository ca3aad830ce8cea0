//! Page objects for the storefront.
//!
//! Each page borrows the worker's `Session` and talks to the browser only
//! through the element action facade, so failed interactions are captured
//! like any other.

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod login;

pub use cart::CartPage;
pub use checkout::{CheckoutCompletePage, CheckoutInformationPage, CheckoutOverviewPage};
pub use inventory::{InventoryPage, SortOrder};
pub use login::LoginPage;

use crate::locator::Locator;

/// Validation banner shared by the login and checkout forms
pub(crate) fn error_banner() -> Locator {
    Locator::css("h3[data-test='error']")
}
