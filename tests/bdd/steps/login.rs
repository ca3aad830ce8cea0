//! Login steps

use cucumber::{given, then, when};
use storefront_e2e::pages::{InventoryPage, LoginPage};

use crate::world::StorefrontWorld;

#[given("user is on SauceDemo login page")]
fn open_login_page(world: &mut StorefrontWorld) {
    let url = world.base_url();
    world.with_session(|session| LoginPage::new(session).open(&url));
}

#[when(expr = "user logs in with username {string} and password {string}")]
fn log_in(world: &mut StorefrontWorld, username: String, password: String) {
    world.with_session(|session| LoginPage::new(session).login(&username, &password));
}

#[then("inventory page should be displayed")]
fn inventory_is_displayed(world: &mut StorefrontWorld) {
    let displayed = world.with_session(|session| Ok(InventoryPage::new(session).is_displayed()));
    assert!(displayed, "Inventory page is not displayed");
}

#[then(expr = "error message should be {string}")]
fn login_error_is(world: &mut StorefrontWorld, expected: String) {
    let actual = world.with_session(|session| {
        session.wait_for_page_load()?;
        LoginPage::new(session).error_message()
    });
    assert_eq!(actual, expected, "Invalid login error message mismatch");
}
