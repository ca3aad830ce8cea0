//! Cart and checkout steps

use cucumber::{then, when};
use storefront_e2e::pages::{
    CartPage, CheckoutCompletePage, CheckoutInformationPage, CheckoutOverviewPage, InventoryPage,
};

use crate::world::StorefrontWorld;

#[when(expr = "user adds product {string} to the cart from inventory")]
fn add_product(world: &mut StorefrontWorld, product: String) {
    world.with_session(|session| {
        let inventory = InventoryPage::new(session);
        assert!(
            inventory.is_displayed(),
            "Inventory page should be displayed before adding to cart"
        );
        inventory.add_product_to_cart(&product)
    });
}

#[when("user opens the cart and starts checkout")]
fn start_checkout(world: &mut StorefrontWorld) {
    world.with_session(|session| {
        InventoryPage::new(session).open_cart()?;
        CartPage::new(session).checkout()
    });
}

#[when(expr = "user enters first name {string} last name {string} postal code {string} and continues")]
fn enter_information(world: &mut StorefrontWorld, first_name: String, last_name: String, postal_code: String) {
    world.with_session(|session| {
        let page = CheckoutInformationPage::new(session);
        page.enter_information(&first_name, &last_name, &postal_code)?;
        page.continue_checkout()
    });
}

#[then(expr = "checkout overview shows product {string}")]
fn overview_lists(world: &mut StorefrontWorld, product: String) {
    let listed = world.with_session(|session| CheckoutOverviewPage::new(session).is_product_listed(&product));
    assert!(listed, "Expected product not found on checkout overview: {}", product);
}

#[then(expr = "checkout info error should be {string}")]
fn checkout_error_is(world: &mut StorefrontWorld, expected: String) {
    let actual = world.with_session(|session| CheckoutInformationPage::new(session).error_message());
    assert_eq!(actual, expected, "Checkout info validation error mismatch");
}

#[when("user finishes the checkout")]
fn finish_checkout(world: &mut StorefrontWorld) {
    world.with_session(|session| CheckoutOverviewPage::new(session).finish());
}

#[then("order completion page should be displayed")]
fn order_is_complete(world: &mut StorefrontWorld) {
    let complete = world.with_session(|session| Ok(CheckoutCompletePage::new(session).is_complete()));
    assert!(complete, "Order completion page not displayed");
}
