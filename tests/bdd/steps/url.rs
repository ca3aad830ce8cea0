//! URL checks. One scenario expects a wrong URL on purpose to exercise
//! screenshot capture on assertion failure.

use cucumber::{then, when};
use storefront_e2e::pages::InventoryPage;

use crate::world::StorefrontWorld;

#[when("user opens the cart page")]
fn open_cart(world: &mut StorefrontWorld) {
    world.with_session(|session| {
        InventoryPage::new(session).open_cart()?;
        session.wait_for_page_load()
    });
}

#[then(expr = "current page URL should be {string}")]
fn url_is(world: &mut StorefrontWorld, expected: String) {
    let actual = world.with_session(|session| {
        session.wait_for_page_load()?;
        session.current_url()
    });
    assert_eq!(actual, expected, "Unexpected page URL");
}
