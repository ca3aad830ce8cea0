//! Inventory sorting steps

use cucumber::{then, when};
use storefront_e2e::pages::{InventoryPage, SortOrder};

use crate::world::StorefrontWorld;

fn sort_order(label: &str) -> SortOrder {
    label
        .parse()
        .unwrap_or_else(|e| panic!("{e}"))
}

#[when(expr = "user sorts products by {string}")]
fn sort_products(world: &mut StorefrontWorld, label: String) {
    let order = sort_order(&label);
    world.with_session(|session| InventoryPage::new(session).sort(order));
}

#[then(expr = "products should be sorted by {string}")]
fn products_are_sorted(world: &mut StorefrontWorld, label: String) {
    let order = sort_order(&label);
    if order.sorts_by_name() {
        let names = world.with_session(|session| InventoryPage::new(session).product_names());
        assert!(
            order.is_sorted_names(&names),
            "Product names order mismatch for sort {}: {:?}",
            order,
            names
        );
    } else {
        let prices = world.with_session(|session| InventoryPage::new(session).product_prices());
        assert!(
            order.is_sorted_prices(&prices),
            "Product prices order mismatch for sort {}: {:?}",
            order,
            prices
        );
    }
}
