//! In-memory rendition of the saucedemo storefront.
//!
//! Routes mirror the real site's pages and messages closely enough for the
//! page objects to run unchanged. Each browser gets its own cart.

use std::sync::{Arc, Mutex};

use storefront_e2e::Locator;
use storefront_e2e::driver::{MemoryBrowser, MemoryDom, MemoryElement};

pub const BASE_URL: &str = "https://www.saucedemo.com/";
pub const INVENTORY_URL: &str = "https://www.saucedemo.com/inventory.html";
pub const CART_URL: &str = "https://www.saucedemo.com/cart.html";
pub const CHECKOUT_STEP_ONE_URL: &str = "https://www.saucedemo.com/checkout-step-one.html";
pub const CHECKOUT_STEP_TWO_URL: &str = "https://www.saucedemo.com/checkout-step-two.html";
pub const CHECKOUT_COMPLETE_URL: &str = "https://www.saucedemo.com/checkout-complete.html";

pub const PASSWORD: &str = "secret_sauce";
pub const LOCKED_OUT_USER: &str = "locked_out_user";
pub const USERS: [&str; 5] = [
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

pub const PRODUCTS: [(&str, f64); 6] = [
    ("Sauce Labs Backpack", 29.99),
    ("Sauce Labs Bike Light", 9.99),
    ("Sauce Labs Bolt T-Shirt", 15.99),
    ("Sauce Labs Fleece Jacket", 49.99),
    ("Sauce Labs Onesie", 7.99),
    ("Test.allTheThings() T-Shirt (Red)", 15.99),
];

pub const ERR_MISMATCH: &str =
    "Epic sadface: Username and password do not match any user in this service";
pub const ERR_LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
pub const ERR_USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
pub const ERR_PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";
pub const ERR_FIRST_NAME_REQUIRED: &str = "Error: First Name is required";
pub const ERR_LAST_NAME_REQUIRED: &str = "Error: Last Name is required";
pub const ERR_POSTAL_CODE_REQUIRED: &str = "Error: Postal Code is required";
pub const COMPLETE_HEADER: &str = "Thank you for your order!";

/// Page loads report `loading` this many times before `complete`
const LOAD_POLLS: u32 = 2;

#[derive(Debug, Default)]
struct Store {
    cart: Vec<String>,
}

type SharedStore = Arc<Mutex<Store>>;

/// A fresh browser on a blank page with the storefront routed
pub fn browser() -> MemoryBrowser {
    let store: SharedStore = Arc::default();
    let inventory = store.clone();
    let cart = store.clone();
    let overview = store;
    MemoryBrowser::builder()
        .load_polls(LOAD_POLLS)
        .route(BASE_URL, login_page)
        .route(INVENTORY_URL, move |dom| inventory_page(dom, &inventory, "az"))
        .route(CART_URL, move |dom| cart_page(dom, &cart))
        .route(CHECKOUT_STEP_ONE_URL, information_page)
        .route(CHECKOUT_STEP_TWO_URL, move |dom| overview_page(dom, &overview))
        .route(CHECKOUT_COMPLETE_URL, complete_page)
        .build()
}

fn error_banner() -> Locator {
    Locator::css("h3[data-test='error']")
}

fn show_error(dom: &mut MemoryDom, message: &str) {
    dom.remove(&error_banner());
    dom.add(MemoryElement::new(error_banner()).text(message));
}

fn input(id: &str) -> MemoryElement {
    MemoryElement::new(Locator::id(id)).also(Locator::name(id))
}

fn login_page(dom: &mut MemoryDom) {
    dom.add(MemoryElement::new(Locator::class_name("login_logo")).text("Swag Labs"));
    dom.add(input("user-name"));
    dom.add(input("password"));
    dom.add(
        MemoryElement::new(Locator::id("login-button"))
            .value("Login")
            .on_click(|dom| {
                let user = dom.value_of(&Locator::id("user-name"));
                let password = dom.value_of(&Locator::id("password"));
                match check_credentials(&user, &password) {
                    Ok(()) => dom.navigate(INVENTORY_URL),
                    Err(message) => show_error(dom, message),
                }
            }),
    );
}

fn check_credentials(user: &str, password: &str) -> Result<(), &'static str> {
    if user.is_empty() {
        return Err(ERR_USERNAME_REQUIRED);
    }
    if password.is_empty() {
        return Err(ERR_PASSWORD_REQUIRED);
    }
    if password != PASSWORD {
        return Err(ERR_MISMATCH);
    }
    if user == LOCKED_OUT_USER {
        return Err(ERR_LOCKED_OUT);
    }
    if USERS.contains(&user) {
        Ok(())
    } else {
        Err(ERR_MISMATCH)
    }
}

fn sorted_products(order: &str) -> Vec<(&'static str, f64)> {
    let mut products = PRODUCTS.to_vec();
    match order {
        "za" => products.sort_by(|a, b| b.0.to_lowercase().cmp(&a.0.to_lowercase())),
        "lohi" => products.sort_by(|a, b| a.1.total_cmp(&b.1)),
        "hilo" => products.sort_by(|a, b| b.1.total_cmp(&a.1)),
        _ => products.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase())),
    }
    products
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn header(dom: &mut MemoryDom, store: &SharedStore, title: &str) {
    let count = store.lock().unwrap().cart.len();
    let badge = if count == 0 { String::new() } else { count.to_string() };
    dom.add(
        MemoryElement::new(Locator::class_name("shopping_cart_link"))
            .text(badge)
            .on_click(|dom| dom.navigate(CART_URL)),
    );
    dom.add(MemoryElement::new(Locator::css(".title")).text(title));
}

fn inventory_page(dom: &mut MemoryDom, store: &SharedStore, order: &str) {
    header(dom, store, "Products");
    let mut select = MemoryElement::new(Locator::css("select.product_sort_container")).value(order);
    for (label, value) in [
        ("Name (A to Z)", "az"),
        ("Name (Z to A)", "za"),
        ("Price (low to high)", "lohi"),
        ("Price (high to low)", "hilo"),
    ] {
        select = select.option(label, value);
    }
    let resort = store.clone();
    dom.add(select.on_change(move |dom| {
        let order = dom.value_of(&Locator::css("select.product_sort_container"));
        dom.remove(&Locator::id("inventory_container"));
        list_products(dom, &resort, &order);
    }));
    list_products(dom, store, order);
}

fn list_products(dom: &mut MemoryDom, store: &SharedStore, order: &str) {
    let container = dom.add(MemoryElement::new(Locator::id("inventory_container")));
    for (name, price) in sorted_products(order) {
        let item = dom.add_child(container, MemoryElement::new(Locator::css(".inventory_item")));
        dom.add_child(
            item,
            MemoryElement::new(Locator::css(".inventory_item_name")).text(name),
        );
        dom.add_child(
            item,
            MemoryElement::new(Locator::css(".inventory_item_price")).text(format!("${:.2}", price)),
        );
        let cart = store.clone();
        dom.add_child(
            item,
            MemoryElement::new(Locator::css("button.btn_inventory"))
                .also(Locator::id(format!("add-to-cart-{}", slug(name))))
                .text("Add to cart")
                .on_click(move |dom| {
                    let count = {
                        let mut store = cart.lock().unwrap();
                        if !store.cart.iter().any(|n| n == name) {
                            store.cart.push(name.to_string());
                        }
                        store.cart.len()
                    };
                    if let Some(link) = dom.element_mut(&Locator::class_name("shopping_cart_link")) {
                        link.set_text(count.to_string());
                    }
                }),
        );
    }
}

fn cart_items(dom: &mut MemoryDom, store: &SharedStore) {
    let names = store.lock().unwrap().cart.clone();
    for name in names {
        let item = dom.add(MemoryElement::new(Locator::css(".cart_item")));
        dom.add_child(
            item,
            MemoryElement::new(Locator::css(".inventory_item_name"))
                .also(Locator::css(".cart_item .inventory_item_name"))
                .text(name),
        );
    }
}

fn cart_page(dom: &mut MemoryDom, store: &SharedStore) {
    header(dom, store, "Your Cart");
    cart_items(dom, store);
    dom.add(
        MemoryElement::new(Locator::id("checkout"))
            .text("Checkout")
            .on_click(|dom| dom.navigate(CHECKOUT_STEP_ONE_URL)),
    );
}

fn information_page(dom: &mut MemoryDom) {
    dom.add(MemoryElement::new(Locator::css(".title")).text("Checkout: Your Information"));
    dom.add(input("first-name"));
    dom.add(input("last-name"));
    dom.add(input("postal-code"));
    dom.add(
        MemoryElement::new(Locator::id("continue"))
            .value("Continue")
            .on_click(|dom| {
                let missing = [
                    ("first-name", ERR_FIRST_NAME_REQUIRED),
                    ("last-name", ERR_LAST_NAME_REQUIRED),
                    ("postal-code", ERR_POSTAL_CODE_REQUIRED),
                ]
                .into_iter()
                .find(|(id, _)| dom.value_of(&Locator::id(*id)).trim().is_empty());
                match missing {
                    Some((_, message)) => show_error(dom, message),
                    None => dom.navigate(CHECKOUT_STEP_TWO_URL),
                }
            }),
    );
}

fn overview_page(dom: &mut MemoryDom, store: &SharedStore) {
    dom.add(MemoryElement::new(Locator::css(".title")).text("Checkout: Overview"));
    cart_items(dom, store);
    dom.add(
        MemoryElement::new(Locator::id("finish"))
            .text("Finish")
            .on_click(|dom| dom.navigate(CHECKOUT_COMPLETE_URL)),
    );
}

fn complete_page(dom: &mut MemoryDom) {
    dom.add(MemoryElement::new(Locator::css(".title")).text("Checkout: Complete!"));
    dom.add(MemoryElement::new(Locator::css("h2.complete-header")).text(COMPLETE_HEADER));
}
