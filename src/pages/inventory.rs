//! Product listing page.

use std::fmt;
use std::str::FromStr;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::session::Session;

/// Sort options offered by the product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NameAscending,
    NameDescending,
    PriceAscending,
    PriceDescending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::NameAscending,
        SortOrder::NameDescending,
        SortOrder::PriceAscending,
        SortOrder::PriceDescending,
    ];

    /// Label shown in the sort dropdown
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "Name (A to Z)",
            SortOrder::NameDescending => "Name (Z to A)",
            SortOrder::PriceAscending => "Price (low to high)",
            SortOrder::PriceDescending => "Price (high to low)",
        }
    }

    /// `value` attribute of the matching dropdown option
    pub fn option_value(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "az",
            SortOrder::NameDescending => "za",
            SortOrder::PriceAscending => "lohi",
            SortOrder::PriceDescending => "hilo",
        }
    }

    pub fn sorts_by_name(&self) -> bool {
        matches!(self, SortOrder::NameAscending | SortOrder::NameDescending)
    }

    /// Names compare case-insensitively
    pub fn is_sorted_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        let keys: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();
        match self {
            SortOrder::NameAscending => keys.windows(2).all(|w| w[0] <= w[1]),
            SortOrder::NameDescending => keys.windows(2).all(|w| w[0] >= w[1]),
            _ => false,
        }
    }

    pub fn is_sorted_prices(&self, prices: &[f64]) -> bool {
        match self {
            SortOrder::PriceAscending => prices.windows(2).all(|w| w[0] <= w[1]),
            SortOrder::PriceDescending => prices.windows(2).all(|w| w[0] >= w[1]),
            _ => false,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.label() == s.trim())
            .ok_or_else(|| E2eError::Config(format!("unsupported sort option: {}", s)))
    }
}

/// Parse a listed price such as `$29.99`
pub fn parse_price(text: &str) -> E2eResult<f64> {
    let digits = text.trim().trim_start_matches('$').trim();
    digits
        .parse::<f64>()
        .map_err(|_| E2eError::Page(format!("not a price: {:?}", text)))
}

#[derive(Debug, Clone, Copy)]
pub struct InventoryPage<'a> {
    session: &'a Session,
}

impl<'a> InventoryPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn container() -> Locator {
        Locator::id("inventory_container")
    }

    fn item() -> Locator {
        Locator::css(".inventory_item")
    }

    fn item_name() -> Locator {
        Locator::css(".inventory_item_name")
    }

    fn item_price() -> Locator {
        Locator::css(".inventory_item_price")
    }

    fn add_button() -> Locator {
        Locator::css("button.btn_inventory")
    }

    fn cart_link() -> Locator {
        Locator::class_name("shopping_cart_link")
    }

    fn sort_select() -> Locator {
        Locator::css("select.product_sort_container")
    }

    /// Whether the product listing becomes visible within the wait budget
    pub fn is_displayed(&self) -> bool {
        self.session.is_displayed(&Self::container())
    }

    /// Add the product whose name matches `name`, ignoring case
    pub fn add_product_to_cart(&self, name: &str) -> E2eResult<()> {
        self.session.wait_for_visible(&Self::item())?;
        for item in self.session.find_all(&Self::item())? {
            let Some(label) = self.session.find_within(item, &Self::item_name())?.first().copied() else {
                continue;
            };
            if !self.session.text_of(label)?.trim().eq_ignore_ascii_case(name.trim()) {
                continue;
            }
            let button = self
                .session
                .find_within(item, &Self::add_button())?
                .first()
                .copied()
                .ok_or_else(|| E2eError::Page(format!("no add-to-cart button for {}", name)))?;
            return self.session.click_handle(button);
        }
        Err(E2eError::Page(format!("product not found on inventory: {}", name)))
    }

    pub fn open_cart(&self) -> E2eResult<()> {
        self.session.click(&Self::cart_link())
    }

    pub fn sort(&self, order: SortOrder) -> E2eResult<()> {
        self.session.select_by_value(&Self::sort_select(), order.option_value())
    }

    /// Listed product names in display order, trimmed
    pub fn product_names(&self) -> E2eResult<Vec<String>> {
        self.session.wait_for_visible(&Self::item_name())?;
        self.session
            .find_all(&Self::item_name())?
            .into_iter()
            .map(|el| Ok(self.session.text_of(el)?.trim().to_string()))
            .collect()
    }

    /// Listed product prices in display order
    pub fn product_prices(&self) -> E2eResult<Vec<f64>> {
        self.session.wait_for_visible(&Self::item_price())?;
        self.session
            .find_all(&Self::item_price())?
            .into_iter()
            .map(|el| parse_price(&self.session.text_of(el)?))
            .collect()
    }
}
