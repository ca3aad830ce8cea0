//! Element locators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How to find zero or more elements in the current document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// Element `id` attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// Single class name
    ClassName(String),
    /// `name` attribute
    Name(String),
    /// Exact link text
    LinkText(String),
    /// Tag name
    TagName(String),
    /// XPath expression
    XPath(String),
    /// `child` resolved relative to each element matched by `parent`
    Within {
        parent: Box<Locator>,
        child: Box<Locator>,
    },
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::ClassName(value.into())
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::Name(value.into())
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::LinkText(value.into())
    }

    pub fn tag_name(value: impl Into<String>) -> Self {
        Self::TagName(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    /// Locate `child` relative to the elements matched by `self`
    pub fn within(self, child: Locator) -> Self {
        Self::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    /// Equivalent CSS selector, when the strategy has one.
    ///
    /// WebDriver only speaks css, link text and xpath natively; id, class
    /// name, name and tag name are lowered to CSS.
    pub fn as_css(&self) -> Option<String> {
        match self {
            Locator::Id(id) => Some(format!("[id=\"{}\"]", escape_css_string(id))),
            Locator::Css(css) => Some(css.clone()),
            Locator::ClassName(class) => Some(format!(".{}", class)),
            Locator::Name(name) => Some(format!("[name=\"{}\"]", escape_css_string(name))),
            Locator::TagName(tag) => Some(tag.clone()),
            Locator::LinkText(_) | Locator::XPath(_) | Locator::Within { .. } => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::ClassName(v) => write!(f, "class={}", v),
            Locator::Name(v) => write!(f, "name={}", v),
            Locator::LinkText(v) => write!(f, "link={}", v),
            Locator::TagName(v) => write!(f, "tag={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
        }
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Locator::id("user-name").to_string(), "id=user-name");
        assert_eq!(
            Locator::css(".inventory_item")
                .within(Locator::css("button"))
                .to_string(),
            "css=.inventory_item >> css=button"
        );
    }

    #[test]
    fn test_as_css() {
        assert_eq!(
            Locator::id("login-button").as_css().as_deref(),
            Some("[id=\"login-button\"]")
        );
        assert_eq!(
            Locator::class_name("shopping_cart_link").as_css().as_deref(),
            Some(".shopping_cart_link")
        );
        assert_eq!(Locator::xpath("//div").as_css(), None);
    }
}
