//! Scripts and key codes sent through the driver.

/// Returns `document.readyState`
pub const READY_STATE: &str = "return document.readyState";

/// Value of `document.readyState` once the page has loaded
pub const READY_STATE_COMPLETE: &str = "complete";

/// DOM click on `arguments[0]`, bypassing overlapping elements
pub const CLICK: &str = "arguments[0].click();";

pub const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({block:'center', inline:'nearest'});";

/// True when the centre of `arguments[0]` is not covered by another element
pub const IS_UNOBSCURED: &str = "var el = arguments[0]; \
     var r = el.getBoundingClientRect(); \
     var hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
     return hit === null || hit === el || el.contains(hit);";

/// W3C WebDriver key codepoints
pub mod keys {
    /// Releases held modifiers
    pub const NULL: char = '\u{E000}';
    pub const ENTER: char = '\u{E007}';
    pub const CONTROL: char = '\u{E009}';
    pub const DELETE: char = '\u{E017}';

    /// Select-all chord followed by delete
    pub fn select_all_delete() -> String {
        format!("{}a{}{}", CONTROL, NULL, DELETE)
    }
}
