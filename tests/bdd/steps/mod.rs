//! Step definitions for Cucumber BDD tests
//!
//! Steps are thin: each one drives a page object through the scenario's
//! session and asserts on what the page reports.

pub mod checkout;
pub mod inventory;
pub mod login;
pub mod url;
