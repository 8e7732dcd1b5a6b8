//! Enter-to-next-field navigation for HTML forms, with a deterministic DOM
//! host for running it in Rust tests.
//!
//! ```
//! use form_navigator::Harness;
//!
//! let html = r#"
//!   <form id="signup">
//!     <input id="name">
//!     <input id="email">
//!     <input id="send" type="submit">
//!   </form>
//! "#;
//! let mut h = Harness::from_html(html)?;
//! h.press_enter("#name")?;
//! h.assert_focused("#email")?;
//! h.press_enter("#email")?;
//! assert!(h.submissions().is_empty());
//! # Ok::<(), form_navigator::Error>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt;

mod core_impl;
mod lib_parts;
mod navigator;
mod selector;

#[cfg(test)]
mod tests;

use core_impl::*;
use selector::*;

pub use lib_parts::harness_api::Harness;
pub use lib_parts::runtime_state::{HarnessOptions, Submission};
pub use core_impl::Dom;
pub use navigator::{ENTER_KEY, EnterOutcome, FieldSequence, FormKey, FormNavigator};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    InvalidConfig(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// Handle to a node in a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
