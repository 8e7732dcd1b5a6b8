use super::*;

mod dom;
mod events;
mod form_controls;
mod html;

pub use dom::Dom;
pub(crate) use events::*;
pub(crate) use form_controls::*;
pub(crate) use html::{is_void_tag, parse_html};
