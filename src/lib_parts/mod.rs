use super::*;

mod dispatch;
pub(crate) mod harness_api;
pub(crate) mod runtime_state;
mod user_actions;

pub(crate) use runtime_state::*;
