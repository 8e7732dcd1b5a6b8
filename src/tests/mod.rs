use super::*;

mod events_and_focus;
