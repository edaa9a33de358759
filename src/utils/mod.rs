//! Shared helpers used by more than one recovery stage.

pub mod search;
