//! Core data types for the Framebill billing engine

pub mod billing_line;
pub mod modifier;
pub mod project;
pub mod rate_card;
pub mod rate_item;
pub mod rule;
