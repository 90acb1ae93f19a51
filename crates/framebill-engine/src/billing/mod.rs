//! Billing line lifecycle, storage, and service

pub mod lifecycle;
pub mod service;
pub mod store;

pub use lifecycle::{FrozenRates, LineContext};
pub use service::{BillingService, DirectLineRequest, LineEdit, ManualLineRequest};
pub use store::{InMemoryLineStore, LineStore};
