//! # Framebill Engine
//!
//! Billing line calculation for photo/video production work: turns a
//! catalog rate, a quantity and ad-hoc adjustments into the exact amount a
//! client is billed and a contractor is paid.
//!
//! ## Pipeline
//!
//! ```text
//! Rate Resolver -> Quantity Rule -> Modifiers (client, cost) -> Tax & Margin
//!                                                                   |
//!                                   BillingLineComputation <--------+
//! ```
//!
//! The pricing pipeline is pure and synchronous. The [`billing`] module wraps
//! it with the line state machine, an optimistic-concurrency line store and
//! the service adapters used by the add and edit flows.

pub mod billing;
pub mod catalog;
pub mod config;
pub mod pricing;

pub use billing::{
    BillingService, DirectLineRequest, InMemoryLineStore, LineEdit, LineStore, ManualLineRequest,
};
pub use catalog::{InMemoryRateCatalog, RateCatalogReader, ReasonCodeCatalog};
pub use config::{EngineConfig, ModifierBounds};
pub use pricing::{
    compute_billing_line, BillingLineAssembler, BillingLineComputation, BillingLineInput,
    RateBasis, ResolvedRates, TaxSettings,
};
