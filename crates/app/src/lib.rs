//! # habridge-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RemoteStateService`: read, command and watch remote items
//!   - `AccessoryHost`: receive characteristic changes
//! - Bind characteristics to items (`SubscriptionBinder`), degrade optional
//!   characteristics gracefully (`resolve_optional`) and serialize composite
//!   writes (`CompositeCommitCoordinator`)
//! - Assemble accessories per device kind and expose them through the
//!   `AccessoryRegistry`
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `habridge-domain` only (plus `tokio` for channels, tasks and
//! timeouts). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod accessory;
pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
