//! # habridge-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Expose the assembled accessories as JSON (`/api/accessories`)
//! - Read a characteristic through its binding and write batches through the
//!   accessory's commit coordinator
//! - Stream every characteristic change pushed to the host as server-sent
//!   events (`/api/events/stream`)
//!
//! ## Dependency rule
//! Depends on `habridge-app` (for port traits and services) and
//! `habridge-domain` (for the types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
