//! # habridge-domain
//!
//! Pure domain model for the habridge openHAB accessory bridge.
//!
//! ## Responsibilities
//! - Remote **items** and their declared types
//! - **Characteristics**: the typed values exposed to the accessory host
//! - **Transformations** between raw item states and characteristic values,
//!   including the brightness ceiling correction
//! - **Composite commits**: turning a batch of light channel writes into one
//!   command string
//! - Accessory configuration, events and the error taxonomy
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod accessory;
pub mod characteristic;
pub mod command;
pub mod composite;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod item;
pub mod mapping;
pub mod time;
pub mod transform;
