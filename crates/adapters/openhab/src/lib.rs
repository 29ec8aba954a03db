//! # habridge-adapter-openhab
//!
//! Remote state adapter talking to an openHAB server over its REST API.
//!
//! | Operation      | Request                                   |
//! |----------------|-------------------------------------------|
//! | item lookup    | `GET /rest/items/{item}`                  |
//! | state read     | `GET /rest/items/{item}/state`            |
//! | command        | `POST /rest/items/{item}` (`text/plain`)  |
//! | state changes  | `GET /rest/events` (server-sent events)   |
//!
//! ## Dependency rule
//!
//! Depends on `habridge-app` (port traits) and `habridge-domain` only.

pub mod client;
pub mod config;
pub mod error;
pub mod events;

pub use client::OpenHabClient;
pub use config::OpenHabConfig;
pub use error::OpenHabError;
