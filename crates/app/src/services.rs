//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod binder;
pub mod commit;
pub mod optional;
pub mod registry;
pub mod timeout;
