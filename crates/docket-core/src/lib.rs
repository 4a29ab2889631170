//! Domain types, the store trait, and the case lifecycle, scheduling, and
//! retrieval logic of the Docket case-record system.
//!
//! No HTTP or database code lives here; the other crates plug their
//! backends and transports into the traits this one defines.

// Native `async fn` in traits; the advisory lint about `Send` bounds on the
// returned futures does not apply to how these traits are declared.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod case;
pub mod error;
pub mod lifecycle;
pub mod resolver;
pub mod scheduler;
pub mod store;

pub use error::{Error, Result};
