//! Core types, rule engines and trait definitions for the elective selection
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! eligibility deriver, the constraint validator and the diff engine are pure
//! functions of their inputs; the only mutable state lives behind the
//! [`store::SelectionStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod category;
pub mod classify;
pub mod config;
pub mod diff;
pub mod eligibility;
pub mod error;
pub mod fuzzy;
pub mod reference;
pub mod selection;
pub mod service;
pub mod slot;
pub mod store;
pub mod validate;
pub mod version;

pub use error::{Error, Result};
