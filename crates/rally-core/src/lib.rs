//! Core types and trait definitions for the Rally activity engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the persisted record shapes, the pure domain rules (derived status, order
//! transitions, input validation) and the collaborator traits the engine is
//! written against.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod comment;
pub mod datetime;
pub mod error;
pub mod identity;
pub mod order;
pub mod store;
pub mod user;
pub mod validation;

pub use error::{ErrorKind, Violation};
