//! Core types and the conflict engine for exam slot scheduling.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! implement [`store::AssignmentStore`]; the [`scheduler::Scheduler`] runs the
//! commit path on top of any of them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod catalog;
pub mod conflict;
pub mod error;
pub mod guard;
pub mod scheduler;
pub mod slot;
pub mod store;

pub use error::{Error, Result};
