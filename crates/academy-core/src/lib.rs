//! Core types and trait definitions for the training-academy domain.
//!
//! This crate holds the entities, their invariants, and the repository
//! contracts. It is deliberately free of database dependencies; backends
//! such as `academy-store-sqlite` implement the traits in [`repository`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod campus;
pub mod course;
pub mod error;
pub mod instructor;
pub mod repository;
pub mod scope;
pub mod service;
pub mod value;

pub use error::{Error, Result};
