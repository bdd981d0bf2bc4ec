//! Utility modules shared by the evaluation components

pub mod cache;

pub use cache::*;
