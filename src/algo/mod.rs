//! Parameterization algorithms.
//!
//! - **Parameterization**: seamless, constrained parameterization from
//!   combed directional fields
//! - **Progress**: injected callbacks for following long solves

pub mod parameterize;
mod progress;

pub use progress::{Progress, Stage};
