//! Core domain models for provisioning
//!
//! This module defines the pipeline, its execution state, the context
//! actions run against, and how phases of work are reported.

pub mod config;
pub mod context;
pub mod pipeline;
pub mod state;
pub mod status;

pub use context::*;
pub use pipeline::*;
pub use state::*;
pub use status::*;
