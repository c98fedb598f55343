//! Library exports for plotbooth.
//!
//! The binary is a thin CLI over these modules; the schema dumper and the
//! tests reuse the same configuration and pipeline types.

pub mod app;
pub mod capture;
pub mod config;
pub mod device;
pub mod geometry;
pub mod pipeline;
pub mod remote;

pub use config::Config;
