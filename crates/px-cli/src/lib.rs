//! CLI library components for pxbuild.

pub mod config;
pub mod logging;
pub mod pipeline;
