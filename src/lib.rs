//! Stitchgrid - pattern preparation for cross-stitch
//!
//! Host side of the `stitch-quant` pipeline: configuration, PNG loading,
//! async services with caching. This library exposes modules for
//! integration testing.

pub mod error;
pub mod image_loader;
pub mod models;
pub mod services;
