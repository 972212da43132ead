//! Noloco connector core
//!
//! Schema discovery, field mapping, filter building, paginated record queries
//! and write payload shaping for the Noloco data API, with the record actions,
//! option loaders and poll trigger a workflow host drives them through.

pub mod actions;
pub mod api;
pub mod cli;
pub mod config;
pub mod mapping;
pub mod options;
pub mod trigger;
