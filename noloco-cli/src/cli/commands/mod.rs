//! Command handlers

pub mod config;
pub mod discover;
pub mod options;
pub mod poll;
pub mod records;
