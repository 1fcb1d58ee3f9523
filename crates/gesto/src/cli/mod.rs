//! Command implementations.

pub mod collect;
pub mod config;
pub mod hash;
pub mod import;
pub mod models;
pub mod paths;
pub mod remove;
