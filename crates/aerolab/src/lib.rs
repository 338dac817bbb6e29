//! AeroLab library: application logic for the service and CLI.

pub mod app;
pub mod config;
pub mod errors;
pub mod presenter;
