//! Munakas radar daemon library
//!
//! This module re-exports the daemon's modules for integration testing.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod server;
pub mod telemetry;
