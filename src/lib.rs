// stayfeed - rental marketplace and social feed over one SQLite store

// Core types and primitives
pub mod core;

// Store infrastructure - connection accessor, schema and resolvers
pub mod infrastructure;

// Row types
pub mod models;

// Domain services
pub mod domains;

// Command surfaces and rendering
pub mod commands;
pub mod output;

// Common utilities
pub mod config;
pub mod error;
pub mod tracing_setup;

// Re-exports for convenience
pub use error::{AppError, AppResult};
