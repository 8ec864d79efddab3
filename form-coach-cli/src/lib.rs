// Library exports for the form-coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
