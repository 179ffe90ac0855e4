//! Shared configuration for the document QA workspace.

pub mod config;

pub use config::Config;
