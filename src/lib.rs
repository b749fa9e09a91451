//! Maintain domain allow/deny lists stored as plain-text files in a
//! Git-hosted repository.
//!
//! Each list is a text file with one domain per line, living in a project on
//! a Git-hosting provider. Changes go through the provider's commit API and
//! the resulting CI pipeline can be inspected or retriggered.
//!
//! The seams mirror the layering: [`domain`] holds the list mutation logic
//! and the [`domain::RepositoryClient`] trait, [`infrastructure`] holds the
//! concrete provider client and the factory that selects one by provider
//! key, and [`service`] wires them together.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;
