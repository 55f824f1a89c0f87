//! Newsstand Core - Shared types library.
//!
//! This crate provides common types used across all Newsstand components:
//! - `portal` - Session layer for the reader/admin portal
//! - `cli` - Command-line client for the portal backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
