//! ForvrMurr Core - Shared types library.
//!
//! This crate provides common types used across all ForvrMurr components:
//! - `storefront` - Cart synchronizer, catalog and checkout view models
//! - `cli` - Command-line driver for the storefront backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, guest tokens, prices and scent notes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
