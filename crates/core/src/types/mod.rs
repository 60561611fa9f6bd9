//! Core types for ForvrMurr.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod note;
pub mod price;
pub mod product;

pub use id::*;
pub use note::{NoteCategory, ScentNote, ScentNotes};
pub use price::{CurrencyCode, Price};
pub use product::ProductTier;
