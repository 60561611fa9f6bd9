//! ForvrMurr storefront library.
//!
//! Client-side state and view models for the perfume-sample storefront:
//!
//! - [`cart`] - the cart state synchronizer mirroring the backend cart
//! - [`api`] - HTTP clients for the cart and product catalog
//! - [`catalog`] - product cards and note highlights
//! - [`checkout`] - order summary totals
//! - [`storage`], [`identity`], [`notify`] - collaborator seams
//!
//! The backend owns pricing, discounts, tax and guest sessions; this crate
//! only fetches, mirrors and presents.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod storage;
