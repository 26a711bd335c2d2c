//! Legora Core - Shared types library.
//!
//! This crate provides common types used across all Legora components:
//! - `storefront` - Session state (cart, wishlist, toasts), checkout and the JSON API
//! - `cli` - Command-line tools that manipulate the persisted cart and wishlist
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, emails, statuses and line item types
//! - [`catalog`] - Validation of admin product and category input

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
