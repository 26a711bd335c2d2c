//! Core types for Legora.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod line;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use line::{CartLine, LineKey, LineSelector, ProductSnapshot, WishlistItem};
pub use price::{Price, PriceError, parse_display_price};
pub use status::*;
