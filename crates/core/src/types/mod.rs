//! Core types for Last Call.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod channel;
pub mod id;
pub mod phone;

pub use channel::Channel;
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
