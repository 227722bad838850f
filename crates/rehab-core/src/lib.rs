//! # Rehab-Core
//!
//! Core types and utilities for the rehab exercise coach: landmark frames
//! produced by an external pose/hand tracker, timestamps and identifiers,
//! the shared error type, and the joint-angle geometry every detector
//! builds on.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
