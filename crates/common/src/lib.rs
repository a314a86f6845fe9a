//! Common types and utilities for OpenETS
//!
//! This crate provides shared types, traits, and utilities used across
//! all OpenETS crates.
//!
//! # Modules
//!
//! - [`error`] - Input validation error types
//! - [`types`] - Shared domain types (EntityId, FuelGroup, Entity, EntityRecord)
//! - [`math`] - Division guards shared by every pipeline stage

pub mod error;
pub mod math;
pub mod types;

pub use error::{Error, Result};
pub use math::{non_zero, ratio_or, safe_ratio, EPSILON};
pub use types::*;
