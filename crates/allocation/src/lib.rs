//! Allocation Engine for OpenETS
//!
//! Turns an entity and its assigned benchmark into free allocation and a net
//! position. Positive net positions are buyers, negative ones sellers.
//!
//! Allocation intensity blends the entity's own intensity toward the
//! benchmark: `I + smoothing·(B − I)`. Entities above their benchmark can
//! additionally be compensated for part of the gap through the transitional
//! factor.

pub mod calculator;
pub mod types;

pub use calculator::{allocate, AllocationCalculator};
pub use types::{Allocation, Side};
