//! Core types for Linha Verde.
//!
//! This module provides type-safe wrappers for the vehicle domain.

pub mod amount;
pub mod features;
pub mod id;
pub mod specifications;
pub mod vehicle;

pub use amount::{Amount, AmountError, AmountKind};
pub use features::Features;
pub use id::VehicleId;
pub use specifications::{Specifications, SpecificationsError};
pub use vehicle::{Vehicle, VehicleFields, VehiclePatch};
