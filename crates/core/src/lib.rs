//! Linha Verde Core - Shared types library.
//!
//! This crate provides the domain types used across all Linha Verde components:
//! - `storefront` - Public catalog and vehicle detail pages
//! - `admin` - Authenticated inventory panel
//! - `cli` - Command-line tools for seeding and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Anything that talks to the hosted backend lives in
//! `linha-verde-supabase`.
//!
//! # Modules
//!
//! - [`types`] - Vehicle record, identifiers, tolerant amounts, text codecs
//! - [`format`] - pt-BR display formatting for prices and mileage
//! - [`form`] - Editing-form representation and validation
//! - [`fallback`] - Static sample catalogue shown when the backend is unavailable

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fallback;
pub mod form;
pub mod format;
pub mod types;

pub use form::{ValidationError, VehicleForm};
pub use format::{format_mileage, format_price};
pub use types::*;
