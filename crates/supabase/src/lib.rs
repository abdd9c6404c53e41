//! Linha Verde backend clients.
//!
//! The site relies on a hosted Supabase project for three capabilities, each
//! modelled as a trait so components receive them by injection:
//!
//! - [`RecordStore`] - the `vehicles` table (`PostgREST`)
//! - [`AuthService`] - email/password accounts (`GoTrue`)
//! - [`BlobStorage`] - the public `vehicle-images` bucket
//!
//! Two implementations are provided:
//!
//! - [`SupabaseClient`] - talks to the real project over HTTPS
//! - [`MemoryBackend`] - in-process state with call recording and failure
//!   injection, for tests and offline local runs
//!
//! [`Backend`] bundles one implementation of each trait behind `Arc`s.
//!
//! # Example
//!
//! ```rust,ignore
//! use linha_verde_supabase::{Backend, BackendMode, SortOrder};
//!
//! let backend = Backend::from_mode(&BackendMode::from_env()?);
//! let vehicles = backend.records.list(SortOrder::NewestFirst).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod backend;
pub mod client;
pub mod config;
mod error;
pub mod memory;
mod types;

pub use backend::{AuthService, Backend, BlobStorage, RecordStore};
pub use client::SupabaseClient;
pub use config::{BackendMode, ConfigError, SupabaseConfig};
pub use error::BackendError;
pub use memory::{BackendCall, MemoryBackend, Operation};
pub use types::{AccessToken, AuthSession, SignUpOutcome, SortOrder, UploadFile, User};
