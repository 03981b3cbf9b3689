//! # folio-core
//!
//! Domain types for the live portfolio dashboard.
//!
//! - [`PortfolioValue`]: the single shared balance, read lock-free by any number
//!   of readers and written only by the generator
//! - [`ValueGenerator`]: background loop that perturbs the balance on a fixed
//!   cadence and hands every new sample to a [`ValuePublisher`]
//! - [`CredentialStore`]: in-memory exchange credentials entered from the
//!   configuration page

#![deny(unsafe_code)]

pub mod credentials;
pub mod delta;
pub mod errors;
pub mod generator;
pub mod value;

pub use credentials::CredentialStore;
pub use delta::{DeltaSource, UniformDelta};
pub use errors::{CoreError, Result};
pub use generator::{ValueGenerator, ValuePublisher};
pub use value::{PortfolioSnapshot, PortfolioValue};
