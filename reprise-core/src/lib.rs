#![warn(missing_docs)]
//! # reprise-core
//!
//! Core types shared by every reprise crate.
//!
//! This crate has no async runtime and no store client. It defines the
//! vocabulary the rest of the workspace speaks:
//!
//! - [`Key`] and [`IdentityGenerator`] for opaque per-item identifiers
//! - [`StoredValue`] for the four kinds of data the cache accepts
//! - [`OperationName`] for the names call counters and histories live under
//! - [`StoreLabel`] for identifying store backends in logs and metrics

pub mod key;
pub mod label;
pub mod operation;
pub mod value;

pub use key::{IdentityGenerator, Key, RandomIdentity};
pub use label::StoreLabel;
pub use operation::OperationName;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use value::StoredValue;
