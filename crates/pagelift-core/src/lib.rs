// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Pagelift — Core types, error definitions, and compiled-in tunables shared
// across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DetectorConfig, EnhanceConfig, RectifyConfig, ScanConfig};
pub use error::PageliftError;
pub use types::*;
