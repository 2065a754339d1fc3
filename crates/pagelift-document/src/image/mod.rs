// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Image module — the owned frame value type flowing through the pipeline.

pub mod frame;

pub use frame::Frame;
