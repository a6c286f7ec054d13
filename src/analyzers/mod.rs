//! Directory-level traffic analysis.
//!
//! This module joins decomposed URLs with their search metrics, groups them
//! by directory at depths one to three, derives per-directory ratios, and
//! turns each level into a display-ready click distribution.

pub mod aggregate;
pub mod analyzer;
pub mod distribution;
pub mod highlight;
pub mod join;
pub mod types;
pub mod utility;
