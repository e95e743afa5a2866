//! Fuzzing library for campaign-analyst.
//!
//! This crate provides fuzzing targets for the model response parser and
//! the view renderers, which take untrusted model output.
//!
//! # Usage
//!
//! ```bash
//! cd crates/campaign-fuzz
//! cargo +nightly fuzz run fuzz_analysis_parse -- -max_total_time=60
//! ```

pub use campaign_analyst::{parser, render};
