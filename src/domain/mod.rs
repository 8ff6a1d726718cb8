//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - applicant form enums (`Checking`, `CreditHistory`, `Savings`)
//! - the raw attribute record (`RawRecord`, `AttributeValue`)
//! - schema/vector types (`SchemaColumns`, `AlignedVector`)
//! - scoring outputs (`Decision`, `ScoreResult`, `Attribution`)

pub mod types;

pub use types::*;
