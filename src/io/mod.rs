//! Artifact and export I/O.
//!
//! Keeping all filesystem access in one place leaves the encoding, scoring,
//! and explanation modules pure.

pub mod artifact;
pub mod export;
