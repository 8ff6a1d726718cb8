//! Built-in demo data: the sanitized training-column universe, a small
//! deterministic tree ensemble, and random applicant generation.

pub mod sample;
