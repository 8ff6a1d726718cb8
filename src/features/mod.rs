//! Feature preparation: one-hot encoding and schema alignment.
//!
//! Both steps are pure functions; everything the model ultimately sees is
//! produced here from a [`crate::domain::RawRecord`] and the training schema.

pub mod align;
pub mod encode;

pub use align::{align, Alignment, AlignmentReport};
pub use encode::{encode, sanitize_column, EncodedVector};
