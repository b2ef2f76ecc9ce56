//! CSV writing operations.

mod write;

pub(crate) use write::*;
