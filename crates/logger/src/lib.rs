//! Tracing setup shared by the autoconf binaries.

mod tracing;

pub use crate::tracing::{LogFormat, init_tracing, init_tracing_with};
