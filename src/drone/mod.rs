//! Build and repository metadata supplied by the CI runner

pub mod types;

pub use types::*;
