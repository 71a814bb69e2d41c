//! Error types shared with the rest of the workspace

pub use nd_error::{DisplayError, Result};
