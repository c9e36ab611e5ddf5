pub mod errors;

pub use errors::{ExitPlaceholder, PhzError, PhzErrorCategory, PhzResult};
