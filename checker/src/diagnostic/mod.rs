//! Diagnostic support for the trace checker
//!
//! - Error codes with documentation (`btrace explain`, `btrace error-index`)
//! - "Did you mean" suggestions for undefined names

pub mod codes;
pub mod typo;

pub use codes::{ErrorCategory, ErrorCode, ErrorIndex, explain_error};
pub use typo::did_you_mean;
