//! Wire models for the dispatcher protocol
//!
//! One JSON object per line in each direction: a typed request in, exactly
//! one response record out.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{Operation, WireRequest};
pub use responses::WireResponse;
