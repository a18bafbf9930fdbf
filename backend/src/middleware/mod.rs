//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside any one handler,
//! currently the per-request trace identifier.

pub mod trace;

pub use trace::Trace;
