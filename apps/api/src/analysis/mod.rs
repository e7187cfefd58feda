//! Pure content analyzers: SEO checklist scoring and readability.
//!
//! Both are deterministic functions with no I/O or shared state, so the
//! handlers here are reentrant and safe to call concurrently.

pub mod handlers;
pub mod readability;
pub mod seo;
