//! Chunked Draft Generation Orchestrator.
//!
//! Long-form drafts are generated in sequential chunks of two outline
//! sections each, with a rolling context window between calls, job-keyed
//! progress for polling, best-effort FAQ extraction, and persist-before-
//! respond semantics.

pub mod handlers;
pub mod outline;
pub mod progress;
pub mod prompts;
pub mod runner;
