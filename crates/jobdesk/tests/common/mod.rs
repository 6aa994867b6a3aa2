//! Shared test utilities for jobdesk integration tests.
//!
//! - `TestHarness` wires a seeded `MemoryStore` to a `JobForm`
//! - store wrappers for gating and non-atomic commits
//! - `DraftBuilder` for complete, valid drafts

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
