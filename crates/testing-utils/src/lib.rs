//! # VOID Testing Utils
//!
//! Shared testing utilities for the VOID workspace: in-memory doubles for the
//! persistence and queue ports, test data builders and async helpers.
//!
//! ## Features
//!
//! - **Transactional store**: in-memory item store whose unit of work stages
//!   writes until `commit`, so rollback-by-default can be observed
//! - **Scripted queue**: a `MessageQueue` that replays a fixed receive script
//!   and records every delete and send
//! - **Test Data Builders**: items and queue messages with sensible defaults
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! void-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
