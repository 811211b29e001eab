//! State module for tracking crawl progress
//!
//! This module provides the state machine every crawl task moves through, from
//! being seeded into the frontier to being done.

mod task_state;

// Re-export main types
pub use task_state::{TaskState, TransitionError};
