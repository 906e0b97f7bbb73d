//! Ordered box store
//!
//! This module provides:
//! - Ordering and reindexing helpers, including the list-reorder parser
//! - Message handlers for box store mutations

pub mod handlers;
pub mod ordering;
