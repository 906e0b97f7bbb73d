//! Annotation session management module
//!
//! This module contains:
//! - Session and page state, including the gesture state machine's data
//! - Message types for session interactions

pub mod messages;
pub mod state;
