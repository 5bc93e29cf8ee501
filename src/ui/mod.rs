//! Presentation state for message code blocks and suggestions.
//!
//! - [`code_block`]: copy/diagram/collapse state and line rendering.
//! - [`markdown`]: locating code blocks in message text.
//! - [`mermaid`]: diagram configuration and export.
//! - [`suggestions`]: follow-up prompt cards.
//! - [`theme`]: color/style policy.

pub mod code_block;
pub mod markdown;
pub mod mermaid;
pub mod suggestions;
pub mod theme;
