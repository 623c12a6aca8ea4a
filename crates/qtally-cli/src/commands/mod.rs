//! CLI command implementations.

pub mod common;
pub mod count;
pub mod encode;
pub mod oracle;
