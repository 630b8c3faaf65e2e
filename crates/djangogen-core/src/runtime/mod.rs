//! External tool invocation and toolchain detection
//!
//! This module provides:
//! - Command descriptors and the process runner used by the pipeline
//! - Advisory detection of the Django generator and Python runtime

pub mod check;
pub mod command;

pub use check::{check_tool, check_toolchain, RuntimeInfo};
pub use command::{CommandResult, CommandRunner, ExternalCommand, SystemRunner};
