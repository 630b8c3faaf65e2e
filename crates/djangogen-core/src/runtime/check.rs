//! Toolchain detection for the Django generator and Python runtime
//!
//! Detection is advisory: a missing tool is reported, and the bootstrap stage
//! is left to fail with the real error.

use crate::config::{PipelineConfig, ToolCommand};
use std::process::Command;

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether a tool answers `--version`
pub fn check_tool(tool: &ToolCommand) -> RuntimeInfo {
    let output = Command::new(&tool.program)
        .args(&tool.args)
        .arg("--version")
        .output();

    match output {
        Ok(out) if out.status.success() => {
            // Older Pythons print their version on stderr
            let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
            let version = if stdout.is_empty() {
                String::from_utf8_lossy(&out.stderr).trim().to_string()
            } else {
                stdout
            };
            RuntimeInfo {
                name: tool.to_string(),
                version: Some(version).filter(|v| !v.is_empty()),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name: tool.to_string(),
            version: None,
            available: false,
        },
    }
}

/// Check the generator and runtime a pipeline is configured with
pub fn check_toolchain(config: &PipelineConfig) -> Vec<RuntimeInfo> {
    vec![check_tool(config.generator()), check_tool(config.runtime())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_unavailable() {
        let tool = ToolCommand::parse("generator", "djangogen-missing-tool-9c2e").unwrap();
        let info = check_tool(&tool);
        assert!(!info.available);
        assert!(info.version.is_none());
        assert_eq!(info.name, "djangogen-missing-tool-9c2e");
    }

    #[cfg(unix)]
    #[test]
    fn test_version_is_captured() {
        // `--version` lands in $1 and is ignored by the script
        let tool = ToolCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo 5.0.1".to_string(), "sh".to_string()],
        };
        let info = check_tool(&tool);
        assert!(info.available);
        assert_eq!(info.version.as_deref(), Some("5.0.1"));
    }
}
