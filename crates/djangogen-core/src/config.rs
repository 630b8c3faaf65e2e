//! Pipeline configuration
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! `DJANGOGEN_*` environment variables. [`PipelineConfig::from_settings`]
//! validates the result and freezes it for a run.

use crate::error::ConfigError;
use crate::files::layout;
use crate::files::{FileSpec, ProjectContext};
use crate::seed::{self, RecordSpec, SeedTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the project name
pub const PROJECT_NAME_ENV: &str = "DJANGOGEN_PROJECT_NAME";
/// Environment variable overriding the project generator command line
pub const ADMIN_ENV: &str = "DJANGOGEN_ADMIN";
/// Environment variable overriding the runtime command line
pub const PYTHON_ENV: &str = "DJANGOGEN_PYTHON";
/// Environment variable overriding the directory temporary workspaces live in
pub const WORKSPACE_DIR_ENV: &str = "DJANGOGEN_WORKSPACE_DIR";
/// Environment variable overriding where the archive is written
pub const OUTPUT_DIR_ENV: &str = "DJANGOGEN_OUTPUT_DIR";

const DEFAULT_PROJECT_NAME: &str = "MySite";
const DEFAULT_APP_NAME: &str = "main";
const DEFAULT_GENERATOR: &str = "django-admin";
const DEFAULT_RUNTIME: &str = "python";

/// Prefix for workspace directory names
pub const WORKSPACE_PREFIX: &str = "djangogen-";

/// Raw, unvalidated settings as read from defaults, file and environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name of the Django project (also the archive name)
    pub project_name: String,

    /// Name of the application created inside the project
    pub app_name: String,

    /// Command line of the project generator, e.g. `django-admin` or `python -m django`
    pub generator: String,

    /// Command line of the Python runtime used to drive `manage.py`
    pub runtime: String,

    /// Directory temporary workspaces are created in (system temp dir if unset)
    pub workspace_dir: Option<PathBuf>,

    /// Directory the archive is written to (current directory if unset)
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            generator: DEFAULT_GENERATOR.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            workspace_dir: None,
            output_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file; keys missing from the file keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DJANGOGEN_*` overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(PROJECT_NAME_ENV) {
            self.project_name = v;
        }
        if let Some(v) = get(ADMIN_ENV) {
            self.generator = v;
        }
        if let Some(v) = get(PYTHON_ENV) {
            self.runtime = v;
        }
        if let Some(v) = get(WORKSPACE_DIR_ENV) {
            self.workspace_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get(OUTPUT_DIR_ENV) {
            self.output_dir = Some(PathBuf::from(v));
        }
        self
    }
}

/// A validated Python identifier usable as a directory name
fn validate_identifier(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    let first = chars.next().ok_or("name is empty")?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err("must start with an ASCII letter or underscore");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("may only contain ASCII letters, digits and underscores");
    }
    Ok(())
}

/// Django project name; non-empty and safe as a directory and module name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        validate_identifier(name).map_err(|reason| ConfigError::InvalidProjectName {
            name: name.to_string(),
            reason,
        })?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Django application name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        validate_identifier(name).map_err(|reason| ConfigError::InvalidAppName {
            name: name.to_string(),
            reason,
        })?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A program plus leading arguments, e.g. `python -m django`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Split a command line on whitespace
    pub fn parse(field: &'static str, line: &str) -> Result<Self, ConfigError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ConfigError::EmptyCommand { field })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Immutable configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    project: ProjectContext,
    generator: ToolCommand,
    runtime: ToolCommand,
    workspace_base: PathBuf,
    output_dir: PathBuf,
    files: Vec<FileSpec>,
    seed_target: SeedTarget,
    seed_records: Vec<RecordSpec>,
}

impl PipelineConfig {
    /// Validate settings and assemble the ordered file layout and seed records
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let project = ProjectContext::new(
            ProjectName::parse(&settings.project_name)?,
            AppName::parse(&settings.app_name)?,
        );
        let generator = ToolCommand::parse("generator", &settings.generator)?;
        let runtime = ToolCommand::parse("runtime", &settings.runtime)?;

        let files = layout::django_layout(&project);
        layout::check_ordering(&files)?;

        let workspace_base = settings
            .workspace_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let output_dir = settings.output_dir.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

        let seed_target = SeedTarget::new(project.app_name().as_str(), seed::DEFAULT_MODEL);
        let seed_records = seed::default_records(&project);

        Ok(Self {
            project,
            generator,
            runtime,
            workspace_base,
            output_dir,
            files,
            seed_target,
            seed_records,
        })
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn project_name(&self) -> &ProjectName {
        self.project.project_name()
    }

    pub fn generator(&self) -> &ToolCommand {
        &self.generator
    }

    pub fn runtime(&self) -> &ToolCommand {
        &self.runtime
    }

    pub fn workspace_base(&self) -> &Path {
        &self.workspace_base
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ordered file specs; directories precede files written inside them
    pub fn files(&self) -> &[FileSpec] {
        &self.files
    }

    pub fn seed_target(&self) -> &SeedTarget {
        &self.seed_target
    }

    pub fn seed_records(&self) -> &[RecordSpec] {
        &self.seed_records
    }

    /// `<ProjectName>.zip`
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.project.project_name())
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join(self.archive_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_build_mysite_config() {
        let config = PipelineConfig::from_settings(&Settings::default()).unwrap();
        assert_eq!(config.project_name().as_str(), "MySite");
        assert_eq!(config.project().app_name().as_str(), "main");
        assert_eq!(config.archive_name(), "MySite.zip");
        assert_eq!(config.generator().program, "django-admin");
        assert_eq!(config.runtime().to_string(), "python");
        assert!(!config.files().is_empty());
        assert_eq!(config.seed_records().len(), 3);
    }

    #[test]
    fn test_project_name_validation() {
        assert!(ProjectName::parse("MySite").is_ok());
        assert!(ProjectName::parse("_site2").is_ok());
        assert!(ProjectName::parse("").is_err());
        assert!(ProjectName::parse("2site").is_err());
        assert!(ProjectName::parse("my-site").is_err());
        assert!(ProjectName::parse("../etc").is_err());
        assert!(ProjectName::parse("my site").is_err());
    }

    #[test]
    fn test_invalid_project_name_is_reported() {
        let settings = Settings {
            project_name: "bad/name".to_string(),
            ..Settings::default()
        };
        let err = PipelineConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProjectName { .. }));
        assert!(err.to_string().contains("bad/name"));
    }

    #[test]
    fn test_tool_command_parsing() {
        let cmd = ToolCommand::parse("generator", "python -m  django").unwrap();
        assert_eq!(cmd.program, "python");
        assert_eq!(cmd.args, vec!["-m", "django"]);
        assert_eq!(cmd.to_string(), "python -m django");

        let err = ToolCommand::parse("runtime", "   ").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCommand { field: "runtime" }));
    }

    #[test]
    fn test_overrides_take_precedence_and_skip_empty_values() {
        let env: HashMap<&str, &str> = [
            (PROJECT_NAME_ENV, "Blog"),
            (PYTHON_ENV, "python3"),
            (ADMIN_ENV, ""),
            (OUTPUT_DIR_ENV, "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.project_name, "Blog");
        assert_eq!(settings.runtime, "python3");
        assert_eq!(settings.generator, "django-admin");
        assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(settings.workspace_dir, None);
    }

    #[test]
    fn test_settings_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("djangogen.yaml");
        std::fs::write(
            &path,
            "project_name: Shop\nruntime: uv run python\noutput_dir: dist\n",
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.project_name, "Shop");
        assert_eq!(settings.runtime, "uv run python");
        assert_eq!(settings.app_name, "main");
        assert_eq!(settings.output_dir, Some(PathBuf::from("dist")));

        let config = PipelineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.archive_path(), PathBuf::from("dist").join("Shop.zip"));
    }

    #[test]
    fn test_unknown_yaml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("djangogen.yaml");
        std::fs::write(&path, "project_nmae: Typo\n").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Settings::from_file(Path::new("/nonexistent/djangogen.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
