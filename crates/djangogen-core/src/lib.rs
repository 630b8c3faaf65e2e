//! djangogen core - scaffolds a Django starter project and packages it as a zip
//!
//! A run is a fixed sequence of stages, each depending on the side effects of
//! the one before:
//!
//! 1. **Workspace** - acquire a uniquely named temporary directory
//! 2. **Bootstrap** - `django-admin startproject`, then `manage.py startapp`
//! 3. **Configure** - overwrite the generated settings, routes, model, admin and templates
//! 4. **Build** - `manage.py makemigrations` and `manage.py migrate`
//! 5. **Seed** - write a script that replaces the example posts
//! 6. **Package** - zip the project tree into `<ProjectName>.zip`
//!
//! The first failure halts the run. The workspace is removed on every outcome.
//!
//! # Example Usage
//!
//! ```no_run
//! use djangogen_core::{Pipeline, PipelineConfig, Settings};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_settings(&Settings::default().with_env())?;
//! let report = Pipeline::new(config).run().await?;
//! println!("{} entries", report.summary.entry_count);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod files;
pub mod pipeline;
pub mod runtime;
pub mod seed;
pub mod workspace;

// Re-export main types for convenience
pub use archive::{pack, ArchiveEntry, ArchiveSummary};
pub use config::{PipelineConfig, ProjectName, Settings, ToolCommand};
pub use error::{
    ArchiveError, ConfigError, ExternalToolError, FileWriteError, PipelineError, SeedError,
    WorkspaceError,
};
pub use files::{FileSpec, ProjectContext};
pub use pipeline::{Pipeline, PipelineFailure, PipelineState, RunReport, Stage};
pub use runtime::{CommandResult, CommandRunner, ExternalCommand, RuntimeInfo, SystemRunner};
pub use seed::{build_seed_payload, RecordSpec, SeedPayload};
pub use workspace::Workspace;
