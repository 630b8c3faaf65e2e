//! Pipeline orchestration
//!
//! A run moves through `Idle → WorkspaceReady → Bootstrapped → Configured →
//! BuildComplete → Seeded → Packaged → Done`. The first failing stage moves it
//! straight to `Failed`. The workspace is released exactly once, before either
//! terminal state is entered.

use crate::archive::{self, ArchiveSummary};
use crate::config::{PipelineConfig, WORKSPACE_PREFIX};
use crate::error::PipelineError;
use crate::files::{self, WrittenEntry};
use crate::runtime::command::{CommandRunner, ExternalCommand, SystemRunner};
use crate::seed::{self, SeedPayload, SEED_FILE_NAME};
use crate::workspace::Workspace;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// States of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    WorkspaceReady,
    Bootstrapped,
    Configured,
    BuildComplete,
    Seeded,
    Packaged,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The discrete steps of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Workspace,
    Bootstrap,
    Configure,
    Build,
    Seed,
    Package,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Workspace => "workspace",
            Stage::Bootstrap => "bootstrap",
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Seed => "seed",
            Stage::Package => "package",
        }
    }

    /// State a run must be in for this stage to start
    pub fn requires(self) -> PipelineState {
        match self {
            Stage::Workspace => PipelineState::Idle,
            Stage::Bootstrap => PipelineState::WorkspaceReady,
            Stage::Configure => PipelineState::Bootstrapped,
            Stage::Build => PipelineState::Configured,
            Stage::Seed => PipelineState::BuildComplete,
            Stage::Package => PipelineState::Seeded,
        }
    }

    /// State reached when this stage succeeds
    pub fn completes(self) -> PipelineState {
        match self {
            Stage::Workspace => PipelineState::WorkspaceReady,
            Stage::Bootstrap => PipelineState::Bootstrapped,
            Stage::Configure => PipelineState::Configured,
            Stage::Build => PipelineState::BuildComplete,
            Stage::Seed => PipelineState::Seeded,
            Stage::Package => PipelineState::Packaged,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records every state a run passes through
#[derive(Debug)]
struct StateTracker {
    states: Vec<PipelineState>,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Idle],
        }
    }

    fn current(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    fn complete(&mut self, stage: Stage) {
        debug_assert_eq!(self.current(), stage.requires());
        let next = stage.completes();
        info!(stage = %stage, state = %next, "stage complete");
        self.states.push(next);
    }

    fn finish(mut self, terminal: PipelineState) -> Vec<PipelineState> {
        debug_assert!(terminal.is_terminal() && !self.current().is_terminal());
        self.states.push(terminal);
        self.states
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub archive_path: PathBuf,
    pub summary: ArchiveSummary,
    pub written: Vec<WrittenEntry>,
    pub seed: SeedPayload,
    /// Seed script path relative to the project root
    pub seed_path: PathBuf,
    pub commands: Vec<String>,
    pub states: Vec<PipelineState>,
    /// The (now removed) workspace the run used
    pub workspace: PathBuf,
}

/// Why a run stopped, and where
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
    pub states: Vec<PipelineState>,
    /// The (now removed) workspace, if one was acquired
    pub workspace: Option<PathBuf>,
}

struct StageFailure {
    stage: Stage,
    error: PipelineError,
}

impl StageFailure {
    fn new(stage: Stage, error: impl Into<PipelineError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

struct StageOutputs {
    written: Vec<WrittenEntry>,
    seed: SeedPayload,
    summary: ArchiveSummary,
    commands: Vec<String>,
}

/// Sequences workspace, tools, file generation, seeding and packaging
pub struct Pipeline<R = SystemRunner> {
    config: PipelineConfig,
    runner: R,
}

impl Pipeline<SystemRunner> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn with_runner(config: PipelineConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run every stage; the workspace is gone when this returns
    #[instrument(skip_all, fields(project = %self.config.project_name()))]
    pub async fn run(&self) -> Result<RunReport, PipelineFailure> {
        let mut tracker = StateTracker::new();

        let workspace = match Workspace::acquire(self.config.workspace_base(), WORKSPACE_PREFIX) {
            Ok(ws) => ws,
            Err(e) => {
                error!(error = %e, "failed to create workspace");
                return Err(PipelineFailure {
                    stage: Stage::Workspace,
                    error: e.into(),
                    states: tracker.finish(PipelineState::Failed),
                    workspace: None,
                });
            }
        };
        tracker.complete(Stage::Workspace);
        let workspace_path = workspace.path().to_path_buf();

        let outcome = self.run_stages(&workspace_path, &mut tracker).await;

        // Teardown runs on every path, before the terminal state is entered
        if let Err(e) = workspace.release() {
            warn!(error = %e, path = %workspace_path.display(), "failed to remove workspace");
        }

        match outcome {
            Ok(outputs) => {
                let states = tracker.finish(PipelineState::Done);
                info!(archive = %self.config.archive_path().display(), "pipeline done");
                Ok(RunReport {
                    archive_path: self.config.archive_path(),
                    summary: outputs.summary,
                    written: outputs.written,
                    seed: outputs.seed,
                    seed_path: PathBuf::from(SEED_FILE_NAME),
                    commands: outputs.commands,
                    states,
                    workspace: workspace_path,
                })
            }
            Err(failure) => {
                error!(stage = %failure.stage, error = %failure.error, "pipeline failed");
                Err(PipelineFailure {
                    stage: failure.stage,
                    error: failure.error,
                    states: tracker.finish(PipelineState::Failed),
                    workspace: Some(workspace_path),
                })
            }
        }
    }

    async fn run_stages(
        &self,
        workspace: &Path,
        tracker: &mut StateTracker,
    ) -> Result<StageOutputs, StageFailure> {
        let mut commands = Vec::new();

        let project_root = self
            .bootstrap(workspace, &mut commands)
            .await
            .map_err(|e| StageFailure::new(Stage::Bootstrap, e))?;
        tracker.complete(Stage::Bootstrap);

        let written = files::write_all(&project_root, self.config.files(), self.config.project())
            .await
            .map_err(|e| StageFailure::new(Stage::Configure, e))?;
        tracker.complete(Stage::Configure);

        self.build(&project_root, &mut commands)
            .await
            .map_err(|e| StageFailure::new(Stage::Build, e))?;
        tracker.complete(Stage::Build);

        let seed = self
            .seed(&project_root)
            .await
            .map_err(|e| StageFailure::new(Stage::Seed, e))?;
        tracker.complete(Stage::Seed);

        let summary = archive::pack(&project_root, &self.config.archive_path())
            .map_err(|e| StageFailure::new(Stage::Package, e))?;
        tracker.complete(Stage::Package);

        Ok(StageOutputs {
            written,
            seed,
            summary,
            commands,
        })
    }

    async fn exec(
        &self,
        command: ExternalCommand,
        log: &mut Vec<String>,
    ) -> Result<(), PipelineError> {
        log.push(command.command_line());
        self.runner.run(&command).await?;
        Ok(())
    }

    /// `startproject` in the workspace, then `startapp` in the new project
    async fn bootstrap(
        &self,
        workspace: &Path,
        log: &mut Vec<String>,
    ) -> Result<PathBuf, PipelineError> {
        let name = self.config.project_name().as_str();
        let app = self.config.project().app_name().as_str();

        self.exec(
            ExternalCommand::new(self.config.generator(), ["startproject", name], workspace),
            log,
        )
        .await?;

        let project_root = workspace.join(name);
        self.exec(
            ExternalCommand::new(
                self.config.runtime(),
                ["manage.py", "startapp", app],
                &project_root,
            ),
            log,
        )
        .await?;

        Ok(project_root)
    }

    async fn build(&self, project_root: &Path, log: &mut Vec<String>) -> Result<(), PipelineError> {
        for step in ["makemigrations", "migrate"] {
            self.exec(
                ExternalCommand::new(self.config.runtime(), ["manage.py", step], project_root),
                log,
            )
            .await?;
        }
        Ok(())
    }

    async fn seed(&self, project_root: &Path) -> Result<SeedPayload, PipelineError> {
        let payload = seed::build_seed_payload(self.config.seed_target(), self.config.seed_records())?;
        files::write_text(project_root, Path::new(SEED_FILE_NAME), &payload.script).await?;
        info!(records = payload.records.len(), file = SEED_FILE_NAME, "seed script written");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_chain_is_contiguous() {
        let stages = [
            Stage::Workspace,
            Stage::Bootstrap,
            Stage::Configure,
            Stage::Build,
            Stage::Seed,
            Stage::Package,
        ];
        assert_eq!(stages[0].requires(), PipelineState::Idle);
        for pair in stages.windows(2) {
            assert_eq!(pair[0].completes(), pair[1].requires());
        }
        assert_eq!(stages[5].completes(), PipelineState::Packaged);
    }

    #[test]
    fn test_tracker_records_full_success_path() {
        let mut tracker = StateTracker::new();
        for stage in [
            Stage::Workspace,
            Stage::Bootstrap,
            Stage::Configure,
            Stage::Build,
            Stage::Seed,
            Stage::Package,
        ] {
            tracker.complete(stage);
        }
        let states = tracker.finish(PipelineState::Done);
        assert_eq!(
            states,
            vec![
                PipelineState::Idle,
                PipelineState::WorkspaceReady,
                PipelineState::Bootstrapped,
                PipelineState::Configured,
                PipelineState::BuildComplete,
                PipelineState::Seeded,
                PipelineState::Packaged,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_failure_from_idle() {
        let states = StateTracker::new().finish(PipelineState::Failed);
        assert_eq!(states, vec![PipelineState::Idle, PipelineState::Failed]);
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Packaged.is_terminal());
    }
}
