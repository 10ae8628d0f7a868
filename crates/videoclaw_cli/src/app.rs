//! Process-wide state for one CLI invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use videoclaw_core::config::{global_config_path, ConfigManager, Settings};
use videoclaw_core::logging::{LogLevel, LoggerRegistry};
use videoclaw_core::orchestrator::{Context, TerminalConfirmer};
use videoclaw_core::project::{default_projects_root, ProjectLayout};

use crate::cli::{Cli, StepArgs};

/// Media kind a step's `--provider` flag applies to.
#[derive(Debug, Clone, Copy)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

pub struct App {
    root: PathBuf,
    global_config: Option<PathBuf>,
    verbose: bool,
    loggers: LoggerRegistry,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let console = Arc::new(|| -> videoclaw_core::logging::ConsoleCallback {
            Box::new(|_level: LogLevel, line: &str| eprintln!("{}", line))
        });
        Self {
            root: cli.root.clone().unwrap_or_else(default_projects_root),
            global_config: cli.config.clone().or_else(global_config_path),
            verbose: cli.verbose,
            loggers: LoggerRegistry::new().with_console(console),
        }
    }

    /// Projects root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn global_config(&self) -> Option<&Path> {
        self.global_config.as_deref()
    }

    pub fn open_project(&self, name: &str) -> Result<ProjectLayout> {
        ProjectLayout::open(&self.root, name)
            .with_context(|| format!("Cannot open project '{}'", name))
    }

    /// Effective settings for a project: defaults, global, project, environment.
    pub fn load_settings(&self, layout: &ProjectLayout) -> Result<Settings> {
        let mut manager = ConfigManager::new()
            .with_global_path(self.global_config.clone())
            .with_project_file(layout.config_file());
        let settings = manager
            .load()
            .with_context(|| format!("Loading configuration for '{}'", layout.name()))?;
        Ok(settings.clone())
    }

    /// Effective settings outside any project: defaults, global, environment.
    pub fn global_settings(&self) -> Result<Settings> {
        let mut manager = ConfigManager::new().with_global_path(self.global_config.clone());
        let settings = manager.load().context("Loading global configuration")?;
        Ok(settings.clone())
    }

    /// Settings with command-line overrides for one step applied.
    pub fn step_settings(
        &self,
        layout: &ProjectLayout,
        args: &StepArgs,
        kind: Option<MediaKind>,
    ) -> Result<Settings> {
        let mut settings = self.load_settings(layout)?;
        if let Some(n) = args.variants {
            settings.pipeline.num_variants = n.max(1);
        }
        if args.interactive {
            settings.pipeline.interactive = true;
        }
        if args.reuse_existing {
            settings.pipeline.reuse_existing = true;
        }
        if let Some(ref provider) = args.provider {
            let models = &mut settings.models;
            match kind {
                Some(MediaKind::Image) => models.image.provider = provider.clone(),
                Some(MediaKind::Video) => models.video.provider = provider.clone(),
                Some(MediaKind::Audio) => models.audio.provider = provider.clone(),
                None => {
                    models.image.provider = provider.clone();
                    models.video.provider = provider.clone();
                    models.audio.provider = provider.clone();
                }
            }
        }
        Ok(settings)
    }

    /// Pipeline context for a project.
    pub fn context(&self, layout: ProjectLayout, settings: Settings) -> Result<Context> {
        let mut log_config = settings.logging.to_log_config();
        if self.verbose {
            log_config.console_level = LogLevel::Debug;
        }
        let logger = self
            .loggers
            .get_or_create(layout.name(), layout.root(), &layout.log_dir(), log_config)
            .with_context(|| format!("Opening log for '{}'", layout.name()))?;

        let interactive = settings.pipeline.interactive;
        let ctx = Context::for_project(layout, settings, logger)?;
        Ok(if interactive {
            ctx.with_confirmer(Box::new(TerminalConfirmer::stdio()))
        } else {
            ctx
        })
    }

    pub fn flush_logs(&self) {
        self.loggers.flush_all();
    }
}
