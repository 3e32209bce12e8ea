//! Service container for dependency injection
//!
//! Wires settings and the filesystem boundary into chart services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, ChartLoader, ChartService, RenderOptions};
use crate::config::Settings;
use crate::domain::{NodeId, ViewState};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn chart_loader(&self) -> ChartLoader {
        ChartLoader::new(Arc::clone(&self.fs))
    }

    /// Chart file from the command line, falling back to `chart_file` from settings.
    pub fn resolve_chart_path(&self, explicit: Option<&Path>) -> ApplicationResult<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.chart_file.clone())
            .ok_or_else(|| ApplicationError::Config {
                message: "no chart file given and chart_file not configured".to_string(),
            })
    }

    /// Load the chart and wrap it in a service with configured render options
    /// and initial collapse flags.
    pub fn chart_service(&self, explicit: Option<&Path>) -> ApplicationResult<ChartService> {
        let path = self.resolve_chart_path(explicit)?;
        debug!("chart path: {}", path.display());
        let tree = self.chart_loader().load(&path)?;
        let view = ViewState::from_collapsed(
            self.settings
                .render
                .collapsed
                .iter()
                .map(|s| NodeId::from_input(s)),
        );
        Ok(ChartService::new(tree)
            .with_view(view)
            .with_render_options(RenderOptions::from(&self.settings.render)))
    }
}
