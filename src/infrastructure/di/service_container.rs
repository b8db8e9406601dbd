//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{KnowledgeService, SessionService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::KnowledgeBase;
use crate::infrastructure::traits::{Console, FileSystem, RealFileSystem, TerminalConsole};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Console for interactive sessions
    pub console: Arc<dyn Console>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(TerminalConsole),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        console: Arc<dyn Console>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            console,
        }
    }

    /// Knowledge service configured from the settings.
    pub fn knowledge_service(&self) -> KnowledgeService {
        KnowledgeService::new(
            Arc::clone(&self.fs),
            self.settings.arena_options(),
            self.settings.codec_options(),
        )
    }

    /// Interactive session on `file`, or on a fresh knowledge base when the
    /// file is absent or does not exist yet.
    pub fn session_service(&self, file: Option<PathBuf>) -> ApplicationResult<SessionService> {
        let knowledge = self.knowledge_service();
        let kb: KnowledgeBase = match &file {
            Some(path) if self.fs.exists(path) => knowledge.load(path)?,
            _ => knowledge.fresh(&self.settings.session.root_name)?,
        };
        Ok(SessionService::new(
            knowledge,
            Arc::clone(&self.console),
            kb,
            file,
        ))
    }
}
