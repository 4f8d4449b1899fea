//! Shared command setup: settings, store, and the optional sync queue.

use std::sync::Arc;

use crate::cli::args::Cli;
use crate::config::{load_config, validate, Overrides, Settings};
use crate::editor::Editor;
use crate::error::{ProcGatherError, Result};
use crate::model::ProcessId;
use crate::store::LocalStore;
use crate::sync::{HttpRemote, SyncClient, SyncQueue};
use crate::ui::{Prompt, UserInterface};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
    assume_yes: bool,
}

impl AppContext {
    /// Create a context from resolved settings.
    pub fn new(settings: Settings, assume_yes: bool) -> Self {
        Self {
            settings,
            assume_yes,
        }
    }

    /// Load and validate config, then layer the CLI's flags and env over it.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        validate(&config)?;

        let overrides = Overrides {
            data_dir: cli.data_dir.clone(),
            api_base: cli.api_base.clone(),
        };
        let settings = Settings::resolve(&config, &overrides)?;
        tracing::debug!(
            "Data dir {}, sync {}",
            settings.data_dir.display(),
            settings.api_base.as_deref().unwrap_or("off")
        );

        Ok(Self::new(settings, cli.yes))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Open the store and wrap it in an editor, syncing when a remote is
    /// configured.
    pub fn open_editor(&self) -> Result<Editor> {
        let store = Arc::new(LocalStore::open_dir(&self.settings.data_dir)?);
        let editor = Editor::new(Arc::clone(&store));

        match &self.settings.api_base {
            Some(base) => {
                let remote = HttpRemote::new(base, self.settings.timeout)?;
                let queue = SyncQueue::start(store, SyncClient::new(Arc::new(remote)));
                Ok(editor.with_sync(queue))
            }
            None => Ok(editor),
        }
    }

    /// Open `id`, or the most recently updated process when `None`.
    pub fn open_process(&self, editor: &mut Editor, id: Option<ProcessId>) -> Result<ProcessId> {
        match id {
            Some(id) => {
                editor.open_process(id)?;
                Ok(id)
            }
            None => editor.open_latest()?.ok_or(ProcGatherError::NoActiveProcess),
        }
    }

    /// Ask before a destructive operation. `--yes` skips the question.
    pub fn confirm(&self, ui: &mut dyn UserInterface, key: &str, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = ui.prompt(&Prompt::confirm(key, question, false))?;
        Ok(answer.as_bool().unwrap_or(false))
    }
}
