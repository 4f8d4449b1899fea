//! Non-interactive UI for pipes, scripts, and CI.
//!
//! Prompts are answered from `PROCGATHER_PROMPT_<KEY>` variables, then
//! from the prompt's default. A prompt with neither is an error rather
//! than a silent guess.

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{ProcGatherError, Result};

use super::{is_affirmative, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

const PROMPT_ENV_PREFIX: &str = "PROCGATHER_PROMPT_";

/// UI implementation for non-interactive mode.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn answer_for<'a>(&'a self, prompt: &'a Prompt) -> Option<&'a String> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        self.env_overrides.get(&env_key).or(prompt.default.as_ref())
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_results() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let Some(answer) = self.answer_for(prompt) else {
            return Err(ProcGatherError::InvalidInput {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (no default value)",
                    prompt.key
                ),
            });
        };

        match &prompt.prompt_type {
            PromptType::Confirm => Ok(PromptResult::Bool(is_affirmative(answer))),
            PromptType::Input => Ok(PromptResult::String(answer.clone())),
            PromptType::Select { options } => {
                if options.iter().any(|o| o.value == *answer) {
                    Ok(PromptResult::String(answer.clone()))
                } else {
                    Err(ProcGatherError::InvalidInput {
                        message: format!("'{}' is not a valid choice for '{}'", answer, prompt.key),
                    })
                }
            }
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n▣ {}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("{}", hint);
        }
    }

    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn uses_default_when_no_override() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Quiet, HashMap::new());
        let result = ui.prompt(&Prompt::confirm("delete", "Delete?", false)).unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn env_override_wins() {
        let mut ui = NonInteractiveUI::with_overrides(
            OutputMode::Quiet,
            overrides(&[("PROCGATHER_PROMPT_DELETE", "yes")]),
        );
        let result = ui.prompt(&Prompt::confirm("delete", "Delete?", false)).unwrap();
        assert_eq!(result, PromptResult::Bool(true));
    }

    #[test]
    fn missing_answer_is_an_error() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Quiet, HashMap::new());
        let err = ui.prompt(&Prompt::input("name", "Name", None)).unwrap_err();
        assert!(err.to_string().contains("non-interactive"));
    }

    #[test]
    fn select_checks_the_choice() {
        let prompt = Prompt::select("kind", "Type", vec![PromptOption::new("Input", "input")]);

        let mut ui = NonInteractiveUI::with_overrides(
            OutputMode::Quiet,
            overrides(&[("PROCGATHER_PROMPT_KIND", "input")]),
        );
        assert_eq!(
            ui.prompt(&prompt).unwrap(),
            PromptResult::String("input".into())
        );

        let mut ui = NonInteractiveUI::with_overrides(
            OutputMode::Quiet,
            overrides(&[("PROCGATHER_PROMPT_KIND", "bogus")]),
        );
        assert!(ui.prompt(&prompt).is_err());
    }

    #[test]
    fn is_never_interactive() {
        let ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert!(!ui.is_interactive());
    }
}
