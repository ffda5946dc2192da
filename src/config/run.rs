//! Per-run options chosen on the command line

use crate::record::Symbol;
use crate::ConfigError;

/// What to do when a non-resumed run finds checkpointed data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingDataPolicy {
    /// Ask the operator on the terminal
    #[default]
    Prompt,
    /// Keep the data and skip already harvested symbols
    Resume,
    /// Delete the data and harvest everything
    Clear,
}

/// Options for a single harvest run
///
/// Built once by the binary and passed by reference to the crawl driver and
/// the symbol enumerator.
#[derive(Debug, Clone, Default)]
pub struct RunConfiguration {
    /// Skip symbols already present in the checkpoint
    pub resume: bool,

    /// Harvest only these symbols (uppercased); empty means no selection
    pub selection: Vec<Symbol>,

    /// Disable the pause after every request
    pub no_wait: bool,

    /// Report per-symbol progress
    pub verbose: bool,

    /// Decision taken when checkpoint data exists and neither `resume` nor a
    /// selection was requested
    pub existing_data: ExistingDataPolicy,
}

impl RunConfiguration {
    /// Builds a run configuration, rejecting `resume` combined with a selection
    pub fn new(
        resume: bool,
        selection: Vec<String>,
        no_wait: bool,
        verbose: bool,
        existing_data: ExistingDataPolicy,
    ) -> Result<Self, ConfigError> {
        if resume && !selection.is_empty() {
            return Err(ConfigError::Validation(
                "--continue and --select cannot be used together".to_string(),
            ));
        }

        let selection = selection
            .iter()
            .map(|s| Symbol::from_user_input(s))
            .filter(|s| !s.as_str().is_empty())
            .collect();

        Ok(Self {
            resume,
            selection,
            no_wait,
            verbose,
            existing_data,
        })
    }

    /// True when the operator picked specific symbols
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }
}
