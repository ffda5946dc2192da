//! Crawl driver - main harvest orchestration logic
//!
//! This module contains the run loop that coordinates all aspects of a
//! harvest, including:
//! - Deciding whether existing checkpoint data is resumed or cleared
//! - Enumerating and filtering the symbol listing
//! - Assembling and checkpointing one symbol at a time
//! - Exporting the checkpoint contents when the listing is exhausted

use crate::config::{validate, Config, ExistingDataPolicy, RunConfiguration};
use crate::crawler::assembler::{AssemblyOutcome, RecordAssembler, SkipReason};
use crate::crawler::enumerator::{SymbolEnumerator, SymbolFilter};
use crate::crawler::fetcher::Fetcher;
use crate::output::export_checkpoint;
use crate::record::Symbol;
use crate::storage::CheckpointStore;
use crate::{HarvestError, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use std::io::{BufRead, IsTerminal};
use std::path::Path;

/// Phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Init,
    Enumerating,
    Fetching { completed: usize, total: usize },
    Done,
}

/// Decision for checkpoint data found at the start of a non-resumed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    Resume,
    Clear,
}

/// Decides what happens to existing checkpoint data
pub trait ConflictResolver {
    /// Called with the number of checkpointed symbols (always > 0)
    fn resolve(&self, existing: usize) -> Result<ConflictDecision>;
}

/// Always returns the same decision
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub ConflictDecision);

impl ConflictResolver for FixedDecision {
    fn resolve(&self, _existing: usize) -> Result<ConflictDecision> {
        Ok(self.0)
    }
}

/// Asks the operator whether to delete existing data, blocking until answered
///
/// Uses an interactive confirmation on a terminal. When stdin is piped,
/// lines are read until one answers `y` or `n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl ConflictResolver for TerminalPrompt {
    fn resolve(&self, existing: usize) -> Result<ConflictDecision> {
        let question = format!(
            "Found {} saved symbols. Do you want to delete the temporary data?",
            existing
        );

        let stdin = std::io::stdin();
        let delete = if stdin.is_terminal() {
            dialoguer::Confirm::new()
                .with_prompt(question)
                .interact()
                .map_err(|e| HarvestError::Prompt(e.to_string()))?
        } else {
            eprintln!("{} [y/n]", question);
            read_answer(stdin.lock())?
        };

        Ok(if delete {
            ConflictDecision::Clear
        } else {
            ConflictDecision::Resume
        })
    }
}

/// Reads lines until one is a yes/no answer
fn read_answer<R: BufRead>(reader: R) -> Result<bool> {
    for line in reader.lines() {
        let line = line.map_err(|e| HarvestError::Prompt(e.to_string()))?;
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => tracing::warn!("Unrecognized answer '{}', expected y or n", other),
        }
    }

    Err(HarvestError::Prompt(
        "input closed before a y/n answer".to_string(),
    ))
}

/// Resolver matching a configured policy
pub fn resolver_for(policy: ExistingDataPolicy) -> Box<dyn ConflictResolver> {
    match policy {
        ExistingDataPolicy::Prompt => Box::new(TerminalPrompt),
        ExistingDataPolicy::Resume => Box::new(FixedDecision(ConflictDecision::Resume)),
        ExistingDataPolicy::Clear => Box::new(FixedDecision(ConflictDecision::Clear)),
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Symbols selected from the listing for this run
    pub selected: usize,
    /// Symbols checkpointed during this run
    pub harvested: Vec<Symbol>,
    /// Symbols skipped, with the reason
    pub skipped: Vec<(Symbol, SkipReason)>,
    /// Rows written by the export (all checkpointed symbols)
    pub exported: usize,
}

/// Main harvest coordinator
pub struct Coordinator<S: CheckpointStore> {
    config: Config,
    run: RunConfiguration,
    fetcher: Fetcher,
    store: S,
    resolver: Box<dyn ConflictResolver>,
    phase: CrawlPhase,
}

impl<S: CheckpointStore> Coordinator<S> {
    /// Creates a coordinator with the resolver chosen by the run's policy
    pub fn new(config: Config, run: RunConfiguration, store: S) -> Result<Self> {
        let resolver = resolver_for(run.existing_data);
        Self::with_resolver(config, run, store, resolver)
    }

    /// Creates a coordinator with an explicit conflict resolver
    pub fn with_resolver(
        config: Config,
        run: RunConfiguration,
        store: S,
        resolver: Box<dyn ConflictResolver>,
    ) -> Result<Self> {
        validate(&config)?;
        let fetcher = Fetcher::from_config(&config.user_agent, &config.crawler, run.no_wait)?;

        Ok(Self {
            config,
            run,
            fetcher,
            store,
            resolver,
            phase: CrawlPhase::Init,
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the checkpoint store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs the harvest to completion and exports the checkpoint
    ///
    /// 1. Init: resume, clear or keep existing checkpoint data
    /// 2. Enumerating: fetch and filter the listing (fatal on failure)
    /// 3. Fetching: assemble each symbol in listing order
    /// 4. Done: write the export table
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        let resume = self.resolve_existing_data()?;
        let checkpointed = if resume {
            self.store.keys()?
        } else {
            BTreeSet::new()
        };

        if resume && self.run.verbose {
            let saved: Vec<_> = checkpointed.iter().map(Symbol::as_str).collect();
            tracing::info!("Saved so far: {:?}", saved);
        }

        self.phase = CrawlPhase::Enumerating;
        let filter = SymbolFilter::new(&self.run.selection, resume, checkpointed);
        let listing = SymbolEnumerator::new(&self.fetcher, &self.config.source)
            .enumerate(&filter)
            .await?;

        let total = listing.len();
        let mut summary = CrawlSummary {
            selected: total,
            ..CrawlSummary::default()
        };
        self.phase = CrawlPhase::Fetching {
            completed: 0,
            total,
        };

        let today = Utc::now().date_naive();
        let mut assembler = RecordAssembler::new(&self.fetcher, &mut self.store, today);

        for (index, entry) in listing.enumerate() {
            tracing::debug!("Processing {} ({})", entry.symbol, entry.link);

            match assembler.assemble(&entry.link).await? {
                AssemblyOutcome::Stored(record) => {
                    if self.run.verbose {
                        report_progress(&record.name, total - index - 1);
                    }
                    summary.harvested.push(record.symbol);
                }
                AssemblyOutcome::Skipped(SkipReason::NotApplicable) => {
                    tracing::info!("Skipping {}: no stock data", entry.symbol);
                    summary.skipped.push((entry.symbol, SkipReason::NotApplicable));
                }
                AssemblyOutcome::Skipped(reason) => {
                    tracing::warn!("Skipping {}: {}", entry.symbol, reason);
                    summary.skipped.push((entry.symbol, reason));
                }
            }

            self.phase = CrawlPhase::Fetching {
                completed: index + 1,
                total,
            };
        }

        self.phase = CrawlPhase::Done;

        let export_path = Path::new(&self.config.output.export_path);
        summary.exported = export_checkpoint(&self.store, export_path)?;

        tracing::info!(
            "Harvest finished: {} stored, {} skipped, {} rows exported to {}",
            summary.harvested.len(),
            summary.skipped.len(),
            summary.exported,
            export_path.display()
        );

        Ok(summary)
    }

    /// Returns whether already checkpointed symbols are skipped this run
    fn resolve_existing_data(&mut self) -> Result<bool> {
        if self.run.resume {
            return Ok(true);
        }
        if self.run.has_selection() {
            return Ok(false);
        }

        let existing = self.store.len()?;
        if existing == 0 {
            return Ok(false);
        }

        match self.resolver.resolve(existing)? {
            ConflictDecision::Resume => {
                tracing::info!("Resuming with {} checkpointed symbols", existing);
                Ok(true)
            }
            ConflictDecision::Clear => {
                tracing::info!("Clearing {} checkpointed symbols", existing);
                self.store.clear()?;
                Ok(false)
            }
        }
    }
}

fn report_progress(name: &str, left: usize) {
    if left > 0 {
        tracing::info!("Finished {}. {} left.", name, left);
    } else {
        tracing::info!("Finished {}. All done!", name);
    }
}

/// Runs a complete harvest against an already opened checkpoint store
///
/// # Example
///
/// ```no_run
/// use radar_harvest::config::{Config, RunConfiguration};
/// use radar_harvest::crawler::run_harvest;
/// use radar_harvest::storage::open_checkpoint;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = open_checkpoint(Path::new("checkpoint.db"))?;
/// run_harvest(Config::default(), RunConfiguration::default(), store).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest<S: CheckpointStore>(
    config: Config,
    run: RunConfiguration,
    store: S,
) -> Result<CrawlSummary> {
    let mut coordinator = Coordinator::new(config, run, store)?;
    coordinator.run().await
}
