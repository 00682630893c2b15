pub mod classifier;
pub mod coordinator;
pub mod failure;
pub mod mover;
pub mod report;

pub use classifier::Classifier;
pub use coordinator::BatchCoordinator;
pub use failure::{MoveBranchError, MoveOperation, MoveStaleBranchesError};
pub use mover::{BranchMover, MoveOutcome};
pub use report::{AuthorReport, BranchAge};

use crate::config::Config;
use crate::core::git::{CommitInfo, Reference, RemoteTransport};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// A remote-tracking reference selected for archiving, with its tip commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleBranch {
    pub reference: Reference,
    pub commit: CommitInfo,
}

pub type CandidateSet = Vec<StaleBranch>;

/// Entry point for one grooming run against a single remote.
pub struct Groomba<'a> {
    config: &'a Config,
    transport: &'a dyn RemoteTransport,
}

impl<'a> Groomba<'a> {
    pub fn new(config: &'a Config, transport: &'a dyn RemoteTransport) -> Self {
        Self { config, transport }
    }

    pub fn is_static_branch(&self, name: &str) -> bool {
        self.classifier().is_static(name)
    }

    pub fn filter_branches(&self, now: DateTime<Utc>) -> Result<CandidateSet> {
        self.classifier().classify_stale(now)
    }

    pub fn group_by_author(&self, candidates: &[StaleBranch], now: DateTime<Utc>) -> AuthorReport {
        report::group_by_author(candidates, now)
    }

    pub fn print_branches_grouped_by_author(
        &self,
        candidates: &[StaleBranch],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let yaml = self.group_by_author(candidates, now).to_yaml()?;
        print!("{}", yaml);
        Ok(())
    }

    pub fn move_branch(&self, branch: &str) -> MoveOutcome {
        self.mover().move_branch(branch)
    }

    /// Archives every candidate. Returns once all moves have finished; the
    /// error lists each branch that failed.
    pub fn move_stale_branches(&self, candidates: &[StaleBranch]) -> Result<()> {
        BatchCoordinator::new(self.mover(), self.config.max_concurrency).move_all(candidates)?;
        Ok(())
    }

    fn classifier(&self) -> Classifier<'a> {
        Classifier::new(self.config, self.transport)
    }

    fn mover(&self) -> BranchMover<'a> {
        BranchMover::new(self.config, self.transport)
    }
}
