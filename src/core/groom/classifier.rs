use super::{CandidateSet, StaleBranch};
use crate::config::Config;
use crate::core::git::{Reference, RemoteTransport};
use crate::utils::error::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Branches created by the revert / cherry-pick buttons of hosting UIs.
const GENERATED_BRANCH_PREFIXES: [&str; 2] = ["revert", "cherry-pick"];

/// Decides which remote-tracking references are stale.
pub struct Classifier<'a> {
    config: &'a Config,
    transport: &'a dyn RemoteTransport,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a Config, transport: &'a dyn RemoteTransport) -> Self {
        Self { config, transport }
    }

    /// Exact match against `refs/remotes/<remote>/<b>` for each static branch.
    pub fn is_static(&self, name: &str) -> bool {
        let remote_prefix = self.config.remote_refs_prefix();
        self.config
            .static_branches
            .iter()
            .any(|branch| name.strip_prefix(&remote_prefix) == Some(branch.as_str()))
    }

    /// The configured remote owns the reference and it names a branch there.
    pub fn is_tracking_branch(&self, reference: &Reference) -> bool {
        reference.is_direct()
            && reference
                .remote_branch()
                .is_some_and(|(remote, _)| remote == self.config.remote)
    }

    /// References that must never be evaluated, moved or reported.
    pub fn is_excluded(&self, reference: &Reference) -> bool {
        if !self.is_tracking_branch(reference) {
            return true;
        }

        let name = reference.name.as_str();
        let remote_prefix = self.config.remote_refs_prefix();

        if self.is_static(name) {
            return true;
        }

        if GENERATED_BRANCH_PREFIXES
            .iter()
            .any(|generated| name.starts_with(&format!("{}{}", remote_prefix, generated)))
        {
            return true;
        }

        name.starts_with(&format!("{}{}", remote_prefix, self.config.prefix))
    }

    pub fn threshold(&self) -> Option<Duration> {
        Duration::try_days(self.config.stale_age_threshold)
    }

    /// Lists every reference and keeps the stale ones, in enumeration order.
    pub fn classify_stale(&self, now: DateTime<Utc>) -> Result<CandidateSet> {
        let references = self.transport.list_references()?;
        Ok(self.classify_references(references, now))
    }

    pub fn classify_references(
        &self,
        references: Vec<Reference>,
        now: DateTime<Utc>,
    ) -> CandidateSet {
        let mut candidates = CandidateSet::new();

        for reference in references {
            if self.is_excluded(&reference) {
                continue;
            }

            let commit = match self.transport.read_commit(&reference.target) {
                Ok(commit) => commit,
                Err(e) => {
                    warn!("failed to read reference: {}, err: {}", reference.name, e);
                    continue;
                }
            };

            let Some(threshold) = self.threshold() else {
                warn!(
                    "failed to calculate age for ref: {}, threshold: {} days",
                    reference.name, self.config.stale_age_threshold
                );
                continue;
            };

            // Committer time moves on rebase, author time does not.
            let age = now.signed_duration_since(commit.committer_time);
            if age > threshold {
                debug!(reference = %reference.name, days = age.num_days(), "stale");
                candidates.push(StaleBranch { reference, commit });
            }
        }

        candidates
    }
}
