use super::StaleBranch;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BranchAge {
    pub name: String,
    pub age: String,
}

/// Stale branches keyed by the author of their tip commit.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthorReport {
    pub authors: BTreeMap<String, Vec<BranchAge>>,
}

impl AuthorReport {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn branch_count(&self) -> usize {
        self.authors.values().map(Vec::len).sum()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn group_by_author(candidates: &[StaleBranch], now: DateTime<Utc>) -> AuthorReport {
    let mut report = AuthorReport::default();

    for candidate in candidates {
        let days = now
            .signed_duration_since(candidate.commit.committer_time)
            .num_days();
        report
            .authors
            .entry(candidate.commit.author_name.clone())
            .or_default()
            .push(BranchAge {
                name: candidate.reference.name.clone(),
                age: format!("{}d", days),
            });
    }

    report
}
