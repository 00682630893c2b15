use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub mod remote;
pub mod repository;

pub use remote::GitRemote;
pub use repository::GitRepository;

pub const REMOTES_PREFIX: &str = "refs/remotes/";
pub const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Points straight at a commit.
    Direct,
    /// Points at another reference, e.g. `refs/remotes/origin/HEAD`.
    Symbolic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub target: String,
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn direct(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: ReferenceKind::Direct,
        }
    }

    pub fn symbolic(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: ReferenceKind::Symbolic,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.kind == ReferenceKind::Direct
    }

    /// Splits `refs/remotes/<remote>/<branch>` into its remote and branch parts.
    pub fn remote_branch(&self) -> Option<(&str, &str)> {
        let rest = self.name.strip_prefix(REMOTES_PREFIX)?;
        let (remote, branch) = rest.split_once('/')?;
        if remote.is_empty() || branch.is_empty() {
            return None;
        }
        Some((remote, branch))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub author_time: DateTime<Utc>,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Updated,
    UpToDate,
}

/// The storage and transport operations the grooming pipeline needs.
///
/// Implementations are shared by every move worker, so push calls must be
/// safe to issue concurrently.
pub trait RemoteTransport: Send + Sync {
    fn fetch(&self) -> Result<()>;

    fn list_references(&self) -> Result<Vec<Reference>>;

    /// Fails with `GroombaError::NotFound` when the hash does not resolve.
    fn read_commit(&self, hash: &str) -> Result<CommitInfo>;

    /// Pushes `src:dst`; `force` allows a non-fast-forward update of `dst`.
    fn push_ref_update(&self, refspec: &str, force: bool) -> Result<PushStatus>;

    /// Pushes `:dst`. An already absent `dst` reports `UpToDate`.
    fn push_ref_delete(&self, refspec: &str) -> Result<PushStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_reference_parts() {
        let reference = Reference::direct("refs/remotes/origin/feature/login", "abc");
        assert!(reference.is_direct());
        assert_eq!(reference.remote_branch(), Some(("origin", "feature/login")));
    }

    #[test]
    fn test_local_reference_is_not_remote() {
        let reference = Reference::direct("refs/heads/main", "abc");
        assert_eq!(reference.remote_branch(), None);
    }

    #[test]
    fn test_symbolic_reference() {
        let reference = Reference::symbolic("refs/remotes/origin/HEAD", "refs/remotes/origin/main");
        assert!(!reference.is_direct());
    }

    #[test]
    fn test_malformed_remote_reference() {
        let reference = Reference::direct("refs/remotes/origin", "abc");
        assert_eq!(reference.remote_branch(), None);
    }
}
