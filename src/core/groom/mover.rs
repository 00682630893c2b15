use super::failure::{MoveBranchError, MoveOperation};
use crate::config::Config;
use crate::core::git::{PushStatus, RemoteTransport, HEADS_PREFIX};
use tracing::{debug, info};

pub type MoveOutcome = std::result::Result<(), MoveBranchError>;

/// Archives a single branch on the remote: copy to `<prefix><branch>`, then
/// delete the original.
pub struct BranchMover<'a> {
    config: &'a Config,
    transport: &'a dyn RemoteTransport,
}

impl<'a> BranchMover<'a> {
    pub fn new(config: &'a Config, transport: &'a dyn RemoteTransport) -> Self {
        Self { config, transport }
    }

    pub fn remote(&self) -> &str {
        &self.config.remote
    }

    pub fn archive_name(&self, branch: &str) -> String {
        format!("{}{}", self.config.prefix, branch)
    }

    pub fn copy_refspec(&self, branch: &str) -> String {
        format!(
            "{}{}:{}{}",
            self.config.remote_refs_prefix(),
            branch,
            HEADS_PREFIX,
            self.archive_name(branch)
        )
    }

    pub fn delete_refspec(&self, branch: &str) -> String {
        format!(":{}{}", HEADS_PREFIX, branch)
    }

    pub fn move_branch(&self, branch: &str) -> MoveOutcome {
        let archive_name = self.archive_name(branch);

        if self.config.dry_run {
            info!(
                "Would have moved branch {} to {} -- skipping since dry_run=true",
                branch, archive_name
            );
            return Ok(());
        }

        info!("  copy {} to {}", branch, archive_name);
        let status = self
            .transport
            .push_ref_update(&self.copy_refspec(branch), self.config.clobber)
            .map_err(|e| MoveBranchError::new(branch, MoveOperation::Copy, e))?;
        if status == PushStatus::UpToDate {
            debug!("{} already up to date", archive_name);
        }

        // Only reached once the archive copy exists on the remote.
        info!("  delete {}", branch);
        let status = self
            .transport
            .push_ref_delete(&self.delete_refspec(branch))
            .map_err(|e| MoveBranchError::new(branch, MoveOperation::Delete, e))?;
        if status == PushStatus::UpToDate {
            debug!("{} already absent on the remote", branch);
        }

        Ok(())
    }
}
