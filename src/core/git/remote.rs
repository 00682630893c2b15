use super::repository::{execute_git_command, execute_git_command_with_env, run_git, GitRepository};
use super::{CommitInfo, PushStatus, Reference, RemoteTransport, REMOTES_PREFIX};
use crate::core::auth::Authenticator;
use crate::utils::error::{GroombaError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

const REFERENCE_FORMAT: &str = "%(refname)%00%(objecttype)%00%(objectname)%00%(symref)";
const COMMIT_FORMAT: &str = "%H%x00%an%x00%ae%x00%at%x00%cn%x00%ce%x00%ct";

/// `RemoteTransport` over the `git` executable.
///
/// Pushes go to the remote's URL instead of its name. Pushing by name makes
/// git rewrite the matching remote-tracking refs locally, and concurrent
/// deletions would then fight over `packed-refs.lock`. The next fetch
/// reconciles the tracking refs instead.
pub struct GitRemote {
    repo: GitRepository,
    remote: String,
    url: String,
    envs: Vec<(String, String)>,
}

impl GitRemote {
    pub fn new(repo: GitRepository, remote: &str, auth: &dyn Authenticator) -> Result<Self> {
        let url = repo.remote_url(remote)?;

        let mut envs = vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())];
        if let Some(credential) = auth.credential() {
            envs.extend(credential.into_envs());
        }

        Ok(Self {
            repo,
            remote: remote.to_string(),
            url,
            envs,
        })
    }

    fn push(&self, refspec: &str, force: bool) -> Result<PushStatus> {
        let mut args = vec!["push", "--porcelain"];
        if force {
            args.push("--force");
        }
        args.push(&self.url);
        args.push(refspec);

        let output = run_git(&self.repo, &args, &self.envs)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let status = parse_push_output(&stdout, &stderr, output.status.success());
        debug!(refspec, ?status, "push finished");
        status
    }
}

impl RemoteTransport for GitRemote {
    fn fetch(&self) -> Result<()> {
        execute_git_command_with_env(&self.repo, &["fetch", "--prune", &self.remote], &self.envs)
            .map(|_| ())
    }

    /// Only `refs/remotes/<remote>/`; other remotes' tracking refs never
    /// name a branch on this one.
    fn list_references(&self) -> Result<Vec<Reference>> {
        let format = format!("--format={}", REFERENCE_FORMAT);
        let pattern = format!("{}{}/", REMOTES_PREFIX, self.remote);
        let output = execute_git_command(&self.repo, &["for-each-ref", &format, &pattern])?;
        Ok(output.lines().filter_map(parse_reference_line).collect())
    }

    fn read_commit(&self, hash: &str) -> Result<CommitInfo> {
        let format = format!("--format={}", COMMIT_FORMAT);
        let revision = format!("{}^{{commit}}", hash);
        let output = run_git(&self.repo, &["show", "-s", "--no-notes", &format, &revision], &[])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unknown_object(&stderr) {
                return Err(GroombaError::not_found(format!("object not found: {}", hash)));
            }
            return Err(GroombaError::git_operation(format!(
                "Failed to read commit {}: {}",
                hash,
                stderr.trim()
            )));
        }

        parse_commit(String::from_utf8_lossy(&output.stdout).trim())
    }

    fn push_ref_update(&self, refspec: &str, force: bool) -> Result<PushStatus> {
        self.push(refspec, force)
    }

    fn push_ref_delete(&self, refspec: &str) -> Result<PushStatus> {
        self.push(refspec, false)
    }
}

/// Parses one `for-each-ref` line. Anything not pointing at a commit (tags,
/// trees) is dropped since it can never be a branch tip.
fn parse_reference_line(line: &str) -> Option<Reference> {
    let mut fields = line.split('\0');
    let name = fields.next()?;
    let object_type = fields.next()?;
    let object_name = fields.next()?;
    let symref = fields.next().unwrap_or("");

    if name.is_empty() {
        return None;
    }
    if !symref.is_empty() {
        return Some(Reference::symbolic(name, symref));
    }
    if object_type != "commit" {
        return None;
    }
    Some(Reference::direct(name, object_name))
}

fn parse_commit(line: &str) -> Result<CommitInfo> {
    let fields: Vec<&str> = line.split('\0').collect();
    if fields.len() != 7 {
        return Err(GroombaError::git_operation(format!(
            "Unexpected commit format: {:?}",
            line
        )));
    }

    Ok(CommitInfo {
        hash: fields[0].to_string(),
        author_name: fields[1].to_string(),
        author_email: fields[2].to_string(),
        author_time: parse_unix_time(fields[3])?,
        committer_name: fields[4].to_string(),
        committer_email: fields[5].to_string(),
        committer_time: parse_unix_time(fields[6])?,
    })
}

fn parse_unix_time(value: &str) -> Result<DateTime<Utc>> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| GroombaError::git_operation(format!("Invalid commit timestamp: {}", value)))
}

fn is_unknown_object(stderr: &str) -> bool {
    ["unknown revision", "bad object", "bad revision", "Not a valid object name"]
        .iter()
        .any(|needle| stderr.contains(needle))
}

/// Interprets `git push --porcelain` output.
///
/// Per-ref lines look like `<flag>\t<src>:<dst>\t<summary>`. `=` means the
/// ref was already where we wanted it; `!` is a rejection.
pub(crate) fn parse_push_output(stdout: &str, stderr: &str, success: bool) -> Result<PushStatus> {
    let mut status = None;

    for line in stdout.lines() {
        let mut fields = line.splitn(3, '\t');
        let (Some(flag), Some(spec), Some(summary)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let destination = spec.rsplit(':').next().unwrap_or(spec);

        match flag {
            "=" => status = Some(status.unwrap_or(PushStatus::UpToDate)),
            " " | "+" | "-" | "*" => status = Some(PushStatus::Updated),
            "!" => {
                if summary.contains("remote ref does not exist") {
                    status = Some(status.unwrap_or(PushStatus::UpToDate));
                } else if summary.contains("non-fast-forward") || summary.contains("fetch first") {
                    return Err(GroombaError::non_fast_forward(destination));
                } else {
                    return Err(GroombaError::git_operation(format!(
                        "push of {} rejected: {}",
                        destination,
                        summary.trim()
                    )));
                }
            }
            _ => continue,
        }
    }

    if let Some(status) = status {
        return Ok(status);
    }

    let combined = format!("{}\n{}", stdout, stderr);
    if combined.contains("remote ref does not exist") || combined.contains("Everything up-to-date")
    {
        return Ok(PushStatus::UpToDate);
    }
    if success {
        return Ok(PushStatus::Updated);
    }

    Err(GroombaError::git_operation(format!(
        "push failed: {}",
        stderr.trim()
    )))
}
