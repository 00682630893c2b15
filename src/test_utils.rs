pub mod test_helpers {
    use crate::core::git::{
        CommitInfo, PushStatus, Reference, RemoteTransport, HEADS_PREFIX, REMOTES_PREFIX,
    };
    use crate::utils::error::{GroombaError, Result};
    use chrono::{DateTime, Utc};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    const REMOTE: &str = "origin";

    #[derive(Default)]
    struct MockState {
        /// The local clone's references, in enumeration order.
        local: Vec<Reference>,
        /// `refs/heads/*` on the remote, keyed by branch name.
        remote: BTreeMap<String, String>,
        commits: HashMap<String, CommitInfo>,
        push_failures: HashMap<String, String>,
        pushes: Vec<String>,
        next_hash: u64,
    }

    impl MockState {
        fn new_hash(&mut self) -> String {
            self.next_hash += 1;
            format!("{:040x}", self.next_hash)
        }

        fn new_commit(
            &mut self,
            author: &str,
            author_time: DateTime<Utc>,
            committer_time: DateTime<Utc>,
        ) -> String {
            let hash = self.new_hash();
            self.commits.insert(
                hash.clone(),
                CommitInfo {
                    hash: hash.clone(),
                    author_name: author.to_string(),
                    author_email: "test@user.com".to_string(),
                    author_time,
                    committer_name: author.to_string(),
                    committer_email: "test@user.com".to_string(),
                    committer_time,
                },
            );
            hash
        }

        fn local_target(&self, name: &str) -> Option<String> {
            self.local
                .iter()
                .find(|r| r.name == name && r.is_direct())
                .map(|r| r.target.clone())
        }

        fn set_local(&mut self, name: String, target: String) {
            match self.local.iter_mut().find(|r| r.name == name) {
                Some(reference) => reference.target = target,
                None => self.local.push(Reference::direct(name, target)),
            }
        }
    }

    /// In-memory remote and local clone. Every branch gets its own commit, so
    /// two different branches always have divergent history.
    #[derive(Clone, Default)]
    pub struct MockRemote {
        state: Arc<Mutex<MockState>>,
        push_delay: Duration,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl MockRemote {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_branch(self, name: &str, author: &str, time: DateTime<Utc>) -> Self {
            self.with_rebased_branch(name, author, time, time)
        }

        pub fn with_rebased_branch(
            self,
            name: &str,
            author: &str,
            author_time: DateTime<Utc>,
            committer_time: DateTime<Utc>,
        ) -> Self {
            let mut state = self.state.lock().unwrap();
            let hash = state.new_commit(author, author_time, committer_time);
            state.set_local(format!("{}{}/{}", REMOTES_PREFIX, REMOTE, name), hash.clone());
            state.remote.insert(name.to_string(), hash);
            drop(state);
            self
        }

        /// A branch that exists only in the local clone.
        pub fn with_local_branch(self, name: &str, author: &str, time: DateTime<Utc>) -> Self {
            let tracking = format!("{}{}/{}", REMOTES_PREFIX, REMOTE, name);
            let this = self.with_branch(name, author, time);
            let mut state = this.state.lock().unwrap();
            state.remote.remove(name);
            if let Some(reference) = state.local.iter_mut().find(|r| r.name == tracking) {
                reference.name = format!("{}{}", HEADS_PREFIX, name);
            }
            drop(state);
            this
        }

        /// A direct ref in the local clone under any name, with its own commit
        /// and no branch on the remote.
        pub fn with_tracking_ref(self, name: &str, author: &str, time: DateTime<Utc>) -> Self {
            let mut state = self.state.lock().unwrap();
            let hash = state.new_commit(author, time, time);
            state.set_local(name.to_string(), hash);
            drop(state);
            self
        }

        pub fn with_symbolic(self, name: &str, target: &str) -> Self {
            self.state
                .lock()
                .unwrap()
                .local
                .push(Reference::symbolic(name, target));
            self
        }

        /// A remote-tracking ref whose commit cannot be read.
        pub fn with_dangling_branch(self, name: &str, hash: &str) -> Self {
            let mut state = self.state.lock().unwrap();
            state.set_local(
                format!("{}{}/{}", REMOTES_PREFIX, REMOTE, name),
                hash.to_string(),
            );
            state.remote.insert(name.to_string(), hash.to_string());
            drop(state);
            self
        }

        /// Creates `alias` on both sides pointing at the same commit as `branch`.
        pub fn with_remote_alias(self, alias: &str, branch: &str) -> Self {
            let mut state = self.state.lock().unwrap();
            let hash = state
                .remote
                .get(branch)
                .cloned()
                .expect("aliased branch must exist");
            state.set_local(
                format!("{}{}/{}", REMOTES_PREFIX, REMOTE, alias),
                hash.clone(),
            );
            state.remote.insert(alias.to_string(), hash);
            drop(state);
            self
        }

        /// Removes a branch on the remote without the local clone noticing.
        pub fn with_remote_branch_removed(self, name: &str) -> Self {
            self.state.lock().unwrap().remote.remove(name);
            self
        }

        pub fn with_push_failure(self, refspec: &str, message: &str) -> Self {
            self.state
                .lock()
                .unwrap()
                .push_failures
                .insert(refspec.to_string(), message.to_string());
            self
        }

        pub fn with_push_delay(mut self, delay: Duration) -> Self {
            self.push_delay = delay;
            self
        }

        pub fn has_remote_branch(&self, name: &str) -> bool {
            self.state.lock().unwrap().remote.contains_key(name)
        }

        pub fn remote_target(&self, name: &str) -> Option<String> {
            self.state.lock().unwrap().remote.get(name).cloned()
        }

        pub fn local_target(&self, name: &str) -> Option<String> {
            self.state.lock().unwrap().local_target(name)
        }

        pub fn remote_branches(&self) -> Vec<String> {
            self.state.lock().unwrap().remote.keys().cloned().collect()
        }

        pub fn pushes(&self) -> Vec<String> {
            self.state.lock().unwrap().pushes.clone()
        }

        pub fn max_concurrent_pushes(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        fn begin_push(&self, refspec: &str) -> Option<String> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if !self.push_delay.is_zero() {
                thread::sleep(self.push_delay);
            }

            let mut state = self.state.lock().unwrap();
            state.pushes.push(refspec.to_string());
            state.push_failures.get(refspec).cloned()
        }

        fn end_push(&self) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        fn apply_update(&self, refspec: &str, force: bool) -> Result<PushStatus> {
            let (source, destination) = refspec
                .split_once(':')
                .ok_or_else(|| GroombaError::invalid_args(format!("bad refspec {}", refspec)))?;
            let branch = destination
                .strip_prefix(HEADS_PREFIX)
                .ok_or_else(|| GroombaError::invalid_args(format!("bad refspec {}", refspec)))?;

            let mut state = self.state.lock().unwrap();
            let hash = state.local_target(source).ok_or_else(|| {
                GroombaError::git_operation(format!("src refspec {} does not match any", source))
            })?;

            match state.remote.get(branch).cloned() {
                Some(existing) if existing == hash => Ok(PushStatus::UpToDate),
                Some(_) if !force => Err(GroombaError::non_fast_forward(destination)),
                _ => {
                    state.remote.insert(branch.to_string(), hash);
                    Ok(PushStatus::Updated)
                }
            }
        }

        fn apply_delete(&self, refspec: &str) -> Result<PushStatus> {
            let branch = refspec
                .strip_prefix(':')
                .and_then(|dst| dst.strip_prefix(HEADS_PREFIX))
                .ok_or_else(|| GroombaError::invalid_args(format!("bad refspec {}", refspec)))?;

            match self.state.lock().unwrap().remote.remove(branch) {
                Some(_) => Ok(PushStatus::Updated),
                None => Ok(PushStatus::UpToDate),
            }
        }
    }

    impl RemoteTransport for MockRemote {
        /// Mirrors `git fetch --prune`: tracking refs follow the remote.
        fn fetch(&self) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let tracking_prefix = format!("{}{}/", REMOTES_PREFIX, REMOTE);
            let remote = state.remote.clone();

            state.local.retain(|reference| {
                match reference.name.strip_prefix(&tracking_prefix) {
                    Some(branch) => !reference.is_direct() || remote.contains_key(branch),
                    None => true,
                }
            });
            for (branch, hash) in remote {
                state.set_local(format!("{}{}", tracking_prefix, branch), hash);
            }
            Ok(())
        }

        fn list_references(&self) -> Result<Vec<Reference>> {
            Ok(self.state.lock().unwrap().local.clone())
        }

        fn read_commit(&self, hash: &str) -> Result<CommitInfo> {
            self.state
                .lock()
                .unwrap()
                .commits
                .get(hash)
                .cloned()
                .ok_or_else(|| GroombaError::not_found(format!("object not found: {}", hash)))
        }

        fn push_ref_update(&self, refspec: &str, force: bool) -> Result<PushStatus> {
            let failure = self.begin_push(refspec);
            let result = match failure {
                Some(message) => Err(GroombaError::git_operation(message)),
                None => self.apply_update(refspec, force),
            };
            self.end_push();
            result
        }

        fn push_ref_delete(&self, refspec: &str) -> Result<PushStatus> {
            let failure = self.begin_push(refspec);
            let result = match failure {
                Some(message) => Err(GroombaError::git_operation(message)),
                None => self.apply_delete(refspec),
            };
            self.end_push();
            result
        }
    }
}
