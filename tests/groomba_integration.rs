use chrono::{DateTime, Duration, Utc};
use groomba::config::Config;
use groomba::core::auth::new_authenticator;
use groomba::core::git::{GitRemote, GitRepository, RemoteTransport};
use groomba::{Groomba, GroombaError};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str], envs: &[(&str, String)]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A working repository, the bare `origin` cloned from it, and a clone of
/// `origin` that groomba runs against.
struct Fixture {
    _temp_dir: TempDir,
    work: PathBuf,
    origin: PathBuf,
    clone: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("tmp dir");
        let work = temp_dir.path().join("work");
        std::fs::create_dir(&work).expect("work dir");

        git(&work, &["init", "--quiet"], &[]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/master"], &[]);
        git(&work, &["config", "user.name", "Test User"], &[]);
        git(&work, &["config", "user.email", "test@user.com"], &[]);
        git(&work, &["config", "commit.gpgsign", "false"], &[]);

        let fixture = Self {
            origin: temp_dir.path().join("origin.git"),
            clone: temp_dir.path().join("clone"),
            work,
            _temp_dir: temp_dir,
        };
        fixture.commit("Test User", days_ago(100), days_ago(100));
        fixture
    }

    fn commit(&self, author: &str, author_time: DateTime<Utc>, committer_time: DateTime<Utc>) {
        let envs = [
            ("GIT_AUTHOR_NAME", author.to_string()),
            ("GIT_AUTHOR_EMAIL", "test@user.com".to_string()),
            ("GIT_AUTHOR_DATE", git_date(author_time)),
            ("GIT_COMMITTER_NAME", author.to_string()),
            ("GIT_COMMITTER_EMAIL", "test@user.com".to_string()),
            ("GIT_COMMITTER_DATE", git_date(committer_time)),
        ];
        git(
            &self.work,
            &["commit", "--quiet", "--allow-empty", "-m", "commit"],
            &envs,
        );
    }

    fn branch(self, name: &str, author: &str, time: DateTime<Utc>) -> Self {
        self.rebased_branch(name, author, time, time)
    }

    fn rebased_branch(
        self,
        name: &str,
        author: &str,
        author_time: DateTime<Utc>,
        committer_time: DateTime<Utc>,
    ) -> Self {
        git(&self.work, &["checkout", "--quiet", "-b", name, "master"], &[]);
        self.commit(author, author_time, committer_time);
        git(&self.work, &["checkout", "--quiet", "master"], &[]);
        self
    }

    fn publish(self) -> Self {
        let origin = self.origin.to_string_lossy().to_string();
        let clone = self.clone.to_string_lossy().to_string();
        git(&self.work, &["clone", "--quiet", "--bare", ".", &origin], &[]);
        git(&self.work, &["clone", "--quiet", &origin, &clone], &[]);
        self
    }

    /// Registers `other`'s origin as `name` in the clone and fetches it.
    fn add_remote(&self, name: &str, other: &Fixture) {
        let url = other.origin.to_string_lossy().to_string();
        git(&self.clone, &["remote", "add", name, &url], &[]);
        git(&self.clone, &["fetch", "--quiet", name], &[]);
    }

    fn remote(&self) -> GitRemote {
        let repo = GitRepository::discover_from(&self.clone).expect("discover clone");
        let auth = new_authenticator("default").expect("default auth");
        GitRemote::new(repo, "origin", auth.as_ref()).expect("remote")
    }

    fn origin_branches(&self) -> Vec<String> {
        let output = git(
            &self.origin,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
            &[],
        );
        let mut branches: Vec<String> = output.lines().map(str::to_string).collect();
        branches.sort();
        branches
    }

    fn origin_target(&self, branch: &str) -> String {
        git(&self.origin, &["rev-parse", &format!("refs/heads/{}", branch)], &[])
    }
}

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

fn git_date(time: DateTime<Utc>) -> String {
    format!("@{} +0000", time.timestamp())
}

fn standard_fixture() -> Fixture {
    Fixture::new()
        .branch("IsStale", "Test User", days_ago(19))
        .branch("IsStale2", "Other User", days_ago(30))
        .branch("IsFresh", "Test User", days_ago(1))
        .branch("revert-12-feature", "Test User", days_ago(60))
        .rebased_branch(
            "StaleCommitFreshCommitter",
            "Test User",
            days_ago(400),
            days_ago(0),
        )
        .publish()
}

fn names(groomba: &Groomba) -> Vec<String> {
    groomba
        .filter_branches(Utc::now())
        .expect("classify")
        .iter()
        .map(|candidate| candidate.reference.name.clone())
        .collect()
}

#[test]
fn test_classifies_stale_branches() {
    let fixture = standard_fixture();
    let remote = fixture.remote();
    let config = Config::default();
    let groomba = Groomba::new(&config, &remote);

    assert_eq!(
        names(&groomba),
        vec!["refs/remotes/origin/IsStale", "refs/remotes/origin/IsStale2"]
    );

    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    let report = groomba.group_by_author(&candidates, Utc::now());
    assert_eq!(report.authors["Test User"][0].age, "19d");
    assert_eq!(report.authors["Other User"][0].age, "30d");
}

#[test]
fn test_moves_stale_branches_on_origin() {
    let fixture = standard_fixture();
    let remote = fixture.remote();
    let config = Config::default();
    let groomba = Groomba::new(&config, &remote);
    let stale_target = fixture.origin_target("IsStale");

    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    groomba.move_stale_branches(&candidates).unwrap();

    assert_eq!(
        fixture.origin_branches(),
        vec![
            "IsFresh",
            "StaleCommitFreshCommitter",
            "master",
            "revert-12-feature",
            "stale/IsStale",
            "stale/IsStale2",
        ]
    );
    assert_eq!(fixture.origin_target("stale/IsStale"), stale_target);

    // A second run after fetching finds nothing left to do.
    remote.fetch().unwrap();
    assert!(names(&groomba).is_empty());
}

#[test]
fn test_dry_run_leaves_origin_untouched() {
    let fixture = standard_fixture();
    let remote = fixture.remote();
    let config = Config {
        dry_run: true,
        ..Config::default()
    };
    let groomba = Groomba::new(&config, &remote);
    let before = fixture.origin_branches();

    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    assert_eq!(candidates.len(), 2);
    groomba.move_stale_branches(&candidates).unwrap();

    assert_eq!(fixture.origin_branches(), before);
}

#[test]
fn test_divergent_archive_requires_clobber() {
    let fixture = Fixture::new()
        .branch("IsStale", "Test User", days_ago(19))
        .branch("stale/IsStale", "Test User", days_ago(1))
        .publish();
    let remote = fixture.remote();
    let stale_target = fixture.origin_target("IsStale");

    let config = Config::default();
    let groomba = Groomba::new(&config, &remote);
    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    assert_eq!(candidates.len(), 1);

    match groomba.move_stale_branches(&candidates).unwrap_err() {
        GroombaError::MoveStaleBranches(failures) => assert_eq!(
            failures.sorted_lines(),
            vec!["branch: IsStale failed on operation copy with error: non-fast-forward update: refs/heads/stale/IsStale"]
        ),
        other => panic!("unexpected error: {}", other),
    }
    assert!(fixture.origin_branches().contains(&"IsStale".to_string()));

    let clobber = Config {
        clobber: true,
        ..Config::default()
    };
    Groomba::new(&clobber, &remote)
        .move_stale_branches(&candidates)
        .unwrap();

    assert_eq!(fixture.origin_branches(), vec!["master", "stale/IsStale"]);
    assert_eq!(fixture.origin_target("stale/IsStale"), stale_target);
}

#[test]
fn test_many_branches_with_parallel_workers() {
    let fixture = (0..10)
        .fold(Fixture::new(), |fixture, i| {
            fixture.branch(&format!("old-{}", i), "Test User", days_ago(40))
        })
        .publish();
    let remote = fixture.remote();
    let config = Config {
        max_concurrency: 4,
        ..Config::default()
    };
    let groomba = Groomba::new(&config, &remote);

    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    assert_eq!(candidates.len(), 10);
    groomba.move_stale_branches(&candidates).unwrap();

    let branches = fixture.origin_branches();
    assert_eq!(branches.len(), 11);
    assert!(branches
        .iter()
        .all(|b| b == "master" || b.starts_with("stale/old-")));
}

#[test]
fn test_branch_deleted_upstream_after_fetch_is_not_an_error() {
    let fixture = Fixture::new()
        .branch("IsStale", "Test User", days_ago(19))
        .publish();
    let remote = fixture.remote();
    let config = Config::default();
    let groomba = Groomba::new(&config, &remote);
    let candidates = groomba.filter_branches(Utc::now()).unwrap();

    git(&fixture.origin, &["branch", "-D", "IsStale"], &[]);

    groomba.move_stale_branches(&candidates).unwrap();
    assert_eq!(fixture.origin_branches(), vec!["master", "stale/IsStale"]);
}

#[test]
fn test_second_remote_is_ignored() {
    let fixture = Fixture::new()
        .branch("IsStale", "Test User", days_ago(19))
        .branch("IsFresh", "Test User", days_ago(1))
        .publish();
    let upstream = Fixture::new()
        .branch("IsFresh", "Other User", days_ago(90))
        .branch("main", "Other User", days_ago(90))
        .publish();
    fixture.add_remote("upstream", &upstream);
    let fresh_target = fixture.origin_target("IsFresh");

    let remote = fixture.remote();
    let config = Config::default();
    let groomba = Groomba::new(&config, &remote);

    assert_eq!(names(&groomba), vec!["refs/remotes/origin/IsStale"]);

    let candidates = groomba.filter_branches(Utc::now()).unwrap();
    groomba.move_stale_branches(&candidates).unwrap();

    assert_eq!(
        fixture.origin_branches(),
        vec!["IsFresh", "master", "stale/IsStale"]
    );
    assert_eq!(fixture.origin_target("IsFresh"), fresh_target);
    assert_eq!(
        upstream.origin_branches(),
        vec!["IsFresh", "main", "master"]
    );
}
