pub mod parser;

pub use parser::Cli;

use crate::config::{Config, ConfigManager};
use crate::core::auth::new_authenticator;
use crate::core::git::{GitRemote, GitRepository, RemoteTransport};
use crate::core::groom::Groomba;
use crate::utils::{init_logging, GroombaError, Result};
use chrono::Utc;
use tracing::{info, warn};

pub fn execute_command(cli: Cli) -> Result<()> {
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("groomba: {:#}", e);
    }

    let config = load_config(&cli)?;
    info!(
        "Grooming {} (threshold {}d, prefix {}, dry_run={})",
        config.remote, config.stale_age_threshold, config.prefix, config.dry_run
    );

    let repo = GitRepository::discover_from(&cli.repo)?;
    let auth = new_authenticator(&config.auth)?;
    let remote = GitRemote::new(repo, &config.remote, auth.as_ref())?;

    if let Err(e) = remote.fetch() {
        warn!("fetch from {} failed, using local refs: {}", config.remote, e);
    }

    run(&config, &remote)
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = ConfigManager::load(&cli.config_dir)
        .map_err(|e| GroombaError::config_error(format!("Failed to load config: {}", e)))?;
    if cli.dry_run {
        config.dry_run = true;
    }
    Ok(config)
}

/// Classifies, reports and moves against an already fetched transport.
pub fn run(config: &Config, transport: &dyn RemoteTransport) -> Result<()> {
    let groomba = Groomba::new(config, transport);
    let now = Utc::now();

    let candidates = groomba.filter_branches(now)?;
    if candidates.is_empty() {
        println!("No stale branches found");
        return Ok(());
    }

    groomba.print_branches_grouped_by_author(&candidates, now)?;
    groomba.move_stale_branches(&candidates)
}
