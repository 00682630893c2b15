use super::Config;

pub const CONFIG_FILE_STEM: &str = ".groomba";
pub const CONFIG_FILE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];
pub const ENV_PREFIX: &str = "GROOMBA_";

pub fn default_config() -> Config {
    Config {
        dry_run: false,
        clobber: false,
        prefix: "stale/".to_string(),
        stale_age_threshold: 14,
        static_branches: default_static_branches(),
        max_concurrency: 4,
        auth: "default".to_string(),
        remote: "origin".to_string(),
    }
}

pub fn default_static_branches() -> Vec<String> {
    ["main", "master", "production"]
        .iter()
        .map(|b| b.to_string())
        .collect()
}
