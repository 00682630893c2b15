use crate::utils::error::{GroombaError, Result};
use std::fmt;
use std::str::FromStr;

const SSH_AUTH_SOCK: &str = "SSH_AUTH_SOCK";

/// Environment handed to every networked git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    envs: Vec<(String, String)>,
}

impl Credential {
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    pub fn into_envs(self) -> Vec<(String, String)> {
        self.envs
    }
}

pub trait Authenticator: Send + Sync {
    /// `None` leaves authentication to git's own configuration.
    fn credential(&self) -> Option<Credential>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    SshAgent,
    Default,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::SshAgent => "ssh-agent",
            AuthType::Default => "default",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = GroombaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ssh-agent" => Ok(AuthType::SshAgent),
            "default" => Ok(AuthType::Default),
            other => Err(GroombaError::auth_error(format!(
                "auth type {} not supported. valid values: {}, {}",
                other,
                AuthType::SshAgent,
                AuthType::Default
            ))),
        }
    }
}

pub struct DefaultAuth;

impl Authenticator for DefaultAuth {
    fn credential(&self) -> Option<Credential> {
        None
    }
}

pub struct SshAgentAuth {
    socket: String,
}

impl SshAgentAuth {
    pub fn new() -> Result<Self> {
        Self::from_socket(std::env::var(SSH_AUTH_SOCK).ok())
    }

    pub fn from_socket(socket: Option<String>) -> Result<Self> {
        match socket.filter(|s| !s.trim().is_empty()) {
            Some(socket) => Ok(Self { socket }),
            None => Err(GroombaError::auth_error(
                "error creating SSH agent: \"SSH agent requested but SSH_AUTH_SOCK not-specified\"",
            )),
        }
    }
}

impl Authenticator for SshAgentAuth {
    fn credential(&self) -> Option<Credential> {
        Some(
            Credential::default()
                .with_env(SSH_AUTH_SOCK, &self.socket)
                .with_env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes"),
        )
    }
}

pub fn new_authenticator(auth: &str) -> Result<Box<dyn Authenticator>> {
    match auth.parse::<AuthType>()? {
        AuthType::SshAgent => Ok(Box::new(SshAgentAuth::new()?)),
        AuthType::Default => Ok(Box::new(DefaultAuth)),
    }
}
