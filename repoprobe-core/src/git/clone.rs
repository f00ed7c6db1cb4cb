//! Cloning over HTTPS or SSH

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use git2::build::RepoBuilder;
use git2::FetchOptions;

use super::engine::GitEngine;
use super::repo::GitRepo;
use crate::{Error, Result};

/// Transport used to reach the remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Https,
    /// Requires an SSH identity file
    Ssh,
}

impl Transport {
    /// Infer the transport from a clone URL
    ///
    /// Supports:
    /// - `git@github.com:owner/repo.git` (scp-like, SSH)
    /// - `ssh://git@github.com/owner/repo.git`
    /// - `https://github.com/owner/repo.git`
    ///
    /// Anything else (including local paths) is treated as HTTPS.
    pub fn from_url(input: &str) -> Self {
        let input = input.trim();

        if let Ok(url) = url::Url::parse(input) {
            if url.scheme() == "ssh" || url.scheme() == "git+ssh" {
                return Transport::Ssh;
            }
            if url.scheme() != "file" && url.cannot_be_a_base() {
                // opaque forms like `host:path` get the scp-like check
                return Self::scp_like(input);
            }
            return Transport::Https;
        }

        // `git@host:path` fails to parse since `@` is not valid in a scheme
        Self::scp_like(input)
    }

    fn scp_like(input: &str) -> Self {
        match input.split_once(':') {
            Some((user_host, path)) if user_host.contains('@') && !path.starts_with("//") => {
                Transport::Ssh
            }
            _ => Transport::Https,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Https => write!(f, "https"),
            Transport::Ssh => write!(f, "ssh"),
        }
    }
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "https" => Ok(Transport::Https),
            "ssh" => Ok(Transport::Ssh),
            other => Err(Error::Config(format!("Unknown transport: {}", other))),
        }
    }
}

impl GitEngine {
    /// Clone `url` into `path`
    ///
    /// Every failure (network, authentication, destination already
    /// populated) is reported as a failed `clone` command.
    pub fn clone(&self, url: &str, path: impl AsRef<Path>, transport: Transport) -> Result<GitRepo> {
        let path = path.as_ref();

        if Transport::from_url(url) != transport {
            return Err(Error::Config(format!(
                "URL {} does not use {} transport",
                url, transport
            )));
        }

        if transport == Transport::Ssh && self.options().ssh_identity.is_none() {
            return Err(Error::Config(
                "SSH transport requires an identity file (engine.ssh_identity)".to_string(),
            ));
        }

        tracing::info!(url, path = %path.display(), %transport, "Cloning repository");
        self.log_command(format_args!("clone {} {}", url, path.display()));

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks());

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(url, path)
            .map_err(|e| Error::command("clone", e))?;

        GitRepo::from_repository(repo)
    }
}
