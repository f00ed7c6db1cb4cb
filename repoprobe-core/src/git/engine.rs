//! Engine settings and repository lifecycle (init, open)

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, RemoteCallbacks, Repository, Signature};

use super::repo::GitRepo;
use crate::config::EngineConfig;
use crate::Result;

/// Target that engine command lines are logged under
pub const TRACE_TARGET: &str = "repoprobe::trace";

/// libgit2 keeps asking for credentials until one works
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Settings passed to the engine at construction
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Log each engine command at INFO instead of DEBUG
    pub trace: bool,
    /// Private key for SSH transport
    pub ssh_identity: Option<PathBuf>,
    /// Token for HTTPS transport
    pub https_token: Option<String>,
    /// Fallback commit author name
    pub author_name: String,
    /// Fallback commit author email
    pub author_email: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl From<EngineConfig> for EngineOptions {
    fn from(config: EngineConfig) -> Self {
        Self {
            trace: config.trace,
            ssh_identity: config.ssh_identity,
            https_token: config.https_token,
            author_name: config.author_name,
            author_email: config.author_email,
        }
    }
}

/// Uniform call surface over the version-control primitives
///
/// Every operation blocks until the engine returns.
#[derive(Debug, Clone, Default)]
pub struct GitEngine {
    options: EngineOptions,
}

impl GitEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Initialize a new repository at `path`, creating the directory if needed
    pub fn init(&self, path: impl AsRef<Path>) -> Result<GitRepo> {
        let path = path.as_ref();
        self.log_command(format_args!("init {}", path.display()));

        let repo = Repository::init(path)?;
        let repo = GitRepo::from_repository(repo)?;
        tracing::info!(
            git_dir = %repo.git_dir().display(),
            working_dir = %repo.working_dir().display(),
            "Initialized repository"
        );
        Ok(repo)
    }

    /// Open an existing repository at `path`
    pub fn open(&self, path: impl AsRef<Path>) -> Result<GitRepo> {
        let path = path.as_ref();
        self.log_command(format_args!("-C {} status", path.display()));

        let repo = GitRepo::open(path)?;
        tracing::info!(git_dir = %repo.git_dir().display(), "Opened repository");
        Ok(repo)
    }

    pub(crate) fn log_command(&self, args: fmt::Arguments<'_>) {
        if self.options.trace {
            tracing::info!(target: TRACE_TARGET, "git {}", args);
        } else {
            tracing::debug!(target: TRACE_TARGET, "git {}", args);
        }
    }

    /// Signature from git config, or the configured fallback author
    pub(crate) fn signature(&self, repo: &Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now(
                &self.options.author_name,
                &self.options.author_email,
            )?),
        }
    }

    /// Callbacks supplying credentials and transfer progress
    pub(crate) fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let options = &self.options;
        let mut callbacks = RemoteCallbacks::new();

        let mut attempts = 0;
        callbacks.credentials(move |url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str(&format!(
                    "authentication failed for {}",
                    url
                )));
            }

            if allowed.contains(CredentialType::SSH_KEY) {
                let username = username_from_url.unwrap_or("git");
                return match options.ssh_identity.as_deref() {
                    Some(key) => Cred::ssh_key(username, None, key, None),
                    None => Cred::ssh_key_from_agent(username),
                };
            }

            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(ref token) = options.https_token {
                    return Cred::userpass_plaintext(
                        username_from_url.unwrap_or("x-access-token"),
                        token,
                    );
                }
            }

            if allowed.contains(CredentialType::DEFAULT) {
                return Cred::default();
            }

            Err(git2::Error::from_str("no authentication method available"))
        });

        let trace = options.trace;
        let mut reported = false;
        callbacks.transfer_progress(move |stats| {
            if trace && !reported && stats.received_objects() == stats.total_objects() {
                reported = true;
                tracing::info!(
                    target: TRACE_TARGET,
                    objects = stats.total_objects(),
                    bytes = stats.received_bytes(),
                    "Transfer complete"
                );
            }
            true
        });

        callbacks
    }
}
