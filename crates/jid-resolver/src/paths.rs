//! Credential directory layout and mapping directory discovery.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Subdirectory of the config dir holding pairing credentials.
const CREDENTIALS_SUBDIR: &str = "credentials";

/// Process-wide credential locations.
#[derive(Debug, Clone)]
pub struct CredentialPaths {
    config_dir: PathBuf,
    oauth_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl CredentialPaths {
    /// Create paths rooted at `config_dir`, expanding `~` from `$HOME`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            oauth_dir: None,
            home_dir: std::env::var_os("HOME").map(PathBuf::from),
        }
    }

    /// Override the OAuth credential directory.
    pub fn with_oauth_dir(mut self, oauth_dir: impl Into<PathBuf>) -> Self {
        self.oauth_dir = Some(oauth_dir.into());
        self
    }

    /// Override the home directory used for `~` expansion.
    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }

    /// Base configuration directory, resolved.
    pub fn config_dir(&self) -> PathBuf {
        self.resolve_user_path(&self.config_dir)
    }

    /// OAuth credential directory. Falls back to the default credentials dir.
    pub fn oauth_dir(&self) -> PathBuf {
        match &self.oauth_dir {
            Some(dir) => self.resolve_user_path(dir),
            None => self.default_credentials_dir(),
        }
    }

    /// `{config_dir}/credentials`.
    pub fn default_credentials_dir(&self) -> PathBuf {
        self.config_dir().join(CREDENTIALS_SUBDIR)
    }

    /// Expand a leading `~` and make the path absolute without touching the
    /// filesystem.
    pub fn resolve_user_path(&self, path: &Path) -> PathBuf {
        let expanded = match (path.strip_prefix("~"), &self.home_dir) {
            (Ok(rest), Some(home)) => home.join(rest),
            _ => path.to_path_buf(),
        };

        let absolute = std::path::absolute(&expanded).unwrap_or(expanded);
        normalize_lexically(&absolute)
    }
}

/// Collapse `.` and `..` components.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Computes the ordered set of directories that may hold LID reverse mappings.
#[derive(Debug, Clone)]
pub struct MappingDirectoryResolver {
    paths: CredentialPaths,
}

impl MappingDirectoryResolver {
    pub fn new(paths: CredentialPaths) -> Self {
        Self { paths }
    }

    /// Candidate directories, most specific first: the caller's auth dir, the
    /// caller's extra dirs, the OAuth dir, then the default credentials dir.
    ///
    /// Recomputed on every call so configuration changes are picked up.
    pub fn resolve(&self, auth_dir: Option<&Path>, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let candidates = auth_dir
            .map(|dir| self.paths.resolve_user_path(dir))
            .into_iter()
            .chain(extra_dirs.iter().map(|dir| self.paths.resolve_user_path(dir)))
            .chain([self.paths.oauth_dir(), self.paths.default_credentials_dir()]);

        let mut seen = HashSet::new();
        let dirs: Vec<PathBuf> = candidates
            .filter(|dir| seen.insert(dir.clone()))
            .collect();

        debug!("Resolved {} mapping directories", dirs.len());
        dirs
    }
}
