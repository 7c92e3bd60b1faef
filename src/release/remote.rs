//! Remote descriptor parsing
//!
//! The hosted-release path needs an `owner/repo` pair, derived from the
//! sanitized origin URL on every use. Descriptors are never cached across
//! runs; the remote can change between them.

use regex::Regex;

/// `owner/repo` pair extracted from a GitHub remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
  pub owner: String,
  pub repo: String,
}

impl RemoteDescriptor {
  /// Parse a GitHub remote URL in HTTPS or SSH form
  ///
  /// Accepts `https://github.com/owner/repo(.git)` and
  /// `git@github.com:owner/repo(.git)`. Returns `None` for anything else.
  pub fn parse(url: &str) -> Option<Self> {
    let re = Regex::new(r"github\.com[/:]([^/]+)/(.+?)(?:\.git)?/?$").ok()?;
    let captures = re.captures(url.trim())?;

    let owner = captures.get(1)?.as_str().to_string();
    let repo = captures.get(2)?.as_str().to_string();

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
      return None;
    }

    Some(Self { owner, repo })
  }

  /// `owner/repo` form used by the release CLI
  pub fn slug(&self) -> String {
    format!("{}/{}", self.owner, self.repo)
  }
}
