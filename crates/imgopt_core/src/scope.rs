//! Directory scope bounding a pipeline run.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

/// A key prefix under which a batch run operates.
///
/// The prefix is normalised to end with `/` (unless empty) so that
/// `blog/2024/01` never matches `blog/2024/010/...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", prefix)]
pub struct DirectoryScope {
    prefix: String,
}

impl DirectoryScope {
    /// Create a scope from any prefix string.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgopt_core::DirectoryScope;
    ///
    /// assert_eq!(DirectoryScope::new("/blog/2024/01").prefix(), "blog/2024/01/");
    /// assert_eq!(DirectoryScope::new("").prefix(), "");
    /// ```
    pub fn new(prefix: impl AsRef<str>) -> Self {
        let trimmed = prefix.as_ref().trim().trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}/", trimmed)
        };
        Self { prefix }
    }

    /// The current calendar month's upload folder, `uploads_root/YYYY/MM/`.
    pub fn current_month(uploads_root: &str) -> Self {
        let now = Local::now();
        Self::for_month(uploads_root, now.year(), now.month())
    }

    /// Upload folder for a given year and month.
    pub fn for_month(uploads_root: &str, year: i32, month: u32) -> Self {
        let root = uploads_root.trim_matches('/');
        if root.is_empty() {
            Self::new(format!("{:04}/{:02}", year, month))
        } else {
            Self::new(format!("{}/{:04}/{:02}", root, year, month))
        }
    }

    /// Normalised prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True when `key` lies under this scope.
    pub fn contains(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }
}
