//! Well-known file names used by an installation.

use std::path::Path;

/// Files the installer places or expects next to an install root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallFile {
    /// The dataset archive transferred from the source (`archive.zip`)
    Archive,
    /// Default install profile looked up in the working directory
    Profile,
}

impl InstallFile {
    /// Get the string representation of the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive.zip",
            Self::Profile => "datasets.toml",
        }
    }

    /// The file as a root-relative manifest entry, e.g. `/archive.zip`.
    pub fn as_entry(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl AsRef<Path> for InstallFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for InstallFile {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for InstallFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
