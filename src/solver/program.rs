//! Locating the interface and domain programs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdpError, Result};

/// File name of the shared interface program.
pub const INTERFACE_PROGRAM: &str = "markov_decision_procedure.lp";

/// The two program sources every query is solved against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSet {
    interface: PathBuf,
    domain: PathBuf,
}

impl ProgramSet {
    /// Use explicit paths. Both files must exist.
    pub fn new(interface: impl Into<PathBuf>, domain: impl Into<PathBuf>) -> Result<Self> {
        let set = Self {
            interface: interface.into(),
            domain: domain.into(),
        };
        for path in set.paths() {
            if !path.is_file() {
                return Err(MdpError::MissingProgramFile {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(set)
    }

    /// Resolve `domain_file` and the interface program inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, domain_file: &str) -> Result<Self> {
        let dir = dir.as_ref();
        Self::new(dir.join(INTERFACE_PROGRAM), dir.join(domain_file))
    }

    /// Resolve against the programs shipped in this crate's `asp/` directory.
    pub fn bundled(domain_file: &str) -> Result<Self> {
        Self::in_dir(bundled_dir(), domain_file)
    }

    #[must_use]
    pub fn interface(&self) -> &Path {
        &self.interface
    }

    #[must_use]
    pub fn domain(&self) -> &Path {
        &self.domain
    }

    /// Both paths, interface first.
    #[must_use]
    pub fn paths(&self) -> [&Path; 2] {
        [&self.interface, &self.domain]
    }

    /// Domain name taken from the domain file stem.
    #[must_use]
    pub fn domain_name(&self) -> &str {
        self.domain
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Directory holding the bundled programs.
#[must_use]
pub fn bundled_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("asp")
}
