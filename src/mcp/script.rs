//! Server script validation
//!
//! Decides which launcher runs a server script and rejects bad paths before
//! any process is spawned.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{RelayError, Result};

/// Interpreter used to run a server script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    Python,
    Node,
}

impl Launcher {
    /// Pick the launcher from a file extension
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Launcher::Python),
            "js" => Some(Launcher::Node),
            _ => None,
        }
    }

    /// Command used to start the interpreter
    pub fn command(&self) -> &'static str {
        match self {
            Launcher::Python => "python",
            Launcher::Node => "node",
        }
    }
}

impl fmt::Display for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// A validated MCP server script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerScript {
    path: PathBuf,
    launcher: Launcher,
}

impl ServerScript {
    /// Validate a script path (.py or .js, must exist)
    pub fn parse(value: &str) -> Result<Self> {
        let path = PathBuf::from(value);

        let launcher = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Launcher::for_extension)
            .ok_or_else(|| RelayError::argument("Server script must be a .py or .js file"))?;

        if !path.is_file() {
            return Err(RelayError::argument(format!(
                "Server script '{}' does not exist",
                value
            )));
        }

        Ok(Self { path, launcher })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn launcher(&self) -> Launcher {
        self.launcher
    }

    /// Short name used in log fields
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
