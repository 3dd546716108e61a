//! JSON merge adapters
//!
//! `BasicJsonMerge` tasks hand their source and target paths to a
//! [`JsonMerger`]. The merge semantics belong to the implementation; the
//! interpreter only propagates success or failure.
//!
//! ## Implementations
//!
//! - [`BuiltinJsonMerger`] merges in process (see [`json`]).
//! - [`ExternalJsonMerger`] runs a configured program with the source and
//!   target paths appended to its arguments.

pub mod json;

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Merges a JSON source into a target file.
pub trait JsonMerger {
    fn merge(&self, source: &Path, target: &Path) -> Result<()>;
}

/// In-process merge of JSON5-flavoured content.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinJsonMerger;

impl JsonMerger for BuiltinJsonMerger {
    fn merge(&self, source: &Path, target: &Path) -> Result<()> {
        json::merge_json_path(source, target)
    }
}

/// Runs an external merge program as `<program> <args...> <source> <target>`.
#[derive(Debug, Clone)]
pub struct ExternalJsonMerger {
    program: String,
    args: Vec<String>,
}

impl ExternalJsonMerger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace-separated command line such as
    /// `"python3 basic_json_merge.py"`.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| Error::ExternalTool {
            tool: "json merge".to_string(),
            message: "empty merge command".to_string(),
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl JsonMerger for ExternalJsonMerger {
    fn merge(&self, source: &Path, target: &Path) -> Result<()> {
        debug!(
            "Running {} {:?} {} {}",
            self.program,
            self.args,
            source.display(),
            target.display()
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .arg(target)
            .output()
            .map_err(|e| Error::ExternalTool {
                tool: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool {
                tool: self.program.clone(),
                message: format!(
                    "merge of '{}' into '{}' exited with {}: {}",
                    source.display(),
                    target.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }
        Ok(())
    }
}
