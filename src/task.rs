//! # Install Tasks
//!
//! The data model of one manifest entry (`InstallTask`) and the helpers that
//! read it out of `RtConfig.xml`.
//!
//! The manifest encodes the kind of work as a free-form `jobType` string. It
//! is converted into [`TaskJob`], one variant per supported job carrying the
//! paths that job needs, plus [`TaskJob::Unsupported`] holding the raw string
//! so the interpreter can warn about it.

use std::collections::BTreeSet;
use std::fmt;

use crate::defaults::{EXCLUDE_DELIMITERS, PATH_DELIMITERS, TASKS_ROOT};
use crate::error::Result;
use crate::manifest::{path::literal, Manifest};

/// The exclusion name the manifest uses for optional components.
const OPTIONAL_SINGULAR: &str = "Optional";
/// The directory name the repository actually uses.
const OPTIONAL_PLURAL: &str = "Optionals";

/// What a task does when dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskJob {
    /// Copy one source directory into one target directory.
    Install { source: String, target: String },
    /// Copy each source into the target at the same position.
    MultiComponentInstall {
        sources: Vec<String>,
        targets: Vec<String>,
    },
    /// Merge a JSON source into a target JSON file.
    BasicJsonMerge { source: String, target: String },
    /// Informational entry; nothing to do.
    NoOp,
    /// Any other `jobType` value.
    Unsupported(String),
}

impl TaskJob {
    /// The manifest spelling of this job type.
    pub fn kind(&self) -> &str {
        match self {
            TaskJob::Install { .. } => "Install",
            TaskJob::MultiComponentInstall { .. } => "MultiComponentInstall",
            TaskJob::BasicJsonMerge { .. } => "BasicJsonMerge",
            TaskJob::NoOp => "NoOp",
            TaskJob::Unsupported(raw) => raw,
        }
    }
}

/// Immediate child names skipped by a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// Build a set from manifest values.
    ///
    /// Blank entries are dropped. If the singular `Optional` is listed, the
    /// plural `Optionals` is excluded as well; the manifest names the wrong
    /// directory.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if names.contains(OPTIONAL_SINGULAR) {
            names.insert(OPTIONAL_PLURAL.to_string());
        }
        Self { names }
    }

    /// Build a set from a delimited string such as `"Docs,Legacy"`.
    pub fn from_delimited(raw: &str) -> Self {
        Self::new(raw.split(EXCLUDE_DELIMITERS))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Display for ExclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(","))
    }
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTask {
    pub id: String,
    pub job: TaskJob,
    pub exclude: ExclusionSet,
    pub is_selected: bool,
    /// `canSelect`: whether the user may toggle this task.
    pub can_select: bool,
    /// `optionGroupId`, used to group tasks when listing options.
    pub option_group: String,
    pub ui_name: String,
    pub ui_description: String,
}

impl InstallTask {
    /// A selected task with no exclusions or display fields.
    pub fn new(id: impl Into<String>, job: TaskJob) -> Self {
        Self {
            id: id.into(),
            job,
            exclude: ExclusionSet::default(),
            is_selected: true,
            can_select: true,
            option_group: String::new(),
            ui_name: String::new(),
            ui_description: String::new(),
        }
    }

    /// Set the exclusion set.
    pub fn with_exclude(mut self, exclude: ExclusionSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// Read the task with identifier `id` from the manifest.
    ///
    /// Returns `Ok(None)` when no task carries that identifier.
    pub fn from_manifest(manifest: &Manifest, id: &str) -> Result<Option<Self>> {
        let base = format!("{}[Id={}]", TASKS_ROOT, literal(id));
        if manifest.query_list(&format!("{}/Id", base))?.is_empty() {
            return Ok(None);
        }

        let field = |name: &str| manifest.query_str(&format!("{}/{}", base, name));
        let list = |name: &str, delimiters: &[char]| {
            manifest.query_split(&format!("{}/{}", base, name), delimiters)
        };

        let job_type = field("jobType")?;
        let job = match job_type.as_str() {
            "Install" => TaskJob::Install {
                source: field("sourcePath")?,
                target: field("targetPath")?,
            },
            "MultiComponentInstall" => TaskJob::MultiComponentInstall {
                sources: list("sourcePath", PATH_DELIMITERS)?,
                targets: list("targetPath", PATH_DELIMITERS)?,
            },
            "BasicJsonMerge" => TaskJob::BasicJsonMerge {
                source: field("sourcePath")?,
                target: field("targetPath")?,
            },
            "NoOp" => TaskJob::NoOp,
            _ => TaskJob::Unsupported(job_type),
        };

        Ok(Some(Self {
            id: id.to_string(),
            job,
            exclude: ExclusionSet::new(list("excludePaths", EXCLUDE_DELIMITERS)?),
            is_selected: is_true(&field("isSelected")?),
            can_select: is_true(&field("canSelect")?),
            option_group: field("optionGroupId")?,
            ui_name: field("uiName")?,
            ui_description: field("uiDescription")?,
        }))
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Identifiers of every task flagged `isSelected`, in manifest order.
///
/// The flag is read the same way as [`InstallTask::is_selected`], so `True`
/// counts.
pub fn selected_task_ids(manifest: &Manifest) -> Result<Vec<String>> {
    Ok(manifest
        .query_records(TASKS_ROOT, &["Id", "isSelected"])?
        .into_iter()
        .filter_map(|record| match record.as_slice() {
            [Some(id), Some(selected)] if !id.is_empty() && is_true(selected) => {
                Some(id.clone())
            }
            _ => None,
        })
        .collect())
}

/// Every task in the manifest, in manifest order.
pub fn all_tasks(manifest: &Manifest) -> Result<Vec<InstallTask>> {
    let mut tasks = Vec::new();
    for id in manifest.query_list(&format!("{}/Id", TASKS_ROOT))? {
        if let Some(task) = InstallTask::from_manifest(manifest, &id)? {
            tasks.push(task);
        }
    }
    Ok(tasks)
}
