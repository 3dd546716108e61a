//! Install option catalog
//!
//! Groups the user-selectable tasks of a manifest under the install options
//! declared in `/RogueTechConfig/Options/InstallOption`, for `--list`.

use std::fmt::Write as _;

use log::warn;

use crate::defaults::OPTIONS_ROOT;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::task::{all_tasks, InstallTask};

/// Width descriptions are wrapped to.
const WRAP_WIDTH: usize = 70;

/// One install option and its selectable tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    /// `optionId`, matched against each task's `optionGroupId`.
    pub id: String,
    /// `optionUiName`.
    pub name: String,
    pub tasks: Vec<InstallTask>,
}

/// Option groups in manifest order, each holding its `canSelect` tasks.
///
/// Groups without selectable tasks are left out, as are options without an
/// `optionId`. An option without `optionUiName` is titled by its id.
pub fn option_groups(manifest: &Manifest) -> Result<Vec<OptionGroup>> {
    let options = manifest.query_records(OPTIONS_ROOT, &["optionId", "optionUiName"])?;
    let tasks = all_tasks(manifest)?;

    let mut groups = Vec::new();
    for option in options {
        let (id, name) = match option.as_slice() {
            [Some(id), name] if !id.is_empty() => {
                let name = name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| id.clone());
                (id.clone(), name)
            }
            _ => {
                warn!(
                    "Skipping install option without an optionId in {}",
                    manifest.origin()
                );
                continue;
            }
        };
        if groups.iter().any(|g: &OptionGroup| g.id == id) {
            continue;
        }
        let members: Vec<InstallTask> = tasks
            .iter()
            .filter(|task| task.can_select && task.option_group == id)
            .cloned()
            .collect();
        if members.is_empty() {
            continue;
        }
        groups.push(OptionGroup {
            id,
            name,
            tasks: members,
        });
    }
    Ok(groups)
}

/// Render groups as plain text.
///
/// ```text
/// Weapons
/// =======
/// + SelectedTask
///  Display name
/// - DeselectedTask
/// ```
pub fn render(groups: &[OptionGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.name);
        let _ = writeln!(out, "{}", "=".repeat(group.name.chars().count()));
        for task in &group.tasks {
            let marker = if task.is_selected { '+' } else { '-' };
            let _ = writeln!(out, "{} {}", marker, task.id);
            for text in [&task.ui_name, &task.ui_description] {
                for line in wrap(text, " ", "    ") {
                    let _ = writeln!(out, "{}", line);
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Greedy word wrap; returns no lines for blank text.
fn wrap(text: &str, first_indent: &str, rest_indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from(first_indent);
    let mut indent_len = first_indent.len();

    for word in text.split_whitespace() {
        let empty = current.len() == indent_len;
        if !empty && current.len() + 1 + word.len() > WRAP_WIDTH {
            lines.push(std::mem::replace(&mut current, String::from(rest_indent)));
            indent_len = rest_indent.len();
        }
        if current.len() > indent_len {
            current.push(' ');
        }
        current.push_str(word);
    }
    if current.len() > indent_len {
        lines.push(current);
    }
    lines
}
