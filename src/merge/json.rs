//! JSON merge operations
//!
//! Merges a JSON5-flavoured source document into an existing JSON target.
//! RogueTech patch files carry comments and trailing commas, which are
//! stripped before the text reaches `serde_json`.
//!
//! Merge rules, applied recursively from the root object:
//!
//! - Keys missing from the target are added.
//! - Objects merge key by key.
//! - Arrays are extended with the source items.
//! - Any other value is overwritten by the source.
//! - An object or array in the target meeting a different kind of value in
//!   the source is an error.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Strip JSON5 comments and trailing commas so `serde_json` can parse.
///
/// Unquoted keys and single-quoted strings are not handled.
pub fn sanitize_json5(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut in_string = false;

    while i < len {
        if in_string {
            out.push(chars[i]);
            if chars[i] == '\\' && i + 1 < len {
                i += 1;
                out.push(chars[i]);
            } else if chars[i] == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        // Line comment
        if i + 1 < len && chars[i] == '/' && chars[i + 1] == '/' {
            while i < len && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if i + 1 < len && chars[i] == '/' && chars[i + 1] == '*' {
            i += 2;
            while i + 1 < len && !(chars[i] == '*' && chars[i + 1] == '/') {
                i += 1;
            }
            i = (i + 2).min(len);
            continue;
        }

        // Trailing comma: next significant character closes the container
        if chars[i] == ',' {
            let j = skip_insignificant(&chars, i + 1);
            if j < len && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }

        if chars[i] == '"' {
            in_string = true;
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Index of the first character at or after `i` that is neither whitespace
/// nor inside a comment.
fn skip_insignificant(chars: &[char], mut i: usize) -> usize {
    let len = chars.len();
    while i < len {
        if chars[i].is_whitespace() {
            i += 1;
        } else if i + 1 < len && chars[i] == '/' && chars[i + 1] == '/' {
            while i < len && chars[i] != '\n' {
                i += 1;
            }
        } else if i + 1 < len && chars[i] == '/' && chars[i + 1] == '*' {
            i += 2;
            while i + 1 < len && !(chars[i] == '*' && chars[i + 1] == '/') {
                i += 1;
            }
            i = (i + 2).min(len);
        } else {
            break;
        }
    }
    i
}

/// Parse JSON5-flavoured text.
pub fn parse_json5(input: &str) -> Result<JsonValue> {
    match serde_json::from_str(input) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::from_str(&sanitize_json5(input))?),
    }
}

/// Recursively merge `source` into `target`.
///
/// `path` names the position inside the document, for error messages.
pub fn merge_json_values(target: &mut JsonValue, source: JsonValue, path: &str) -> Result<()> {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, source_value) in source_map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                match target_map.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, source_value, &child_path)?,
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
            Ok(())
        }
        (JsonValue::Array(target_array), JsonValue::Array(source_array)) => {
            target_array.extend(source_array);
            Ok(())
        }
        (JsonValue::Object(_), _) => Err(type_mismatch(path, "an object")),
        (JsonValue::Array(_), _) => Err(type_mismatch(path, "a list")),
        (target, source) => {
            *target = source;
            Ok(())
        }
    }
}

fn type_mismatch(path: &str, kind: &str) -> Error {
    let location = if path.is_empty() { "<root>" } else { path };
    Error::Merge {
        operation: "json merge".to_string(),
        message: format!("target {} is {}, but the source value is not", location, kind),
    }
}

/// Merge the JSON file at `source` into the JSON file at `target`.
///
/// The target is rewritten pretty-printed with four-space indentation.
pub fn merge_json_files(source: &Path, target: &Path) -> Result<()> {
    info!(
        "Merging JSON from '{}' into '{}'",
        source.display(),
        target.display()
    );

    let new_data = read_json5(source)?;
    let mut old_data = read_json5(target)?;
    merge_json_values(&mut old_data, new_data, "").map_err(|e| match e {
        Error::Merge { operation, message } => Error::Merge {
            operation,
            message: format!("{} -> {}: {}", source.display(), target.display(), message),
        },
        other => other,
    })?;

    let mut serialized = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut serialized, formatter);
    serde::Serialize::serialize(&old_data, &mut serializer)?;

    fs::write(target, serialized).map_err(|e| Error::Merge {
        operation: format!("write {}", target.display()),
        message: e.to_string(),
    })
}

/// Merge `source` into `target`, where `source` may be a directory.
///
/// A directory source merges each of its `.json` files in name order.
pub fn merge_json_path(source: &Path, target: &Path) -> Result<()> {
    if !source.is_dir() {
        return merge_json_files(source, target);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    for file in files {
        merge_json_files(&file, target)?;
    }
    Ok(())
}

fn read_json5(path: &Path) -> Result<JsonValue> {
    let text = fs::read_to_string(path).map_err(|e| Error::Merge {
        operation: format!("read {}", path.display()),
        message: e.to_string(),
    })?;
    parse_json5(&text).map_err(|e| Error::Merge {
        operation: format!("parse {}", path.display()),
        message: e.to_string(),
    })
}
