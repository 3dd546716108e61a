//! # Manifest Reader
//!
//! Loads an XML document and answers path-expression queries against it. Two
//! documents are read this way: the RogueTech task manifest (`RtConfig.xml`)
//! and the community asset bundle list (`CabRepos.xml`).
//!
//! [`Manifest::query_records`] reads several child fields of each matched
//! node together. Otherwise queries come in three flavours:
//!
//! - [`Manifest::query_str`] returns the text of the first match, or an empty
//!   string when nothing matches.
//! - [`Manifest::query_list`] returns the text of every match in document
//!   order.
//! - [`Manifest::query_split`] returns list values regardless of how the
//!   manifest encodes them. The manifest sometimes repeats child elements and
//!   sometimes joins values into one delimited string; both come back as the
//!   same flat list.
//!
//! ## Example
//!
//! ```
//! use roguetech_installer::manifest::Manifest;
//!
//! let manifest = Manifest::parse(
//!     "<Root><Task><Id>a</Id><excludePaths>Docs, Legacy</excludePaths></Task></Root>",
//! )
//! .unwrap();
//!
//! assert_eq!(manifest.query_str("/Root/Task/Id").unwrap(), "a");
//! assert_eq!(
//!     manifest.query_split("/Root/Task/excludePaths", &[',']).unwrap(),
//!     vec!["Docs", "Legacy"]
//! );
//! ```

pub mod path;

use std::fs;
use std::path::Path;

use log::debug;
use xot::{Node, Xot};

use crate::error::{Error, Result};
use self::path::{Axis, NameTest, Output, PathExpr, Predicate, Step};

/// A parsed XML document ready for queries.
pub struct Manifest {
    xot: Xot,
    document: Node,
    origin: String,
}

impl Manifest {
    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| Error::ManifestRead {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        debug!("Loaded manifest {} ({} bytes)", origin, text.len());
        Self::parse_named(&text, origin)
    }

    /// Parse a document held in memory.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_named(text, "<memory>".to_string())
    }

    fn parse_named(text: &str, origin: String) -> Result<Self> {
        let mut xot = Xot::new();
        let document = xot.parse(text).map_err(|e| Error::ManifestRead {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            xot,
            document,
            origin,
        })
    }

    /// Where the document came from, for messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Text of the first node matching `expression`, or `""`.
    pub fn query_str(&self, expression: &str) -> Result<String> {
        Ok(self.query_list(expression)?.into_iter().next().unwrap_or_default())
    }

    /// Text of every node matching `expression`, in document order.
    pub fn query_list(&self, expression: &str) -> Result<Vec<String>> {
        let expr = PathExpr::parse(expression)?;
        let nodes = self.select(&expr);
        Ok(nodes
            .into_iter()
            .filter_map(|node| self.output_value(node, expr.output()))
            .collect())
    }

    /// List values of every node matching `expression`.
    ///
    /// A matched element with element children contributes the text of each
    /// child. Otherwise its text is split on any of `delimiters`. Entries are
    /// trimmed; empty entries are kept so positional pairing survives.
    pub fn query_split(&self, expression: &str, delimiters: &[char]) -> Result<Vec<String>> {
        let expr = PathExpr::parse(expression)?;
        let mut values = Vec::new();

        for node in self.select(&expr) {
            if let Output::Text = expr.output() {
                let children: Vec<Node> = self
                    .xot
                    .children(node)
                    .filter(|child| self.xot.element(*child).is_some())
                    .collect();
                if !children.is_empty() {
                    values.extend(children.into_iter().map(|child| self.text_of(child)));
                    continue;
                }
            }

            if let Some(raw) = self.output_value(node, expr.output()) {
                values.extend(raw.split(delimiters).map(|part| part.trim().to_string()));
            }
        }

        Ok(values)
    }

    /// Child element text of every node matching `expression`.
    ///
    /// Each record holds one entry per name in `fields`, in that order, and
    /// `None` where the node has no such child. Fields are read per node so a
    /// missing child never shifts values between records.
    pub fn query_records(
        &self,
        expression: &str,
        fields: &[&str],
    ) -> Result<Vec<Vec<Option<String>>>> {
        let expr = PathExpr::parse(expression)?;
        Ok(self
            .select(&expr)
            .into_iter()
            .map(|node| {
                fields
                    .iter()
                    .map(|field| {
                        self.xot
                            .children(node)
                            .find(|child| self.is_named(*child, field))
                            .map(|child| self.text_of(child))
                    })
                    .collect()
            })
            .collect())
    }

    fn select(&self, expr: &PathExpr) -> Vec<Node> {
        let mut current = vec![self.document];
        for step in expr.steps() {
            let mut next: Vec<Node> = Vec::new();
            for context in current {
                for node in self.step_candidates(context, step) {
                    if !next.contains(&node) {
                        next.push(node);
                    }
                }
            }
            current = next;
        }
        current
    }

    fn step_candidates(&self, context: Node, step: &Step) -> Vec<Node> {
        let mut candidates: Vec<Node> = match step.axis {
            Axis::Child => self
                .xot
                .children(context)
                .filter(|node| self.name_matches(*node, &step.name))
                .collect(),
            Axis::Descendant => self
                .xot
                .descendants(context)
                .filter(|node| *node != context && self.name_matches(*node, &step.name))
                .collect(),
        };

        for predicate in &step.predicates {
            candidates = match predicate {
                Predicate::Position(position) => {
                    candidates.into_iter().skip(position - 1).take(1).collect()
                }
                Predicate::ChildEquals { name, value } => candidates
                    .into_iter()
                    .filter(|node| {
                        self.xot.children(*node).any(|child| {
                            self.is_named(child, name) && self.text_of(child) == *value
                        })
                    })
                    .collect(),
                Predicate::AttributeEquals { name, value } => candidates
                    .into_iter()
                    .filter(|node| self.attribute(*node, name) == Some(value.as_str()))
                    .collect(),
            };
        }

        candidates
    }

    fn name_matches(&self, node: Node, test: &NameTest) -> bool {
        match test {
            NameTest::Any => self.xot.element(node).is_some(),
            NameTest::Named(name) => self.is_named(node, name),
        }
    }

    fn is_named(&self, node: Node, name: &str) -> bool {
        match (self.xot.element(node), self.xot.name(name)) {
            (Some(element), Some(name_id)) => element.name() == name_id,
            _ => false,
        }
    }

    fn attribute(&self, node: Node, name: &str) -> Option<&str> {
        let name_id = self.xot.name(name)?;
        self.xot.get_attribute(node, name_id)
    }

    fn output_value(&self, node: Node, output: &Output) -> Option<String> {
        match output {
            Output::Text => Some(self.text_of(node)),
            Output::Attribute(name) => self.attribute(node, name).map(|v| v.trim().to_string()),
        }
    }

    /// Concatenated, trimmed text below `node`.
    fn text_of(&self, node: Node) -> String {
        let text: String = self
            .xot
            .descendants(node)
            .filter_map(|n| self.xot.text_str(n))
            .collect();
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TASKS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<RogueTechConfig>
  <Tasks>
    <InstallTask>
      <Id>core</Id>
      <jobType>Install</jobType>
      <isSelected>true</isSelected>
      <excludePaths>Docs,Optional</excludePaths>
    </InstallTask>
    <InstallTask kind="extra">
      <Id>extras</Id>
      <jobType>MultiComponentInstall</jobType>
      <isSelected>false</isSelected>
      <excludePaths>
        <string>Docs</string>
        <string>Legacy</string>
      </excludePaths>
    </InstallTask>
    <InstallTask>
      <Id>music</Id>
      <jobType>NoOp</jobType>
      <isSelected> true </isSelected>
    </InstallTask>
  </Tasks>
</RogueTechConfig>"#;

    #[test]
    fn test_query_str_first_match() {
        let manifest = Manifest::parse(TASKS).unwrap();
        assert_eq!(
            manifest
                .query_str("/RogueTechConfig/Tasks/InstallTask/Id")
                .unwrap(),
            "core"
        );
    }

    #[test]
    fn test_query_str_no_match_is_empty() {
        let manifest = Manifest::parse(TASKS).unwrap();
        assert_eq!(manifest.query_str("/RogueTechConfig/Missing").unwrap(), "");
        assert_eq!(manifest.query_str("/Other/Tasks").unwrap(), "");
    }

    #[test]
    fn test_query_list_document_order() {
        let manifest = Manifest::parse(TASKS).unwrap();
        let ids = manifest
            .query_list("/RogueTechConfig/Tasks/InstallTask/Id")
            .unwrap();
        assert_eq!(ids, vec!["core", "extras", "music"]);
    }

    #[test]
    fn test_query_list_with_predicate_trims_values() {
        let manifest = Manifest::parse(TASKS).unwrap();
        let ids = manifest
            .query_list("/RogueTechConfig/Tasks/InstallTask[isSelected='true']/Id")
            .unwrap();
        assert_eq!(ids, vec!["core", "music"]);
    }

    #[test]
    fn test_query_descendant_and_position() {
        let manifest = Manifest::parse(TASKS).unwrap();
        assert_eq!(manifest.query_str("//InstallTask[2]/Id").unwrap(), "extras");
        assert_eq!(
            manifest.query_list("//jobType").unwrap(),
            vec!["Install", "MultiComponentInstall", "NoOp"]
        );
    }

    #[test]
    fn test_query_attribute() {
        let manifest = Manifest::parse(TASKS).unwrap();
        assert_eq!(
            manifest
                .query_list("/RogueTechConfig/Tasks/InstallTask/@kind")
                .unwrap(),
            vec!["extra"]
        );
        assert_eq!(
            manifest
                .query_str("/RogueTechConfig/Tasks/InstallTask[@kind='extra']/Id")
                .unwrap(),
            "extras"
        );
    }

    #[test]
    fn test_query_split_delimited_string() {
        let manifest = Manifest::parse(TASKS).unwrap();
        let excludes = manifest
            .query_split(
                "/RogueTechConfig/Tasks/InstallTask[Id='core']/excludePaths",
                &[','],
            )
            .unwrap();
        assert_eq!(excludes, vec!["Docs", "Optional"]);
    }

    #[test]
    fn test_query_split_xml_list() {
        let manifest = Manifest::parse(TASKS).unwrap();
        let excludes = manifest
            .query_split(
                "/RogueTechConfig/Tasks/InstallTask[Id='extras']/excludePaths",
                &[','],
            )
            .unwrap();
        assert_eq!(excludes, vec!["Docs", "Legacy"]);
    }

    #[test]
    fn test_query_split_keeps_empty_positions() {
        let manifest =
            Manifest::parse("<R><sourcePath>a, ,b</sourcePath></R>").unwrap();
        assert_eq!(
            manifest.query_split("/R/sourcePath", &[',']).unwrap(),
            vec!["a", "", "b"]
        );
    }

    #[test]
    fn test_query_split_missing_node_is_empty() {
        let manifest = Manifest::parse(TASKS).unwrap();
        assert!(manifest
            .query_split("/RogueTechConfig/Tasks/InstallTask[Id='music']/excludePaths", &[','])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_query_records_reads_fields_per_node() {
        let manifest = Manifest::parse(
            "<R><E><b>first-b</b></E><E><a>second-a</a><b>second-b</b></E></R>",
        )
        .unwrap();
        let records = manifest.query_records("/R/E", &["a", "b"]).unwrap();
        assert_eq!(
            records,
            vec![
                vec![None, Some("first-b".to_string())],
                vec![Some("second-a".to_string()), Some("second-b".to_string())],
            ]
        );
    }

    #[test]
    fn test_invalid_expression_is_query_error() {
        let manifest = Manifest::parse(TASKS).unwrap();
        let err = manifest.query_str("RogueTechConfig").unwrap_err();
        assert!(matches!(err, Error::ManifestQuery { .. }));
    }

    #[test]
    fn test_malformed_document_is_read_error() {
        let err = Manifest::parse("<Root><Open></Root>").err().unwrap();
        assert!(matches!(err, Error::ManifestRead { .. }));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Manifest::load(&temp_dir.path().join("RtConfig.xml"))
            .err()
            .unwrap();
        match err {
            Error::ManifestRead { path, .. } => assert!(path.ends_with("RtConfig.xml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("RtConfig.xml");
        fs::write(&path, TASKS).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert!(manifest.origin().ends_with("RtConfig.xml"));
        assert_eq!(
            manifest
                .query_list("/RogueTechConfig/Tasks/InstallTask/jobType")
                .unwrap()
                .len(),
            3
        );
    }
}
