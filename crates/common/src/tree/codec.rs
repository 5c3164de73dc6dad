//! JSON encoding of a whole tree, as stored under `<username> ROOT`.
//!
//! Folders encode as
//! ```text
//! {"name": "root", "is_folder": true, "children": {"docs": {...}}}
//! ```
//! and files as
//! ```text
//! {"name": "a.pdf", "is_folder": false,
//!  "file_obj": {"cid": "...", "size": 10, "filename": "a.pdf",
//!               "creation_date": "2024-05-01T12:00:00Z"}}
//! ```
//! Decoding never fills in defaults: a blob missing a required field is
//!  rejected with [`CodecError::MalformedTree`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::node::{FileRef, Node, NodeKind};
use crate::content_id::ContentId;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed tree: {0}")]
    MalformedTree(String),
    #[error("failed to encode tree: {0}")]
    Encode(serde_json::Error),
}

/// Wire form of a [`Node`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBlob {
    pub name: String,
    pub is_folder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<BTreeMap<String, NodeBlob>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_obj: Option<FileBlob>,
}

/// Wire form of a [`FileRef`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBlob {
    pub cid: String,
    pub size: u64,
    pub filename: String,
    pub creation_date: String,
}

impl From<&FileRef> for FileBlob {
    fn from(file_ref: &FileRef) -> Self {
        Self {
            cid: file_ref.content_id.to_string(),
            size: file_ref.size,
            filename: file_ref.filename.clone(),
            creation_date: format_timestamp(&file_ref.created_at),
        }
    }
}

impl TryFrom<FileBlob> for FileRef {
    type Error = CodecError;

    fn try_from(blob: FileBlob) -> Result<Self, Self::Error> {
        Ok(FileRef {
            content_id: ContentId::new(blob.cid),
            size: blob.size,
            filename: blob.filename,
            created_at: parse_timestamp(&blob.creation_date)?,
        })
    }
}

impl From<&Node> for NodeBlob {
    fn from(node: &Node) -> Self {
        match node.kind() {
            NodeKind::Folder(children) => Self {
                name: node.name().to_string(),
                is_folder: true,
                children: Some(
                    children
                        .iter()
                        .map(|(name, child)| (name.clone(), NodeBlob::from(child)))
                        .collect(),
                ),
                file_obj: None,
            },
            NodeKind::File(file_ref) => Self {
                name: node.name().to_string(),
                is_folder: false,
                children: None,
                file_obj: Some(FileBlob::from(file_ref)),
            },
        }
    }
}

impl TryFrom<NodeBlob> for Node {
    type Error = CodecError;

    fn try_from(blob: NodeBlob) -> Result<Self, Self::Error> {
        match (blob.is_folder, blob.children, blob.file_obj) {
            (true, Some(children), None) => {
                let mut node = Node::folder(blob.name);
                for (key, child) in children {
                    if key != child.name {
                        return Err(CodecError::MalformedTree(format!(
                            "child '{}' stored under key '{}'",
                            child.name, key
                        )));
                    }
                    node.add_child(Node::try_from(child)?)
                        .map_err(|e| CodecError::MalformedTree(e.to_string()))?;
                }
                Ok(node)
            }
            (true, None, _) => Err(CodecError::MalformedTree(format!(
                "folder '{}' is missing children",
                blob.name
            ))),
            (false, None, Some(file_obj)) => Ok(Node::file(blob.name, FileRef::try_from(file_obj)?)),
            (false, _, None) => Err(CodecError::MalformedTree(format!(
                "file '{}' is missing file_obj",
                blob.name
            ))),
            (true, Some(_), Some(_)) | (false, Some(_), Some(_)) => {
                Err(CodecError::MalformedTree(format!(
                    "node '{}' carries both children and file_obj",
                    blob.name
                )))
            }
        }
    }
}

/// Encode a tree as a JSON document
pub fn serialize(node: &Node) -> Result<String, CodecError> {
    serde_json::to_string_pretty(&NodeBlob::from(node)).map_err(CodecError::Encode)
}

/// Decode a tree from a JSON document
pub fn deserialize(blob: &str) -> Result<Node, CodecError> {
    let blob: NodeBlob =
        serde_json::from_str(blob).map_err(|e| CodecError::MalformedTree(e.to_string()))?;
    Node::try_from(blob)
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// Accept RFC 3339 as well as offset-less ISO-8601, which is read as UTC
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CodecError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|_| CodecError::MalformedTree(format!("invalid creation_date '{}'", value)))
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    fn sample_tree() -> Node {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let mut deep = Node::folder("c");
        deep.add_child(Node::file(
            "report.pdf",
            FileRef::new(ContentId::from("Qm1"), 10, "report.pdf").with_created_at(created),
        ))
        .unwrap();
        let mut b = Node::folder("b");
        b.add_child(deep).unwrap();
        let mut a = Node::folder("a");
        a.add_child(b).unwrap();

        let mut root = Node::root();
        root.add_child(a).unwrap();
        root.add_child(Node::folder("empty")).unwrap();
        root.add_child(Node::file(
            "now.txt",
            FileRef::new(ContentId::from("Qm2"), 0, "now.txt"),
        ))
        .unwrap();
        root
    }

    #[test]
    fn test_round_trip() {
        let root = sample_tree();
        let encoded = serialize(&root).unwrap();
        let decoded = deserialize(&encoded).unwrap();
        assert_eq!(root, decoded);
    }

    #[test]
    fn test_round_trip_empty_root() {
        let root = Node::root();
        assert_eq!(deserialize(&serialize(&root).unwrap()).unwrap(), root);
    }

    #[test]
    fn test_wire_format() {
        let root = sample_tree();
        let value: serde_json::Value = serde_json::from_str(&serialize(&root).unwrap()).unwrap();

        assert_eq!(value["name"], "root");
        assert_eq!(value["is_folder"], true);
        assert!(value.get("file_obj").is_none());

        let file = &value["children"]["a"]["children"]["b"]["children"]["c"]["children"]
            ["report.pdf"];
        assert_eq!(file["is_folder"], false);
        assert!(file.get("children").is_none());
        assert_eq!(file["file_obj"]["cid"], "Qm1");
        assert_eq!(file["file_obj"]["size"], 10);
        assert_eq!(file["file_obj"]["filename"], "report.pdf");
        assert_eq!(file["file_obj"]["creation_date"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn test_decode_naive_timestamp() {
        let blob = r#"{
            "name": "root",
            "is_folder": true,
            "children": {
                "a.txt": {
                    "name": "a.txt",
                    "is_folder": false,
                    "file_obj": {
                        "cid": "QmA",
                        "size": 4,
                        "filename": "a.txt",
                        "creation_date": "2024-05-01T12:30:00.250000"
                    }
                }
            }
        }"#;
        let root = deserialize(blob).unwrap();
        let file_ref = root.find_by_path("a.txt").unwrap().file_ref().unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(file_ref.created_at, expected);
        assert_eq!(file_ref.size, 4);
    }

    #[test]
    fn test_decode_missing_fields() {
        let cases = [
            // no name
            r#"{"is_folder": true, "children": {}}"#,
            // no kind
            r#"{"name": "root", "children": {}}"#,
            // folder without children
            r#"{"name": "root", "is_folder": true}"#,
            // file without file_obj
            r#"{"name": "a", "is_folder": false}"#,
            // file_obj without cid
            r#"{"name": "a", "is_folder": false,
                "file_obj": {"size": 1, "filename": "a", "creation_date": "2024-05-01T12:30:00Z"}}"#,
            // bad timestamp
            r#"{"name": "a", "is_folder": false,
                "file_obj": {"cid": "x", "size": 1, "filename": "a", "creation_date": "yesterday"}}"#,
            // child key disagrees with its name
            r#"{"name": "root", "is_folder": true,
                "children": {"x": {"name": "y", "is_folder": true, "children": {}}}}"#,
            // both shapes at once
            r#"{"name": "a", "is_folder": false, "children": {},
                "file_obj": {"cid": "x", "size": 1, "filename": "a", "creation_date": "2024-05-01T12:30:00Z"}}"#,
            "not json",
        ];

        for case in cases {
            let result = deserialize(case);
            assert!(
                matches!(result, Err(CodecError::MalformedTree(_))),
                "expected malformed tree for {}",
                case
            );
        }
    }
}
