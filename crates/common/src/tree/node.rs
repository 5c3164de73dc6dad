use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::content_id::ContentId;

use super::path;

/**
 * Nodes
 * =====
 * A user's storage is a strict tree of nodes rooted at a folder
 *  named `root`. Every node is either:
 *  - a Folder: a map of child names to the nodes it exclusively owns
 *  - a File: a reference to bytes held by the blob store
 * Paths are just /-joined names of children, starting below the
 *  node the lookup begins at.
 */

// Describes the bytes a file node points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Handle returned by the blob store
    pub content_id: ContentId,
    /// Size of the uploaded bytes
    pub size: u64,
    /// Name the file was uploaded with
    pub filename: String,
    /// When the file was added to the tree
    pub created_at: DateTime<Utc>,
}

impl FileRef {
    pub fn new(content_id: ContentId, size: u64, filename: impl Into<String>) -> Self {
        Self {
            content_id,
            size,
            filename: filename.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Folder(BTreeMap<String, Node>),
    File(FileRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("not a folder: {0}")]
    NotAFolder(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("node not found: {0}")]
    NodeNotFound(String),
}

impl Node {
    /// An empty folder
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder(BTreeMap::new()),
        }
    }

    pub fn file(name: impl Into<String>, file_ref: FileRef) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File(file_ref),
        }
    }

    /// The folder a new account starts with
    pub fn root() -> Self {
        Self::folder(path::ROOT_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    /// Children of a folder, `None` for files
    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match &self.kind {
            NodeKind::Folder(children) => Some(children),
            NodeKind::File(_) => None,
        }
    }

    pub fn file_ref(&self) -> Option<&FileRef> {
        match &self.kind {
            NodeKind::File(file_ref) => Some(file_ref),
            NodeKind::Folder(_) => None,
        }
    }

    pub fn get_child(&self, name: &str) -> Option<&Node> {
        self.children().and_then(|children| children.get(name))
    }

    pub fn add_child(&mut self, child: Node) -> Result<(), NodeError> {
        let children = match &mut self.kind {
            NodeKind::Folder(children) => children,
            NodeKind::File(_) => return Err(NodeError::NotAFolder(self.name.clone())),
        };
        if children.contains_key(&child.name) {
            return Err(NodeError::DuplicateName(child.name));
        }
        children.insert(child.name.clone(), child);
        Ok(())
    }

    /// Remove a child and, with it, the whole subtree below it.
    pub fn remove_child(&mut self, name: &str) -> Result<Node, NodeError> {
        match &mut self.kind {
            NodeKind::Folder(children) => children
                .remove(name)
                .ok_or_else(|| NodeError::NodeNotFound(name.to_string())),
            NodeKind::File(_) => Err(NodeError::NotAFolder(self.name.clone())),
        }
    }

    /// Walk `path` below this node. The empty path (or a bare `/`)
    ///  is this node.
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        let mut node = self;
        for segment in path::segments(path) {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    pub fn find_by_path_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut node = self;
        for segment in path::segments(path) {
            node = match &mut node.kind {
                NodeKind::Folder(children) => children.get_mut(segment)?,
                NodeKind::File(_) => return None,
            };
        }
        Some(node)
    }

    /// Every file below this node, keyed by its path relative to
    ///  this node. A file node yields nothing.
    pub fn files(&self) -> Vec<(String, &FileRef)> {
        let mut files = Vec::new();
        self.collect_files("", &mut files);
        files
    }

    fn collect_files<'a>(&'a self, prefix: &str, files: &mut Vec<(String, &'a FileRef)>) {
        let Some(children) = self.children() else {
            return;
        };
        for (name, child) in children {
            let child_path = path::join(prefix, name);
            match &child.kind {
                NodeKind::Folder(_) => child.collect_files(&child_path, files),
                NodeKind::File(file_ref) => files.push((child_path, file_ref)),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn file(name: &str, cid: &str, size: u64) -> Node {
        Node::file(name, FileRef::new(ContentId::from(cid), size, name))
    }

    fn sample_tree() -> Node {
        let mut docs = Node::folder("docs");
        docs.add_child(file("report.pdf", "Qm1", 10)).unwrap();
        let mut sub = Node::folder("sub");
        sub.add_child(file("notes.txt", "Qm2", 3)).unwrap();
        docs.add_child(sub).unwrap();

        let mut root = Node::root();
        root.add_child(docs).unwrap();
        root.add_child(file("secret.txt", "Qm3", 7)).unwrap();
        root
    }

    #[test]
    fn test_add_child() {
        let mut root = Node::root();
        root.add_child(Node::folder("docs")).unwrap();
        assert!(root.get_child("docs").unwrap().is_folder());
        assert_eq!(root.children().unwrap().len(), 1);
    }

    #[test]
    fn test_add_child_duplicate() {
        let mut root = Node::root();
        root.add_child(Node::folder("docs")).unwrap();
        let result = root.add_child(file("docs", "Qm1", 1));
        assert_eq!(result, Err(NodeError::DuplicateName("docs".to_string())));
        assert!(root.get_child("docs").unwrap().is_folder());
    }

    #[test]
    fn test_add_child_to_file() {
        let mut node = file("a.txt", "Qm1", 1);
        let result = node.add_child(Node::folder("docs"));
        assert_eq!(result, Err(NodeError::NotAFolder("a.txt".to_string())));
    }

    #[test]
    fn test_find_by_path() {
        let root = sample_tree();

        let report = root.find_by_path("docs/report.pdf").unwrap();
        assert_eq!(report.file_ref().unwrap().content_id.as_str(), "Qm1");

        // separators at either end are ignored
        let sub = root.find_by_path("/docs/sub/").unwrap();
        assert_eq!(sub.name(), "sub");

        // empty path and bare separator are the node itself
        assert_eq!(root.find_by_path("").unwrap(), &root);
        assert_eq!(root.find_by_path("/").unwrap(), &root);
    }

    #[test]
    fn test_find_by_path_missing() {
        let root = sample_tree();
        assert!(root.find_by_path("docs/missing.pdf").is_none());
        assert!(root.find_by_path("nope/report.pdf").is_none());
        // cannot walk through a file
        assert!(root.find_by_path("secret.txt/anything").is_none());
        assert!(root.find_by_path("docs//report.pdf").is_none());
    }

    #[test]
    fn test_find_by_path_mut() {
        let mut root = sample_tree();
        let sub = root.find_by_path_mut("docs/sub").unwrap();
        sub.add_child(Node::folder("deeper")).unwrap();
        assert!(root.find_by_path("docs/sub/deeper").unwrap().is_folder());
        assert!(root.find_by_path_mut("secret.txt/x").is_none());
    }

    #[test]
    fn test_find_by_path_inverse() {
        let root = sample_tree();
        for (path, file_ref) in root.files() {
            let found = root.find_by_path(&path).unwrap();
            assert_eq!(found.file_ref().unwrap(), file_ref);
        }
    }

    #[test]
    fn test_remove_child() {
        let mut root = sample_tree();
        let removed = root.remove_child("docs").unwrap();
        assert_eq!(removed.name(), "docs");
        assert!(root.find_by_path("docs/sub/notes.txt").is_none());

        let result = root.remove_child("docs");
        assert_eq!(result, Err(NodeError::NodeNotFound("docs".to_string())));
    }

    #[test]
    fn test_remove_child_from_file() {
        let mut node = file("a.txt", "Qm1", 1);
        assert!(matches!(
            node.remove_child("x"),
            Err(NodeError::NotAFolder(_))
        ));
    }

    #[test]
    fn test_files() {
        let root = sample_tree();
        let paths: Vec<String> = root.files().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "docs/report.pdf".to_string(),
                "docs/sub/notes.txt".to_string(),
                "secret.txt".to_string()
            ]
        );

        let docs = root.find_by_path("docs").unwrap();
        let paths: Vec<String> = docs.files().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["report.pdf", "sub/notes.txt"]);

        assert!(Node::folder("empty").files().is_empty());
    }
}
