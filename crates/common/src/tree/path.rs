//! Path helpers shared by the tree, the share list and the service.
//!
//! Paths are `/`-joined child names relative to a user's root.
//!  Leading and trailing separators are never significant, so
//!  `"/docs/"`, `"docs/"` and `"docs"` all name the same node.

/// Name of the folder every account starts with.
pub const ROOT_NAME: &str = "root";

/// Path separator.
pub const SEPARATOR: char = '/';

/// Trim leading and trailing separators.
pub fn normalize(path: &str) -> &str {
    path.trim_matches(SEPARATOR)
}

/// Whether `path` refers to a user's root, either as the empty
///  path or as the literal root marker.
pub fn is_root(path: &str) -> bool {
    let path = normalize(path);
    path.is_empty() || path == ROOT_NAME
}

/// Split a path into its segments. The empty path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = normalize(path);
    path.split(SEPARATOR).filter(move |_| !path.is_empty())
}

/// Split a normalized path into `(parent, name)`.
///  Returns `None` for the empty path.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let path = normalize(path);
    if path.is_empty() {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(idx) => Some((&path[..idx], &path[idx + 1..])),
        None => Some(("", path)),
    }
}

/// Split `<owner>/<relative path>` on its first segment.
///  The relative part is empty when the path is only an owner.
pub fn split_owner(path: &str) -> Option<(&str, &str)> {
    let path = normalize(path);
    if path.is_empty() {
        return None;
    }
    match path.split_once(SEPARATOR) {
        Some((owner, rest)) => Some((owner, normalize(rest))),
        None => Some((path, "")),
    }
}

/// Join a parent path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    let parent = normalize(parent);
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// A child name must be a single non-empty segment and never one of
///  the relative markers `.` or `..`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(SEPARATOR) && name != "." && name != ".."
}

/// Whether `name` may be added below the folder at `parent`. At the
///  top level the root marker is taken.
pub fn is_valid_child(parent: &str, name: &str) -> bool {
    is_valid_name(name) && !(normalize(parent).is_empty() && name == ROOT_NAME)
}
