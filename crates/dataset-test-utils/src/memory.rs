//! In-memory [`Storage`] with call recording and failure injection.
//!
//! Paths are absolute strings without trailing slashes. Source URIs use the
//! `mem://` scheme, so `mem://source/sub` resolves to `/source/sub` in the
//! same tree.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use dataset_fs::{ChildEntry, Error, NormalizedPath, Result, Storage};

/// One recorded storage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    ListChildren { path: String },
    Exists { path: String },
    Copy { source: String, dest: String, overwrite: bool },
    Delete { path: String },
    Unpack { archive: String, dest: String },
}

impl StorageCall {
    /// Whether the call changes the tree.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Copy { .. } | Self::Delete { .. } | Self::Unpack { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct Node {
    is_dir: bool,
    content: String,
}

#[derive(Debug, Default)]
struct Failures {
    listing: BTreeSet<String>,
    copy: BTreeSet<String>,
    delete: BTreeSet<String>,
    unpack: BTreeSet<String>,
}

/// A storage tree held in memory.
///
/// # Example
///
/// ```rust
/// use dataset_fs::{NormalizedPath, Storage};
/// use dataset_test_utils::MemoryStorage;
///
/// let storage = MemoryStorage::new();
/// storage.add_file("/install/data.csv");
/// assert!(storage.exists(&NormalizedPath::new("/install/data.csv")));
/// assert_eq!(storage.tree("/install"), vec!["/data.csv".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: RefCell<BTreeMap<String, Node>>,
    calls: RefCell<Vec<StorageCall>>,
    failures: RefCell<Failures>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent_of(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

fn is_under(path: &str, root: &str) -> bool {
    root == "/" || path == root || path.starts_with(&format!("{root}/"))
}

fn not_found(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{what} not found"))
}

fn injected() -> io::Error {
    io::Error::other("injected failure")
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty file, creating its parent directories.
    pub fn add_file(&self, path: &str) {
        self.add_file_with(path, "");
    }

    /// Add a file with `content`, creating its parent directories.
    pub fn add_file_with(&self, path: &str, content: &str) {
        let path = normalize(path);
        self.ensure_parents(&path);
        self.nodes.borrow_mut().insert(
            path,
            Node {
                is_dir: false,
                content: content.to_string(),
            },
        );
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: &str) {
        let path = normalize(path);
        self.ensure_parents(&path);
        self.nodes.borrow_mut().insert(
            path,
            Node {
                is_dir: true,
                content: String::new(),
            },
        );
    }

    /// Add an archive whose unpacked content is `entries`.
    ///
    /// Entries are relative (`sub/a.csv`); a trailing `/` marks a directory.
    pub fn add_archive(&self, path: &str, entries: &[&str]) {
        self.add_file_with(path, &entries.join("\n"));
    }

    /// Make `list_children` fail for `path`.
    pub fn fail_listing(&self, path: &str) {
        self.failures.borrow_mut().listing.insert(normalize(path));
    }

    /// Make `copy` fail when writing to `dest`.
    pub fn fail_copy(&self, dest: &str) {
        self.failures.borrow_mut().copy.insert(normalize(dest));
    }

    /// Make `delete_subtree` fail for `path`.
    pub fn fail_delete(&self, path: &str) {
        self.failures.borrow_mut().delete.insert(normalize(path));
    }

    /// Make `unpack_archive` fail for `archive`.
    pub fn fail_unpack(&self, archive: &str) {
        self.failures.borrow_mut().unpack.insert(normalize(archive));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.borrow().clone()
    }

    /// Only the calls that changed the tree, in order.
    pub fn mutations(&self) -> Vec<StorageCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Content of the file at `path`, if it is a file.
    pub fn content(&self, path: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(&normalize(path))
            .filter(|n| !n.is_dir)
            .map(|n| n.content.clone())
    }

    /// Everything beneath `root` as sorted root-relative paths, with a
    /// trailing `/` on directories.
    pub fn tree(&self, root: &str) -> Vec<String> {
        let root = normalize(root);
        let prefix = if root == "/" { String::new() } else { root.clone() };
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| **path != root && is_under(path, &root))
            .map(|(path, node)| {
                let relative = &path[prefix.len()..];
                if node.is_dir {
                    format!("{relative}/")
                } else {
                    relative.to_string()
                }
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn record(&self, call: StorageCall) {
        self.calls.borrow_mut().push(call);
    }

    fn ensure_parents(&self, path: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let mut current = parent_of(path);
        while let Some(dir) = current {
            if dir == "/" {
                break;
            }
            nodes.insert(
                dir.to_string(),
                Node {
                    is_dir: true,
                    content: String::new(),
                },
            );
            current = parent_of(dir);
        }
    }

    fn remove_tree(&self, root: &str) {
        self.nodes
            .borrow_mut()
            .retain(|path, _| !is_under(path, root));
    }

    fn resolve_source(uri: &str) -> Option<String> {
        uri.strip_prefix("mem://").map(|rest| normalize(&format!("/{rest}")))
    }
}

impl Storage for MemoryStorage {
    fn list_children(&self, path: &NormalizedPath) -> Result<Vec<ChildEntry>> {
        let key = normalize(path.as_str());
        self.record(StorageCall::ListChildren { path: key.clone() });

        if self.failures.borrow().listing.contains(&key) {
            return Err(Error::listing(path.to_native(), injected()));
        }

        let nodes = self.nodes.borrow();
        match nodes.get(&key) {
            Some(node) if node.is_dir => {}
            _ if key == "/" => {}
            _ => return Err(Error::listing(path.to_native(), not_found("directory"))),
        }

        let children = nodes
            .iter()
            .filter(|(p, _)| parent_of(p) == Some(key.as_str()))
            .map(|(p, node)| ChildEntry {
                name: p.rsplit('/').next().unwrap_or_default().to_string(),
                is_directory: node.is_dir,
            })
            .collect();
        Ok(children)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        let key = normalize(path.as_str());
        self.record(StorageCall::Exists { path: key.clone() });
        self.nodes.borrow().contains_key(&key)
    }

    fn copy(&self, source_uri: &str, dest: &NormalizedPath, overwrite: bool) -> Result<()> {
        let dest_key = normalize(dest.as_str());
        self.record(StorageCall::Copy {
            source: source_uri.to_string(),
            dest: dest_key.clone(),
            overwrite,
        });

        let transfer = |e: io::Error| Error::transfer(source_uri, dest.to_native(), e);

        if self.failures.borrow().copy.contains(&dest_key) {
            return Err(transfer(injected()));
        }
        let Some(source) = Self::resolve_source(source_uri) else {
            return Err(Error::UnsupportedScheme {
                uri: source_uri.to_string(),
            });
        };
        if !overwrite && self.nodes.borrow().contains_key(&dest_key) {
            return Err(transfer(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination exists",
            )));
        }

        let copied: Vec<(String, Node)> = {
            let nodes = self.nodes.borrow();
            if !nodes.contains_key(&source) {
                return Err(transfer(not_found("source")));
            }
            nodes
                .iter()
                .filter(|(p, _)| is_under(p, &source))
                .map(|(p, node)| (format!("{dest_key}{}", &p[source.len()..]), node.clone()))
                .collect()
        };

        let source_is_dir = copied
            .first()
            .map(|(_, node)| node.is_dir)
            .unwrap_or(false);
        let replace = self
            .nodes
            .borrow()
            .get(&dest_key)
            .is_some_and(|existing| existing.is_dir != source_is_dir);
        if replace {
            self.remove_tree(&dest_key);
        }

        self.ensure_parents(&dest_key);
        self.nodes.borrow_mut().extend(copied);
        Ok(())
    }

    fn delete_subtree(&self, path: &NormalizedPath) -> Result<()> {
        let key = normalize(path.as_str());
        self.record(StorageCall::Delete { path: key.clone() });

        if self.failures.borrow().delete.contains(&key) {
            return Err(Error::delete(path.to_native(), injected()));
        }
        self.remove_tree(&key);
        Ok(())
    }

    fn unpack_archive(&self, archive: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
        let archive_key = normalize(archive.as_str());
        let dest_key = normalize(dest.as_str());
        self.record(StorageCall::Unpack {
            archive: archive_key.clone(),
            dest: dest_key.clone(),
        });

        if self.failures.borrow().unpack.contains(&archive_key) {
            return Err(Error::unpack(archive.to_native(), dest.to_native(), "injected failure"));
        }
        let Some(content) = self.content(&archive_key) else {
            return Err(Error::unpack(archive.to_native(), dest.to_native(), "archive not found"));
        };

        self.add_dir(&dest_key);
        for entry in content.lines().filter(|l| !l.is_empty()) {
            let target = format!("{dest_key}/{entry}");
            if entry.ends_with('/') {
                self.add_dir(&target);
            } else {
                self.add_file(&target);
            }
        }
        Ok(())
    }
}
