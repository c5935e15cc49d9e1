//! Folder collection.
//!
//! Two selection shapes are supported: a flat list of files that already
//! carry a relative path, and a tree of directory handles that can only be
//! enumerated in batches. Both end in the same normalization step, which
//! produces a sorted, validated [`Collection`].

use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::debug;

use crate::entry::{Entry, EntryContent};
use crate::validation::{normalize_relative_path, validate_upload_path};
use crate::{CollectionError, TransferError};

/// Default number of directory entries returned per batch.
pub const DEFAULT_READ_BATCH: usize = 64;

/// Knobs for turning a selection into an entry list.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Prefix every path with `root_prefix` when no path already starts with it.
    pub ensure_root_prefix: bool,
    /// Directory on the device that holds the site (`out` for a static export).
    pub root_prefix: String,
    /// Upper bound on entries returned by one directory read.
    pub read_batch_size: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            ensure_root_prefix: true,
            root_prefix: "out".into(),
            read_batch_size: DEFAULT_READ_BATCH,
        }
    }
}

/// A file from a flat selection, already carrying its relative path.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub relative_path: String,
    pub size: u64,
    pub content: EntryContent,
}

/// One node returned by a directory read.
#[derive(Debug, Clone)]
pub enum SourceNode<H> {
    File {
        name: String,
        size: u64,
        content: EntryContent,
    },
    Directory {
        name: String,
        handle: H,
    },
}

/// Boxed future returned by [`DirectorySource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// A directory tree that can only be enumerated in batches.
///
/// `read_entries` returns the next batch for a reader; an empty batch
/// means the directory is exhausted. Callers must keep reading until they
/// see the empty batch.
pub trait DirectorySource: Send + Sync {
    type Handle: Send + Sync;
    type Reader: Send;

    /// Opens a reader over the direct children of `dir`.
    fn create_reader<'a>(&'a self, dir: &'a Self::Handle) -> SourceFuture<'a, Self::Reader>;

    /// Returns the next batch of children, or an empty batch when done.
    fn read_entries<'a>(
        &'a self,
        reader: &'a mut Self::Reader,
    ) -> SourceFuture<'a, Vec<SourceNode<Self::Handle>>>;
}

/// Result of a collection: the sorted entries plus how they were derived.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub entries: Vec<Entry>,
    /// Name of the first directory in the selection, if any.
    pub root_name: Option<String>,
    /// Whether the root prefix was prepended to every path.
    pub prefix_added: bool,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry sizes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Short human label for the selection.
    pub fn label(&self, opts: &CollectOptions) -> String {
        match (&self.root_name, self.prefix_added) {
            (Some(name), _) => name.clone(),
            (None, true) => format!("{} (auto)", opts.root_prefix),
            (None, false) => "selection".into(),
        }
    }
}

/// Builds a collection from a flat, pre-pathed file selection.
///
/// The root name is taken from the first path's top-level segment.
pub fn collect_from_selection(
    files: Vec<SelectedFile>,
    opts: &CollectOptions,
) -> Result<Collection, CollectionError> {
    let root_name = files.first().and_then(|f| {
        normalize_relative_path(&f.relative_path)
            .split('/')
            .next()
            .filter(|top| !top.is_empty())
            .map(str::to_string)
    });
    finalize(files, root_name, opts)
}

/// Builds a collection by walking a directory tree.
///
/// Uses an explicit worklist of pending directories instead of recursion.
/// Each directory's name is appended to the prefix of its children. Any
/// read failure aborts the whole collection; no partial list is returned.
pub async fn collect_from_tree<S: DirectorySource>(
    source: &S,
    roots: Vec<SourceNode<S::Handle>>,
    opts: &CollectOptions,
) -> Result<Collection, CollectionError> {
    let mut files = Vec::new();
    let mut root_name = None;
    let mut pending: VecDeque<(S::Handle, String)> = VecDeque::new();

    for node in roots {
        match node {
            SourceNode::File {
                name,
                size,
                content,
            } => files.push(SelectedFile {
                relative_path: name,
                size,
                content,
            }),
            SourceNode::Directory { name, handle } => {
                if root_name.is_none() && !name.is_empty() {
                    root_name = Some(name.clone());
                }
                pending.push_back((handle, name));
            }
        }
    }

    while let Some((handle, prefix)) = pending.pop_front() {
        let read_error = |source: io::Error| CollectionError::Read {
            path: display_prefix(&prefix),
            source,
        };

        let mut reader = source.create_reader(&handle).await.map_err(read_error)?;
        loop {
            let batch = source.read_entries(&mut reader).await.map_err(read_error)?;
            if batch.is_empty() {
                break;
            }
            for node in batch {
                match node {
                    SourceNode::File {
                        name,
                        size,
                        content,
                    } => files.push(SelectedFile {
                        relative_path: join_path(&prefix, &name),
                        size,
                        content,
                    }),
                    SourceNode::Directory { name, handle } => {
                        pending.push_back((handle, join_path(&prefix, &name)));
                    }
                }
            }
        }
    }

    finalize(files, root_name, opts)
}

/// Collects a local folder as if it had been dropped onto the uploader.
///
/// Paths start with the folder's own name; a plain file yields a single
/// entry named after the file.
pub async fn collect_directory(
    path: &Path,
    opts: &CollectOptions,
) -> Result<Collection, CollectionError> {
    let read_error = |source: io::Error| CollectionError::Read {
        path: path.display().to_string(),
        source,
    };

    let canonical = tokio::fs::canonicalize(path).await.map_err(read_error)?;
    let metadata = tokio::fs::metadata(&canonical).await.map_err(read_error)?;
    let name = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let root = if metadata.is_dir() {
        SourceNode::Directory {
            name,
            handle: canonical,
        }
    } else {
        SourceNode::File {
            name,
            size: metadata.len(),
            content: EntryContent::File(canonical),
        }
    };

    let source = LocalDirectorySource::new(opts.read_batch_size);
    collect_from_tree(&source, vec![root], opts).await
}

fn finalize(
    files: Vec<SelectedFile>,
    root_name: Option<String>,
    opts: &CollectOptions,
) -> Result<Collection, CollectionError> {
    if files.is_empty() {
        return Ok(Collection::default());
    }

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let relative_path = normalize_relative_path(&file.relative_path);
        validate_upload_path(&relative_path).map_err(|e| match e {
            TransferError::InvalidPath(msg) => CollectionError::InvalidPath(msg),
            other => CollectionError::InvalidPath(other.to_string()),
        })?;
        entries.push(Entry {
            relative_path,
            size: file.size,
            content: file.content,
        });
    }

    let root = opts.root_prefix.trim_matches('/');
    let marker = format!("{root}/");
    let prefix_added = opts.ensure_root_prefix
        && !root.is_empty()
        && entries.iter().all(|e| !e.relative_path.starts_with(&marker));
    if prefix_added {
        for entry in &mut entries {
            entry.relative_path = format!("{marker}{}", entry.relative_path);
        }
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(files = entries.len(), prefix_added, "collection finalized");

    Ok(Collection {
        entries,
        root_name,
        prefix_added,
    })
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn display_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        "/".into()
    } else {
        prefix.to_string()
    }
}

// ---------------------------------------------------------------------------
// LocalDirectorySource
// ---------------------------------------------------------------------------

/// [`DirectorySource`] over the local filesystem.
///
/// Symlinks are followed. Entries that are neither regular files nor
/// directories (sockets, FIFOs) are skipped.
#[derive(Debug, Clone)]
pub struct LocalDirectorySource {
    batch_size: usize,
}

/// Open directory listing for [`LocalDirectorySource`].
pub struct LocalReader {
    dir: tokio::fs::ReadDir,
}

impl LocalDirectorySource {
    /// Creates a source returning at most `batch_size` entries per read.
    ///
    /// A `batch_size` of 0 uses [`DEFAULT_READ_BATCH`].
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: if batch_size == 0 {
                DEFAULT_READ_BATCH
            } else {
                batch_size
            },
        }
    }
}

impl Default for LocalDirectorySource {
    fn default() -> Self {
        Self::new(DEFAULT_READ_BATCH)
    }
}

impl DirectorySource for LocalDirectorySource {
    type Handle = PathBuf;
    type Reader = LocalReader;

    fn create_reader<'a>(&'a self, dir: &'a PathBuf) -> SourceFuture<'a, LocalReader> {
        Box::pin(async move {
            let dir = tokio::fs::read_dir(dir).await?;
            Ok(LocalReader { dir })
        })
    }

    fn read_entries<'a>(
        &'a self,
        reader: &'a mut LocalReader,
    ) -> SourceFuture<'a, Vec<SourceNode<PathBuf>>> {
        Box::pin(async move {
            let mut batch = Vec::new();
            while batch.len() < self.batch_size {
                let Some(entry) = reader.dir.next_entry().await? else {
                    break;
                };
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let metadata = tokio::fs::metadata(&path).await?;

                if metadata.is_dir() {
                    batch.push(SourceNode::Directory { name, handle: path });
                } else if metadata.is_file() {
                    batch.push(SourceNode::File {
                        name,
                        size: metadata.len(),
                        content: EntryContent::File(path),
                    });
                } else {
                    debug!(path = %path.display(), "skipping special file");
                }
            }
            Ok(batch)
        })
    }
}
