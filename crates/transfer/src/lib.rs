//! Local side of a device upload.
//!
//! Turns a folder selection into a sorted list of [`Entry`] values with
//! normalized remote paths, and reopens each entry's content as an
//! upload [`Payload`] whenever an attempt needs it.

mod collector;
mod entry;
mod payload;
mod progress;
mod validation;

pub use collector::{
    CollectOptions, Collection, DirectorySource, LocalDirectorySource, SelectedFile, SourceNode,
    collect_directory, collect_from_selection, collect_from_tree,
};
pub use entry::{Entry, EntryContent};
pub use payload::{MAX_BUFFERED_BODY, Payload, open_payload};
pub use progress::{SpeedCalculator, format_bytes};
pub use validation::{normalize_relative_path, validate_upload_path};

/// Errors produced while preparing entry content for upload.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("body of unknown length exceeds the {limit} byte buffering limit")]
    TooLarge { limit: u64 },

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Errors produced while enumerating a folder selection.
///
/// Collection is all-or-nothing: any of these means no entry list was
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
