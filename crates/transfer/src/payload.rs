//! Upload payload acquisition.
//!
//! The device cannot take chunked request bodies, so every payload must
//! have a length known before the request starts. Regular files are
//! streamed with their stat length; anything else is buffered in memory
//! up to [`MAX_BUFFERED_BODY`].

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::TransferError;
use crate::entry::EntryContent;

/// Largest body that will be buffered to learn its length (50 MiB).
pub const MAX_BUFFERED_BODY: u64 = 50 * 1024 * 1024;

/// Freshly opened content for exactly one upload attempt.
#[derive(Debug)]
pub enum Payload {
    /// Fully buffered bytes.
    Buffered(Vec<u8>),
    /// An open regular file and its length at open time.
    File { file: tokio::fs::File, len: u64 },
}

impl Payload {
    /// Body length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Payload::Buffered(data) => data.len() as u64,
            Payload::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Opens an entry's content for one upload attempt.
///
/// Called again for every retry; a payload is consumed by the request
/// that sends it.
pub async fn open_payload(content: &EntryContent) -> Result<Payload, TransferError> {
    match content {
        EntryContent::Memory(data) => Ok(Payload::Buffered(data.to_vec())),
        EntryContent::File(path) => {
            let file = tokio::fs::File::open(path).await?;
            let metadata = file.metadata().await?;
            if metadata.is_file() {
                Ok(Payload::File {
                    file,
                    len: metadata.len(),
                })
            } else {
                let data = read_bounded(file, MAX_BUFFERED_BODY).await?;
                Ok(Payload::Buffered(data))
            }
        }
    }
}

async fn read_bounded<R: AsyncRead + Unpin>(reader: R, limit: u64) -> Result<Vec<u8>, TransferError> {
    let mut buf = Vec::new();
    reader.take(limit + 1).read_to_end(&mut buf).await?;
    if buf.len() as u64 > limit {
        return Err(TransferError::TooLarge { limit });
    }
    Ok(buf)
}
