use std::io::Cursor;

use tracing::debug;

use crate::adapters::{self, Blob};
use crate::backend;
use crate::error::{StorageError, StorageResult};

/// A buffer-backed handle over one stored blob.
///
/// The backing bytes are fetched on first access, writes stay in memory, and
/// a dirty buffer is flushed through the save path when the handle is
/// closed. A closed handle reopens on the next access by re-fetching from
/// the store, which fails if the entry is gone.
pub struct BlobFile<'a> {
    client: &'a dyn Blob,
    name: String,
    mode: String,
    buf: Option<Cursor<Vec<u8>>>,
    dirty: bool,
    closed: bool,
}

impl<'a> BlobFile<'a> {
    pub fn new(client: &'a dyn Blob, name: &str, mode: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            mode: mode.to_string(),
            buf: None,
            dirty: false,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn is_writable(&self) -> bool {
        self.mode.contains('w') || self.mode.contains('+')
    }

    /// Reads from the current position to the end of the buffer.
    pub async fn read(&mut self) -> StorageResult<Vec<u8>> {
        let buf = self.buffer().await?;

        let pos = (buf.position() as usize).min(buf.get_ref().len());
        let out = buf.get_ref()[pos..].to_vec();
        buf.set_position(buf.get_ref().len() as u64);

        Ok(out)
    }

    pub async fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        if !self.is_writable() {
            return Err(StorageError::InvalidMode(format!(
                "{} was opened read-only ({})",
                self.name, self.mode
            )));
        }

        let buf = self.buffer().await?;

        let pos = buf.position() as usize;
        let inner = buf.get_mut();
        if pos > inner.len() {
            inner.resize(pos, 0);
        }
        let overlap = (inner.len() - pos).min(data.len());
        inner[pos..pos + overlap].copy_from_slice(&data[..overlap]);
        inner.extend_from_slice(&data[overlap..]);
        buf.set_position((pos + data.len()) as u64);

        self.dirty = true;

        Ok(data.len())
    }

    pub async fn seek(&mut self, pos: u64) -> StorageResult<u64> {
        let buf = self.buffer().await?;
        buf.set_position(pos);

        Ok(pos)
    }

    pub async fn size(&mut self) -> StorageResult<u64> {
        let buf = self.buffer().await?;

        Ok(buf.get_ref().len() as u64)
    }

    /// Flushes the buffer through the save path when dirty, then drops it.
    pub async fn close(&mut self) -> StorageResult<()> {
        if self.closed {
            return Ok(());
        }

        if self.dirty {
            let body = match &self.buf {
                Some(buf) => buf.get_ref().clone(),
                None => Vec::new(),
            };
            debug!(pathname = %self.name, bytes = body.len(), "flush on close");
            backend::upload(self.client, &self.name, body).await?;
        }

        self.buf = None;
        self.dirty = false;
        self.closed = true;

        Ok(())
    }

    async fn buffer(&mut self) -> StorageResult<&mut Cursor<Vec<u8>>> {
        if self.closed {
            let meta = adapters::find_blob(self.client, &self.name)
                .await?
                .ok_or_else(|| {
                    StorageError::Value(format!(
                        "{} no longer exists, the handle cannot be reopened",
                        self.name
                    ))
                })?;

            let body = self.client.download(&meta.url).await?;
            self.buf = Some(Cursor::new(body));
            self.closed = false;
        } else if self.buf.is_none() {
            let body = match adapters::find_blob(self.client, &self.name).await? {
                Some(meta) => self.client.download(&meta.url).await?,
                None if self.is_writable() => Vec::new(),
                None => {
                    return Err(StorageError::Configuration(format!(
                        "no entry for: {}",
                        self.name
                    )))
                }
            };

            self.buf = Some(Cursor::new(body));
        }

        Ok(self.buf.as_mut().expect("buffer is populated"))
    }
}
