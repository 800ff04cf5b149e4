//! Chunked file copy between the host and the board.
//!
//! Files move as a sequence of small snippets, each carrying one
//! base64-encoded chunk of [`SessionConfig::chunk_size`] raw bytes. A failed
//! transfer is not rolled back on either side.
//!
//! [`SessionConfig::chunk_size`]: crate::SessionConfig::chunk_size

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zap_proto::{chunk, snippet};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Copies the board file `remote` to the local file `local`.
    ///
    /// `local` is created or truncated. Chunks are requested until the
    /// board returns an empty one. Returns the number of bytes copied.
    pub fn get(&mut self, local: impl AsRef<Path>, remote: &str) -> Result<u64> {
        let local = local.as_ref();
        let mut file = File::create(local).map_err(|e| Error::local(local, e))?;

        self.exec(snippet::open_read(remote))?;
        let read = snippet::read_chunk(self.config().chunk_size);
        let mut total = 0u64;
        loop {
            let text = self.exec(&read)?;
            let data = chunk::decode(&text)?;
            if data.is_empty() {
                break;
            }
            file.write_all(&data).map_err(|e| Error::local(local, e))?;
            total += data.len() as u64;
            tracing::trace!(remote, bytes = total, "chunk received");
        }
        file.flush().map_err(|e| Error::local(local, e))?;

        tracing::debug!(remote, local = %local.display(), bytes = total, "download complete");
        Ok(total)
    }

    /// Copies the local file `local` to the board file `remote`.
    ///
    /// The remote file is created or truncated and closed once the last
    /// chunk is written. Returns the number of bytes copied.
    pub fn put(&mut self, remote: &str, local: impl AsRef<Path>) -> Result<u64> {
        let local = local.as_ref();
        let mut file = File::open(local).map_err(|e| Error::local(local, e))?;

        self.exec(snippet::open_write(remote))?;
        let chunk_size = self.config().chunk_size;
        let mut buf = Vec::with_capacity(chunk_size);
        let mut total = 0u64;
        loop {
            buf.clear();
            (&mut file)
                .take(chunk_size as u64)
                .read_to_end(&mut buf)
                .map_err(|e| Error::local(local, e))?;
            if buf.is_empty() {
                break;
            }
            self.exec(snippet::write_chunk(&chunk::encode(&buf)))?;
            total += buf.len() as u64;
            tracing::trace!(remote, bytes = total, "chunk sent");
        }
        self.exec(snippet::close())?;

        tracing::debug!(remote, local = %local.display(), bytes = total, "upload complete");
        Ok(total)
    }

    /// Copies every regular file directly inside `dir` to the board's
    /// working directory, under the same name.
    ///
    /// Files are sent in name order; `on_file` is called with each name
    /// before its transfer starts. Subdirectories and names that are not
    /// valid UTF-8 are skipped. Returns the number of files copied.
    pub fn upload(
        &mut self,
        dir: impl AsRef<Path>,
        mut on_file: impl FnMut(&str),
    ) -> Result<usize> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| Error::local(dir, e))? {
            let entry = entry.map_err(|e| Error::local(dir, e))?;
            let path = entry.path();
            let kind = entry.file_type().map_err(|e| Error::local(&path, e))?;
            if !kind.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => files.push((name, path)),
                Err(name) => tracing::warn!(?name, "skipping file with non UTF-8 name"),
            }
        }
        files.sort();

        for (name, path) in &files {
            on_file(name);
            self.put(name, path)?;
        }
        Ok(files.len())
    }
}
