//! Filesystem operations on the board.
//!
//! Every operation is one generated snippet run through
//! [`Session::exec`]; failures raised on the board come back as
//! [`Error::Remote`](crate::Error::Remote).

use std::io::Write;

use serde::Serialize;
use zap_proto::snippet;

use crate::error::Result;
use crate::session::Session;
use crate::transport::Transport;

/// One entry of a board directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct DirEntry {
    /// Entry name, without any trailing slash.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl std::fmt::Display for DirEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dir {
            write!(f, "{}/", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

impl<T: Transport> Session<T> {
    /// Writes the contents of the text file `path` to `sink` as it arrives.
    pub fn cat(&mut self, path: &str, sink: &mut impl Write) -> Result<()> {
        self.exec_into(snippet::cat(path, self.config().chunk_size), sink)
    }

    /// Changes the board's working directory.
    ///
    /// The working directory lasts until the next soft reboot.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        self.exec(snippet::chdir(path)).map(drop)
    }

    /// Returns the board's working directory.
    pub fn pwd(&mut self) -> Result<String> {
        let out = self.exec(snippet::getcwd())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Lists the board's working directory.
    pub fn ls(&mut self) -> Result<Vec<DirEntry>> {
        let out = self.exec(snippet::listdir())?;
        Ok(parse_listing(&out))
    }

    /// Creates a directory.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        self.exec(snippet::mkdir(path)).map(drop)
    }

    /// Removes an empty directory.
    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        self.exec(snippet::rmdir(path)).map(drop)
    }

    /// Removes a file.
    pub fn rm(&mut self, path: &str) -> Result<()> {
        self.exec(snippet::remove(path)).map(drop)
    }
}

/// Parses the one-entry-per-line output of [`snippet::listdir`].
fn parse_listing(out: &[u8]) -> Vec<DirEntry> {
    String::from_utf8_lossy(out)
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_suffix('/') {
            Some(name) => DirEntry {
                name: name.to_owned(),
                is_dir: true,
            },
            None => DirEntry {
                name: line.to_owned(),
                is_dir: false,
            },
        })
        .collect()
}
