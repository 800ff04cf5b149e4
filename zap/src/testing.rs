//! In-memory stand-in for a MicroPython board, used by unit tests.
//!
//! Emulates the REPL side of the link: friendly/raw mode switching, the raw
//! prompt and `OK` acknowledgement, EOT-delimited output streams, soft
//! reboot, and a tiny filesystem driven by the snippets in
//! [`zap_proto::snippet`].

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io::{self, Read, Write};

use zap_proto::{ENTER_RAW, EOT, EXIT_RAW, INTERRUPT, chunk};

/// Scripted `(stdout, stderr)` for one snippet.
type Reply = (Vec<u8>, Vec<u8>);

/// Fake board transport.
#[derive(Debug)]
pub(crate) struct FakeBoard {
    /// Raw REPL active.
    raw: bool,
    /// Snippet being received in raw mode.
    pending: Vec<u8>,
    /// Bytes waiting to be read by the host.
    out: VecDeque<u8>,
    /// Files by absolute path.
    files: BTreeMap<String, Vec<u8>>,
    /// Directories by absolute path (root implied).
    dirs: BTreeSet<String>,
    /// Working directory.
    cwd: String,
    /// Open `_f` for reading: `(path, offset)`.
    reader: Option<(String, usize)>,
    /// Open `_f` for writing.
    writer: Option<String>,
    /// Every snippet executed, in order.
    executed: Vec<String>,
    /// Everything the host wrote.
    written: Vec<u8>,
    /// Fixed replies for exact snippets.
    scripted: HashMap<String, Reply>,
    /// Acknowledge the next snippet with garbage instead of `OK`.
    reject_next: bool,
    /// Never answer anything.
    muted: bool,
}

impl FakeBoard {
    pub(crate) fn new() -> Self {
        Self {
            raw: false,
            pending: Vec::new(),
            out: VecDeque::new(),
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            cwd: "/".to_owned(),
            reader: None,
            writer: None,
            executed: Vec::new(),
            written: Vec::new(),
            scripted: HashMap::new(),
            reject_next: false,
            muted: false,
        }
    }

    pub(crate) fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        self.files.insert(path.to_owned(), data.to_vec());
        self
    }

    pub(crate) fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(path.to_owned());
        self
    }

    /// Answers `code` with the given streams instead of interpreting it.
    pub(crate) fn script(mut self, code: &str, stdout: &[u8], stderr: &[u8]) -> Self {
        self.scripted
            .insert(code.to_owned(), (stdout.to_vec(), stderr.to_vec()));
        self
    }

    pub(crate) fn mute(&mut self) {
        self.muted = true;
    }

    pub(crate) fn reject_next(&mut self) {
        self.reject_next = true;
    }

    pub(crate) fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub(crate) fn has_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    pub(crate) const fn is_raw(&self) -> bool {
        self.raw
    }

    pub(crate) fn executed(&self) -> &[String] {
        &self.executed
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }

    /// Queues bytes for the host.
    fn emit(&mut self, data: &[u8]) {
        if !self.muted {
            self.out.extend(data);
        }
    }

    fn feed(&mut self, byte: u8) {
        match byte {
            ENTER_RAW => {
                self.raw = true;
                self.pending.clear();
                self.emit(b"raw REPL; CTRL-B to exit\r\n>");
            }
            EXIT_RAW if self.raw => {
                self.raw = false;
                self.pending.clear();
                self.emit(b"\r\nMicroPython v1.22.0; fake board\r\n>>> ");
            }
            INTERRUPT if !self.raw => self.emit(b"\r\nKeyboardInterrupt\r\n>>> "),
            EOT if self.raw && self.pending.is_empty() => self.soft_reboot(),
            EOT if self.raw => self.run(),
            _ if self.raw => self.pending.push(byte),
            _ => {}
        }
    }

    fn soft_reboot(&mut self) {
        self.reader = None;
        self.writer = None;
        self.cwd = "/".to_owned();
        self.emit(b"OK\r\nMPY: soft reboot\r\nraw REPL; CTRL-B to exit\r\n>");
    }

    fn run(&mut self) {
        let code = String::from_utf8_lossy(&std::mem::take(&mut self.pending)).into_owned();
        self.executed.push(code.clone());
        if self.reject_next {
            self.reject_next = false;
            self.emit(b"NO");
            return;
        }
        let (stdout, stderr) = match self.scripted.get(&code) {
            Some(reply) => reply.clone(),
            None => self.interpret(&code),
        };
        self.emit(b"OK");
        self.emit(&stdout);
        self.emit(&[EOT]);
        self.emit(&stderr);
        self.emit(&[EOT]);
        self.emit(b">");
    }

    fn resolve(&self, name: &str) -> String {
        if name.starts_with('/') {
            name.to_owned()
        } else if self.cwd == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.cwd)
        }
    }

    fn is_dir(&self, path: &str) -> bool {
        path == "/" || self.dirs.contains(path)
    }

    fn interpret(&mut self, code: &str) -> Reply {
        let ok = |out: &[u8]| (out.to_vec(), Vec::new());

        if code.starts_with("import uos\nuos.chdir(") {
            let path = self.resolve(&literal(code));
            if !self.is_dir(&path) {
                return os_error(2, "ENOENT");
            }
            self.cwd = path;
            ok(b"")
        } else if code.starts_with("import uos\nprint(uos.getcwd()") {
            ok(self.cwd.as_bytes())
        } else if code.contains("uos.ilistdir('.')") {
            let prefix = if self.cwd == "/" {
                "/".to_owned()
            } else {
                format!("{}/", self.cwd)
            };
            let mut out = Vec::new();
            let dirs = self.dirs.iter().map(|d| (d, true));
            let files = self.files.keys().map(|f| (f, false));
            for (path, is_dir) in dirs.chain(files) {
                if let Some(name) = path.strip_prefix(&prefix)
                    && !name.contains('/')
                {
                    out.extend_from_slice(name.as_bytes());
                    if is_dir {
                        out.push(b'/');
                    }
                    out.extend_from_slice(b"\r\n");
                }
            }
            ok(&out)
        } else if code.starts_with("import uos\nuos.mkdir(") {
            let path = self.resolve(&literal(code));
            if self.is_dir(&path) || self.files.contains_key(&path) {
                return os_error(17, "EEXIST");
            }
            self.dirs.insert(path);
            ok(b"")
        } else if code.starts_with("import uos\nuos.rmdir(") {
            let path = self.resolve(&literal(code));
            if self.dirs.remove(&path) {
                ok(b"")
            } else {
                os_error(2, "ENOENT")
            }
        } else if code.starts_with("import uos\nuos.remove(") {
            let path = self.resolve(&literal(code));
            if self.files.remove(&path).is_some() {
                ok(b"")
            } else {
                os_error(2, "ENOENT")
            }
        } else if code.starts_with("with open(") {
            let path = self.resolve(&literal(code));
            match self.files.get(&path) {
                Some(data) => ok(data),
                None => os_error(2, "ENOENT"),
            }
        } else if code.starts_with("from ubinascii import b2a_base64") {
            let path = self.resolve(&literal(code));
            if !self.files.contains_key(&path) {
                return os_error(2, "ENOENT");
            }
            self.reader = Some((path, 0));
            ok(b"")
        } else if let Some(rest) = code.strip_prefix("d=str(b2a_base64(_f.read(") {
            let size: usize = rest
                .split(')')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            let Some((path, offset)) = self.reader.as_mut() else {
                return name_error("_f");
            };
            let data = &self.files[path.as_str()];
            let end = (*offset + size).min(data.len());
            let text = chunk::encode(&data[*offset..end]);
            *offset = end;
            ok(text.as_bytes())
        } else if code.starts_with("from ubinascii import a2b_base64") {
            let path = self.resolve(&literal(code));
            self.files.insert(path.clone(), Vec::new());
            self.writer = Some(path);
            ok(b"")
        } else if let Some(rest) = code.strip_prefix("_w(\"") {
            let Some(path) = self.writer.clone() else {
                return name_error("_w");
            };
            let encoded = rest.split('"').next().unwrap_or_default();
            let data = chunk::decode(encoded.as_bytes()).unwrap_or_default();
            self.files.entry(path).or_default().extend(data);
            ok(b"")
        } else if code == "_f.close()" {
            self.reader = None;
            self.writer = None;
            ok(b"")
        } else {
            ok(b"")
        }
    }
}

impl Read for FakeBoard {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.out.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"));
        }
        let n = buf.len().min(self.out.len());
        for (slot, byte) in buf.iter_mut().zip(self.out.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for FakeBoard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        for &byte in buf {
            self.feed(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Extracts the first double-quoted literal in `code`, undoing the
/// escapes applied by [`zap_proto::snippet::str_literal`].
fn literal(code: &str) -> String {
    let mut chars = code.chars().skip_while(|&c| c != '"').skip(1);
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('x') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    if let Some(c) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        out.push(c);
                    }
                }
                Some(other) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }
    out
}

fn traceback(last: &str) -> Reply {
    let text = format!(
        "Traceback (most recent call last):\r\n  File \"<stdin>\", line 2, in <module>\r\n{last}\r\n"
    );
    (Vec::new(), text.into_bytes())
}

fn os_error(errno: u32, name: &str) -> Reply {
    traceback(&format!("OSError: [Errno {errno}] {name}"))
}

fn name_error(name: &str) -> Reply {
    traceback(&format!("NameError: name '{name}' isn't defined"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_round_trips_escaping() {
        let path = "we\"ird\\na'me\n.py";
        let code = zap_proto::snippet::remove(path);
        assert_eq!(literal(&code), path);
    }
}
