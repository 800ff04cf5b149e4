//! Generated interpreter source for remote operations.
//!
//! Each function returns one snippet to run in the raw REPL. Snippets that
//! take a path embed it through [`str_literal`]. File transfers bind two
//! interpreter globals, `_f` (the open remote file) and `_w` (the upload
//! write helper), which live until the next soft reboot.

use std::fmt::Write as _;

use crate::wire::DIR_FLAG;

/// Quotes `s` as an interpreter string literal.
///
/// Backslashes, quotes and control characters are escaped so that no path
/// can terminate the literal early or inject code into the snippet.
pub fn str_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c) & 0xff);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Changes the board's working directory.
pub fn chdir(path: &str) -> String {
    format!("import uos\nuos.chdir({})", str_literal(path))
}

/// Prints the board's working directory with no trailing newline.
pub fn getcwd() -> String {
    "import uos\nprint(uos.getcwd(),end='')".to_owned()
}

/// Prints one line per entry of the working directory, directories
/// suffixed with `/`.
pub fn listdir() -> String {
    format!(
        "import uos\nfor e in uos.ilistdir('.'):\n\tprint(e[0]+('/' if e[1]&{DIR_FLAG:#x} else ''))\n"
    )
}

/// Creates a directory.
pub fn mkdir(path: &str) -> String {
    format!("import uos\nuos.mkdir({})", str_literal(path))
}

/// Removes an empty directory.
pub fn rmdir(path: &str) -> String {
    format!("import uos\nuos.rmdir({})", str_literal(path))
}

/// Removes a file.
pub fn remove(path: &str) -> String {
    format!("import uos\nuos.remove({})", str_literal(path))
}

/// Prints the contents of a text file, `chunk_size` characters at a time.
pub fn cat(path: &str, chunk_size: usize) -> String {
    format!(
        "with open({}) as f:\n\twhile True:\n\t\tb = f.read({chunk_size})\n\t\tif not b:\n\t\t\tbreak\n\t\tprint(b, end='')",
        str_literal(path)
    )
}

/// Opens `path` for binary reading as `_f`.
pub fn open_read(path: &str) -> String {
    format!(
        "from ubinascii import b2a_base64\n_f=open({},'rb')\n",
        str_literal(path)
    )
}

/// Reads up to `chunk_size` bytes from `_f` and prints them base64-encoded
/// with no trailing newline. Prints nothing at end of file.
pub fn read_chunk(chunk_size: usize) -> String {
    format!("d=str(b2a_base64(_f.read({chunk_size})),'ascii')\nprint(d.strip(),end='')\n")
}

/// Opens `path` for binary writing as `_f` and binds the `_w` helper.
pub fn open_write(path: &str) -> String {
    format!(
        "from ubinascii import a2b_base64\n_f=open({},'wb')\n_w=lambda x:_f.write(a2b_base64(x))\n",
        str_literal(path)
    )
}

/// Writes one base64-encoded chunk through `_w`.
///
/// `encoded` must come from [`crate::chunk::encode`]; it is embedded
/// without escaping.
pub fn write_chunk(encoded: &str) -> String {
    format!("_w(\"{encoded}\")\n")
}

/// Closes `_f`.
pub fn close() -> String {
    "_f.close()".to_owned()
}
