//! Board commands: cat, cd, get, ls, mkdir, put, pwd, reboot, rm, rmdir,
//! upload, exec.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use zap::{LinkConfig, SerialTransport, Session, SessionConfig};

use crate::OutputFormat;

/// Serial link options shared by every command.
#[derive(clap::Args)]
pub struct LinkArgs {
    /// Serial device name of the MicroPython board.
    #[arg(short = 'd', long, env = "PYBOARD_DEVICE", global = true)]
    pub device: Option<String>,

    /// Baud rate of the serial device.
    #[arg(
        short = 'b',
        long = "baudrate",
        env = "PYBOARD_BAUDRATE",
        default_value_t = zap::DEFAULT_BAUD_RATE,
        global = true
    )]
    pub baud_rate: u32,

    /// Milliseconds to wait for each byte from the board.
    #[arg(long, env = "ZAP_TIMEOUT_MS", default_value_t = 500, global = true)]
    pub timeout_ms: u64,

    /// Bytes per round trip when copying files.
    #[arg(long, env = "ZAP_CHUNK_SIZE", default_value_t = zap::DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,
}

impl LinkArgs {
    /// Serial settings for the selected device.
    pub fn link_config(&self) -> Result<LinkConfig> {
        let device = self
            .device
            .as_deref()
            .context("no serial device; use --device or set PYBOARD_DEVICE")?;
        Ok(LinkConfig::new(device)
            .baud_rate(self.baud_rate)
            .read_timeout(Duration::from_millis(self.timeout_ms)))
    }

    /// Opens the device and connects in friendly mode.
    pub fn connect(&self) -> Result<Session<SerialTransport>> {
        let cfg = self.link_config()?;
        let link = SerialTransport::open(&cfg)
            .with_context(|| format!("cannot open {}", cfg.device))?;
        let tuning = SessionConfig::default().chunk_size(self.chunk_size);
        Ok(Session::connect_with(link, tuning)?)
    }
}

/// Arguments for `zap exec`.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct ExecArgs {
    /// Code to run.
    pub code: Option<String>,

    /// Run the contents of a local script instead.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,
}

/// Connects, enters raw mode, runs `op`, and leaves raw mode again.
///
/// Leaving raw mode is attempted even when `op` fails; the error from
/// `op` is the one reported.
fn with_raw<R>(
    link: &LinkArgs,
    op: impl FnOnce(&mut Session<SerialTransport>) -> zap::Result<R>,
) -> Result<R> {
    let mut session = link.connect()?;
    session.enter_raw().context("cannot enter raw REPL")?;
    let result = op(&mut session);
    if let Err(e) = session.exit_raw() {
        tracing::warn!(error = %e, "could not leave raw REPL");
    }
    Ok(result?)
}

pub fn cat(link: &LinkArgs, file: &str) -> Result<()> {
    let stdout = std::io::stdout();
    with_raw(link, |s| s.cat(file, &mut stdout.lock()))
}

pub fn cd(link: &LinkArgs, path: &str) -> Result<()> {
    with_raw(link, |s| s.cd(path))
}

pub fn get(link: &LinkArgs, dst: &str, src: &str) -> Result<()> {
    let bytes = with_raw(link, |s| s.get(dst, src))?;
    tracing::info!(src, dst, bytes, "copied from device");
    Ok(())
}

pub fn ls(link: &LinkArgs, format: OutputFormat) -> Result<()> {
    let entries = with_raw(link, Session::ls)?;
    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{entry}");
    }
    Ok(())
}

pub fn mkdir(link: &LinkArgs, dir: &str) -> Result<()> {
    with_raw(link, |s| s.mkdir(dir))
}

pub fn put(link: &LinkArgs, dst: &str, src: &str) -> Result<()> {
    let bytes = with_raw(link, |s| s.put(dst, src))?;
    tracing::info!(src, dst, bytes, "copied to device");
    Ok(())
}

pub fn pwd(link: &LinkArgs) -> Result<()> {
    let cwd = with_raw(link, Session::pwd)?;
    println!("{cwd}");
    Ok(())
}

pub fn reboot(link: &LinkArgs) -> Result<()> {
    with_raw(link, |s| s.soft_reboot().map(drop))
}

pub fn rm(link: &LinkArgs, file: &str) -> Result<()> {
    with_raw(link, |s| s.rm(file))
}

pub fn rmdir(link: &LinkArgs, dir: &str) -> Result<()> {
    with_raw(link, |s| s.rmdir(dir))
}

pub fn upload(link: &LinkArgs, dir: &Path) -> Result<()> {
    let count = with_raw(link, |s| {
        s.upload(dir, |name| println!("Uploading {name} ..."))
    })?;
    eprintln!("Uploaded {count} files");
    Ok(())
}

pub fn exec(link: &LinkArgs, args: &ExecArgs) -> Result<()> {
    let code = match (&args.code, &args.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read script: {}", path.display()))?,
        (None, None) => unreachable!("clap validation"),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    with_raw(link, |s| s.exec_into(&code, &mut out))?;
    out.flush()?;
    Ok(())
}
