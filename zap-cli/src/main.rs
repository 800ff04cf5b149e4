//! CLI for MicroPython boards on a serial link.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod board;
mod repl;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "zap", version, about = "MicroPython CLI tool")]
struct Cli {
    #[command(flatten)]
    link: board::LinkArgs,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a file.
    Cat {
        /// File on the device.
        file: String,
    },

    /// Change directory.
    Cd {
        /// Directory on the device.
        path: String,
    },

    /// Copy a file from the device.
    Get {
        /// Local destination.
        dst: String,
        /// File on the device (defaults to DST).
        src: Option<String>,
    },

    /// List files.
    Ls {
        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Make a directory.
    Mkdir {
        /// Directory to create on the device.
        dir: String,
    },

    /// Copy a file to the device.
    Put {
        /// Destination on the device.
        dst: String,
        /// Local file (defaults to DST).
        src: Option<String>,
    },

    /// Print the working directory.
    Pwd,

    /// Perform a soft reboot.
    Reboot,

    /// Open the MicroPython REPL.
    Repl,

    /// Delete a file.
    Rm {
        /// File on the device.
        file: String,
    },

    /// Remove a directory.
    Rmdir {
        /// Directory on the device.
        dir: String,
    },

    /// Copy all files in a local directory to the device.
    Upload {
        /// Local directory.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Execute code on the device and print its output.
    Exec(board::ExecArgs),

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// One entry per line.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = cli.dispatch() {
        eprintln!("zap: {e:#}");
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber. `ZAP_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("ZAP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        let link = &self.link;
        match self.command {
            Command::Cat { file } => board::cat(link, &file),
            Command::Cd { path } => board::cd(link, &path),
            Command::Get { dst, src } => {
                let src = src.unwrap_or_else(|| dst.clone());
                board::get(link, &dst, &src)
            }
            Command::Ls { format } => board::ls(link, format),
            Command::Mkdir { dir } => board::mkdir(link, &dir),
            Command::Put { dst, src } => {
                let src = src.unwrap_or_else(|| dst.clone());
                board::put(link, &dst, &src)
            }
            Command::Pwd => board::pwd(link),
            Command::Reboot => board::reboot(link),
            Command::Repl => repl::run(link),
            Command::Rm { file } => board::rm(link, &file),
            Command::Rmdir { dir } => board::rmdir(link, &dir),
            Command::Upload { dir } => board::upload(link, &dir),
            Command::Exec(args) => board::exec(link, &args),
            Command::Completion { shell } => {
                clap_complete::generate(shell, &mut Self::command(), "zap", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}
