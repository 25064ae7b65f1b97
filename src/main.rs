use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use desktopfile::{DesktopFile, Entry, ExecTokenizer};

#[derive(Parser)]
#[command(name = "desktopfile")]
#[command(about = "Inspect and edit freedesktop desktop entry files")]
struct Cli {
    /// Log parsing and I/O details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the file as it would be written back
    Dump { path: PathBuf },
    /// Print the value of a single entry
    Get {
        path: PathBuf,
        section: String,
        key: String,
        /// Print the value as a `;`-separated list, one element per line
        #[arg(long)]
        list: bool,
    },
    /// Set an entry and write the result
    Set {
        path: PathBuf,
        section: String,
        key: String,
        value: String,
        /// Write to this path instead of in place; `-` writes to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split an Exec-like entry into its arguments
    Exec {
        path: PathBuf,
        #[arg(long, default_value = "Desktop Entry")]
        section: String,
        #[arg(long, default_value = "Exec")]
        key: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();

    match args.command {
        Command::Dump { path } => {
            let file = open(&path)?;
            file.write_to(&mut stdout)?;
        }
        Command::Get {
            path,
            section,
            key,
            list,
        } => {
            let file = open(&path)?;
            let entry = lookup(&file, &section, &key)?;

            if list {
                for item in entry.as_list() {
                    writeln!(stdout, "{item}")?;
                }
            } else {
                writeln!(stdout, "{}", entry.value())?;
            }
        }
        Command::Set {
            path,
            section,
            key,
            value,
            output,
        } => {
            let mut file = open(&path)?;
            let replaced = file.set_entry(&section, Entry::new(key, value))?;
            tracing::debug!(replaced, "updated entry");

            match output {
                Some(out) if out.as_os_str() == "-" => file.write_to(&mut stdout)?,
                Some(out) => file
                    .save_to(&out)
                    .with_context(|| format!("writing {}", out.display()))?,
                None => file.save().with_context(|| format!("writing {}", path.display()))?,
            }

            file.validate()?;
        }
        Command::Exec { path, section, key } => {
            let file = open(&path)?;
            let entry = lookup(&file, &section, &key)?;

            for token in ExecTokenizer::new(entry.value()) {
                writeln!(stdout, "{}\t{}\t{}", token.start(), token.len(), token.text())?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "desktopfile=debug" } else { "desktopfile=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn open(path: &Path) -> Result<DesktopFile> {
    DesktopFile::open(path).with_context(|| format!("reading {}", path.display()))
}

fn lookup<'a>(file: &'a DesktopFile, section: &str, key: &str) -> Result<&'a Entry> {
    file.section(section)?
        .get(key)
        .with_context(|| format!("no {key:?} entry in [{section}]"))
}
