//! ctfgrab - CTFd companion CLI
//!
//! Log into a CTFd instance, archive its challenges locally, and triage the
//! archive by tag preference.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use ctfgrab::archive::Archive;
use ctfgrab::client::{CtfdClient, LoginOutcome};
use ctfgrab::config::SavedData;
use ctfgrab::ranking::{Preferences, ScoreEntry};
use ctfgrab::types::Tag;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ctfgrab")]
#[command(author, version, about = "CTFd companion: archive competitions and triage challenges")]
#[command(long_about = "
ctfgrab talks to a CTFd instance to authenticate, archive an entire
competition locally, and rank the archived challenges by how well their
files match the tags you care about.

EXAMPLES:
    ctfgrab login                         # authenticate against an instance
    ctfgrab preserve ./dump               # archive every challenge
    ctfgrab rank ./dump elf,source,*archive
    ctfgrab tags ./dump/pwn/heapfun/heapfun.elf
")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Log into a CTFd instance
    Login,
    /// Show current CTF info
    Info,
    /// Archive every challenge of the event locally
    Preserve {
        /// Directory to preserve the competition into
        out_dir: PathBuf,
    },
    /// Rank a preserved archive by tag preference
    Rank {
        /// Path to a preserved archive
        archive: PathBuf,
        /// Comma-separated tags, most wanted first; prefix with * to exclude
        preferences: String,
    },
    /// Show the tags of a single file
    Tags {
        /// File to analyse
        file: PathBuf,
    },
    /// Open a workspace shell for a challenge
    Workspace {
        /// Challenge id on the instance
        id: u64,
    },
}

// ANSI color codes (Catppuccin Mocha accents)
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const STRIKE: &str = "\x1b[9m";
const MAUVE: &str = "\x1b[38;2;203;166;247m";
const RED: &str = "\x1b[38;2;243;139;168m";
const GREEN: &str = "\x1b[38;2;166;227;161m";
const YELLOW: &str = "\x1b[38;2;249;226;175m";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let use_color = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Cmd::Login => cmd_login(use_color),
        Cmd::Info => cmd_info(use_color),
        Cmd::Preserve { out_dir } => cmd_preserve(&out_dir, use_color),
        Cmd::Rank {
            archive,
            preferences,
        } => cmd_rank(&archive, &preferences, use_color),
        Cmd::Tags { file } => cmd_tags(&file),
        Cmd::Workspace { id } => cmd_workspace(id),
    }
}

fn cmd_login(use_color: bool) -> Result<()> {
    let url = prompt("enter CTFd URL", use_color)?;
    let username = prompt("enter username", use_color)?;
    let password = rpassword::prompt_password(if use_color {
        format!("{MAUVE}enter password{RESET}: ")
    } else {
        "enter password: ".to_string()
    })?;

    let mut client = CtfdClient::new(&url, None)?;
    match client.login(&username, &password)? {
        LoginOutcome::Success => {
            SavedData {
                url: Some(client.url().to_string()),
                cookies: client.cookies().map(|c| c.to_string()),
            }
            .save()?;
            println!("{}", paint(use_color, GREEN, "authentication successful"));
        }
        LoginOutcome::BadCredentials => {
            println!("{}", paint(use_color, RED, "authentication failed"));
            println!("{}", paint(use_color, DIM, "reason: incorrect credentials."));
        }
        LoginOutcome::SessionUnavailable => {
            println!("{}", paint(use_color, RED, "authentication failed"));
            println!(
                "{}",
                paint(
                    use_color,
                    DIM,
                    "reason: a session or a CSRF token could not be gathered."
                )
            );
        }
    }
    Ok(())
}

fn cmd_info(use_color: bool) -> Result<()> {
    let saved = SavedData::load()?;
    if saved.url.is_none() {
        println!(
            "{}",
            paint(
                use_color,
                RED,
                "please log in at least once to view CTF details."
            )
        );
        return Ok(());
    }

    let client = CtfdClient::from_saved(&saved)?;
    let info = client.info()?;

    println!("{}", paint(use_color, BOLD, &info.name));
    if info.user.id != 0 {
        let line = format!(
            "[{}] {} <{}>",
            info.user.id,
            info.user.name.as_deref().unwrap_or("?"),
            info.user.email.as_deref().unwrap_or("?"),
        );
        println!("{}", paint(use_color, MAUVE, &line));
    } else {
        println!(
            "{}",
            paint(
                use_color,
                YELLOW,
                "not logged in; account details unavailable."
            )
        );
    }
    Ok(())
}

fn cmd_preserve(out_dir: &Path, use_color: bool) -> Result<()> {
    let saved = SavedData::load()?;
    let client = CtfdClient::from_saved(&saved)?;

    let count = ctfgrab::preserve::preserve(&client, out_dir)?;
    let summary = format!("preserved {} challenges into {}", count, out_dir.display());
    println!("{}", paint(use_color, GREEN, &summary));
    Ok(())
}

fn cmd_rank(archive: &Path, preferences: &str, use_color: bool) -> Result<()> {
    let prefs = Preferences::parse(preferences).map_err(|err| {
        let valid: Vec<&str> = Tag::ALL.iter().map(Tag::as_str).collect();
        anyhow!("{err}; valid tags: {}", valid.join(", "))
    })?;

    let ranked = Archive::open(archive)?.rank(&prefs)?;
    if ranked.is_empty() {
        println!("no challenges found in {}", archive.display());
        return Ok(());
    }

    for entry in &ranked {
        print_entry(entry, use_color);
    }
    Ok(())
}

fn cmd_tags(file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("file does not exist: {}", file.display());
    }

    let analysis = ctfgrab::analyse(file)?;
    for tag in ctfgrab::tags_for(&analysis) {
        println!("{tag}");
    }
    Ok(())
}

fn cmd_workspace(id: u64) -> Result<()> {
    let saved = SavedData::load()?;
    let client = CtfdClient::from_saved(&saved)?;
    let challenge = client.fetch_challenge(id)?;
    ctfgrab::workspace::open_shell(&client, &challenge)
}

/// One ranked line: `[score] category/name (tag, tag)`, exclusions demoted.
fn print_entry(entry: &ScoreEntry, use_color: bool) {
    let tags = entry
        .tags
        .iter()
        .map(Tag::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if !use_color {
        let marker = if entry.excluded { " [excluded]" } else { "" };
        println!("[{:.2}] {}{} ({})", entry.score, entry.name, marker, tags);
    } else if entry.excluded {
        println!(
            "{DIM}{STRIKE}[{:.2}] {} ({}){RESET}",
            entry.score, entry.name, tags
        );
    } else {
        println!(
            "{MAUVE}[{:.2}]{RESET} {BOLD}{}{RESET} {DIM}({}){RESET}",
            entry.score, entry.name, tags
        );
    }
}

fn prompt(label: &str, use_color: bool) -> Result<String> {
    print!("{}: ", paint(use_color, MAUVE, label));
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn paint(use_color: bool, code: &str, text: &str) -> String {
    if use_color {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}
