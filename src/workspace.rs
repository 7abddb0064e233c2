//! Per-challenge workspace shells.
//!
//! Each challenge gets a directory under `~/ctf-workspaces/<event>/...` with
//! its attachments downloaded on first entry, then an interactive bash is
//! spawned inside it with a prompt naming the event, category and challenge.

use crate::client::{attachment_filename, ChallengeInfo, CtfdClient, CtfdInfo};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const WORKSPACES_DIR: &str = "ctf-workspaces";

// Catppuccin Mocha accents, matching the CLI scheme
const MAUVE: &str = "\x1b[38;2;203;166;247m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Workspace directory for one challenge.
///
/// The event name is slugged since CTF names are rarely valid paths.
pub fn workspace_dir(info: &CtfdInfo, challenge: &ChallengeInfo) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(WORKSPACES_DIR)
        .join(slugify(&info.name))
        .join(&challenge.category)
        .join(&challenge.name)
}

/// Open an interactive shell inside a challenge workspace.
///
/// Attachments are downloaded only when the workspace does not exist yet, so
/// work in progress is never overwritten.
pub fn open_shell(client: &CtfdClient, challenge: &ChallengeInfo) -> Result<()> {
    let info = client.info()?;
    let dir = workspace_dir(&info, challenge);

    let fresh = !dir.exists();
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    if fresh {
        for file in &challenge.files {
            let out = dir.join(attachment_filename(file));
            client.download_attachment(file, &out)?;
        }
    }

    let prompt = format!(
        "{MAUVE}{BOLD}[{}]{RESET}{MAUVE} {}/{}{RESET} $ ",
        info.name, challenge.category, challenge.name
    );

    let rc_path = std::env::temp_dir().join(format!("ctfgrab-rc-{}", std::process::id()));
    fs::write(
        &rc_path,
        format!(
            "[ -f ~/.bashrc ] && . ~/.bashrc; cd '{}'; export PS1='{}';\n",
            dir.display(),
            prompt
        ),
    )?;

    println!("{BOLD}{}{RESET}\n\n{MAUVE}{}{RESET}\n", challenge.name, challenge.description);

    let status = Command::new("bash")
        .arg("--rcfile")
        .arg(&rc_path)
        .arg("-i")
        .status()
        .context("failed to spawn bash")?;
    fs::remove_file(&rc_path).ok();

    if !status.success() {
        eprintln!("shell exited with {status}");
    }
    Ok(())
}

/// Lower-case, dash-separated slug of an event name.
fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
