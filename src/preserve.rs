//! Competition archiving.
//!
//! Downloads every challenge of the logged-in event into a local tree that
//! [`crate::archive`] can rank later:
//!
//! ```text
//! <out>/instance.json
//! <out>/<category>/<name>/description
//! <out>/<category>/<name>/challenge.json
//! <out>/<category>/<name>/<attachments...>
//! ```

use crate::archive::{CHALLENGE_FILE, DESCRIPTION_FILE, INSTANCE_FILE};
use crate::client::{attachment_filename, ChallengeInfo, CtfdClient};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Archive every challenge of the event into `out_dir`.
///
/// Returns how many challenges were preserved. The root `instance.json`
/// marker is written first so a partially preserved tree is still
/// recognizable as an archive.
pub fn preserve(client: &CtfdClient, out_dir: &Path) -> Result<usize> {
    let info = client.info()?;
    let challenges = client.fetch_challenges()?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let marker = serde_json::json!({
        "name": info.name,
        "url": client.url(),
        "start": info.start,
        "end": info.end,
    });
    fs::write(
        out_dir.join(INSTANCE_FILE),
        serde_json::to_string_pretty(&marker)?,
    )
    .with_context(|| format!("failed to write {}", INSTANCE_FILE))?;

    for challenge in &challenges {
        preserve_challenge(client, challenge, out_dir).with_context(|| {
            format!(
                "failed to preserve {}/{}",
                challenge.category, challenge.name
            )
        })?;
        println!("preserved {}/{}", challenge.category, challenge.name);
    }

    Ok(challenges.len())
}

/// Write one challenge's metadata and attachments.
fn preserve_challenge(
    client: &CtfdClient,
    challenge: &ChallengeInfo,
    out_dir: &Path,
) -> Result<()> {
    let dir = out_dir.join(&challenge.category).join(&challenge.name);
    fs::create_dir_all(&dir)?;

    fs::write(dir.join(DESCRIPTION_FILE), &challenge.description)?;
    fs::write(
        dir.join(CHALLENGE_FILE),
        serde_json::to_string_pretty(challenge)?,
    )?;

    for file in &challenge.files {
        let out = dir.join(attachment_filename(file));
        client.download_attachment(file, &out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CtfdClient;
    use tempfile::TempDir;

    fn challenge(category: &str, name: &str) -> ChallengeInfo {
        ChallengeInfo {
            id: 1,
            name: name.to_string(),
            value: 100,
            description: "find the flag".to_string(),
            attribution: None,
            category: category.to_string(),
            kind: "standard".to_string(),
            files: Vec::new(),
            solves: 0,
            solved: false,
        }
    }

    #[test]
    fn test_preserve_challenge_tree_shape() {
        let tmp = TempDir::new().unwrap();
        // No attachments, so no network is touched
        let client = CtfdClient::new("https://ctf.example.com", None).unwrap();

        preserve_challenge(&client, &challenge("pwn", "heapfun"), tmp.path()).unwrap();

        let dir = tmp.path().join("pwn/heapfun");
        assert_eq!(
            std::fs::read_to_string(dir.join(DESCRIPTION_FILE)).unwrap(),
            "find the flag"
        );
        let meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join(CHALLENGE_FILE)).unwrap())
                .unwrap();
        assert_eq!(meta["name"], "heapfun");
        assert_eq!(meta["type"], "standard");
    }
}
