//! # ctfgrab - CTFd companion with challenge triage
//!
//! This library backs the `ctfgrab` CLI: it archives CTFd competitions
//! locally and triages the result by classifying every downloaded file and
//! ranking challenges against a user-supplied tag preference.
//!
//! ## Classification
//!
//! A file is sniffed from its raw bytes ([`analyse`]): DOS/Windows
//! executables by the `MZ` stub (with `mscoree.dll` marking .NET), JVM class
//! files by `0xCAFEBABE`, ELF images by their magic, everything else by a
//! binary-vs-text heuristic. The analysis maps to an ordered tag list
//! ([`tags_for`]); a challenge's score is the mean preference weight of its
//! deduplicated tags.
//!
//! ## Usage
//!
//! ```no_run
//! use ctfgrab::{Archive, Preferences};
//!
//! let prefs = Preferences::parse("elf,source,*archive").unwrap();
//! let archive = Archive::open(std::path::Path::new("./preserved")).unwrap();
//! for entry in archive.rank(&prefs).unwrap() {
//!     println!("[{:.2}] {}", entry.score, entry.name);
//! }
//! ```

pub mod analysis;
pub mod archive;
pub mod client;
pub mod config;
pub mod preserve;
pub mod ranking;
pub mod tags;
pub mod types;
pub mod workspace;

pub use analysis::{analyse, analyse_bytes};
pub use archive::Archive;
pub use ranking::{rank, Preferences, ScoreEntry};
pub use tags::tags_for;
pub use types::{AssemblyKind, FileAnalysis, FileKind, MagicFamily, Tag};
