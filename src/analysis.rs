//! File format sniffing.
//!
//! Classifies a file's raw bytes into the categories in [`crate::types`]:
//! binary vs text, managed vs unmanaged executable, and leading magic-number
//! family. Classification is shallow and best-effort; nothing here parses
//! object files beyond their first bytes.

use crate::types::{AssemblyKind, FileAnalysis, FileKind, MagicFamily};
use anyhow::{Context, Result};
use memchr::memmem;
use std::fs;
use std::path::Path;

/// Extensions that are binary regardless of content.
const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "elf", "class", "jar", "o", "a", "bin", "pyc", "png", "jpg", "jpeg", "gif",
    "zip", "tar", "gz", "xz", "bz2", "7z", "lzma", "img", "iso", "blend", "glb",
];

/// Extensions that are text regardless of content.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "c", "h", "cpp", "c++", "hpp", "h++", "cs", "js", "ts", "py", "sh", "zsh", "fish",
    "rs", "json", "xml", "html", "htm", "css", "svg", "yml", "yaml", "toml", "csv", "asm", "s",
];

/// Analyse a file on disk.
///
/// Reads the whole file into memory (challenge attachments are small) and
/// classifies it. Fails only if the file cannot be read.
pub fn analyse(path: &Path) -> Result<FileAnalysis> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(analyse_bytes(path, &data))
}

/// Analyse raw bytes as if they were the content of `path`.
///
/// Pure: safe to call concurrently across a worker pool. The path only
/// contributes its extension.
pub fn analyse_bytes(path: &Path, data: &[u8]) -> FileAnalysis {
    let extension = extension_of(path);

    // Zero-padded header window so fixed-width magic reads are safe on short
    // and empty files.
    let mut header = [0u8; 8];
    let n = data.len().min(8);
    header[..n].copy_from_slice(&data[..n]);

    let is_dos = u16::from_be_bytes([header[0], header[1]]) == 0x4D5A;
    let magic32 = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);

    // First match wins; the order is load-bearing.
    let assembly = if is_dos && memmem::find(data, b"mscoree.dll").is_some() {
        AssemblyKind::ManagedMicrosoft
    } else if magic32 == 0xCAFE_BABE {
        AssemblyKind::ManagedJava
    } else if header[0] == 0x7F && header[1..4] == *b"ELF" {
        AssemblyKind::Unmanaged
    } else if is_dos {
        // MZ without mscoree.dll is a plain native executable
        AssemblyKind::Unmanaged
    } else {
        AssemblyKind::NotApplicable
    };

    // DOS is tested after ELF and wins if a buffer ever carried both magics.
    let magic = if is_dos {
        MagicFamily::Dos
    } else if header[0] == 0x7F && header[1..4] == *b"ELF" {
        MagicFamily::Elf
    } else {
        MagicFamily::OtherOrNotApplicable
    };

    let kind = if assembly != AssemblyKind::NotApplicable {
        FileKind::Assembly
    } else if looks_binary(&extension, data) {
        FileKind::Binary
    } else {
        FileKind::Text
    };

    FileAnalysis {
        kind,
        assembly,
        magic,
        extension,
    }
}

/// Lower-case extension without the leading dot, `""` if the path has none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Check if content appears to be binary rather than text.
///
/// Extension hints are consulted first, then a content heuristic:
/// - Known binary magic numbers at the start
/// - More than a couple of null bytes
/// - Low ratio of printable characters
///
/// Empty content is never binary.
pub fn looks_binary(extension: &str, data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    if BINARY_EXTENSIONS.contains(&extension) {
        return true;
    }
    if TEXT_EXTENSIONS.contains(&extension) {
        return false;
    }
    !looks_text(data)
}

/// Content-only text heuristic for files with unrecognized extensions.
fn looks_text(data: &[u8]) -> bool {
    if data.len() >= 4 {
        let magic = &data[0..4];
        // ELF
        if magic == [0x7F, b'E', b'L', b'F'] {
            return false;
        }
        // JVM class file
        if magic == [0xCA, 0xFE, 0xBA, 0xBE] {
            return false;
        }
    }
    if data.len() >= 2 && data[0..2] == [b'M', b'Z'] {
        return false;
    }

    // Sample up to 8KB for performance
    let sample_size = data.len().min(8192);
    let sample = &data[..sample_size];

    let mut printable = 0usize;
    let mut null_bytes = 0usize;

    for &b in sample {
        if b == 0 {
            null_bytes += 1;
        } else if b.is_ascii_graphic() || b.is_ascii_whitespace() || b >= 0x80 {
            printable += 1;
        }
    }

    // Text files have at most a stray null or two
    if null_bytes > 2 {
        return false;
    }

    // At least 85% printable for text
    printable * 100 / sample_size >= 85
}
