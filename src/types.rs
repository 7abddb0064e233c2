//! Core types for file classification.
//!
//! This module defines the closed classification categories every analysed
//! file falls into, plus the tag vocabulary used for challenge triage.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Broad nature of a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// An executable image (native or managed)
    Assembly,
    /// Binary data that is not a recognized executable
    Binary,
    /// Plain text
    Text,
}

/// Runtime family of an executable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssemblyKind {
    /// .NET assembly (PE image importing mscoree.dll)
    ManagedMicrosoft,
    /// JVM class file (0xCAFEBABE)
    ManagedJava,
    /// Native executable (ELF or plain DOS/Windows)
    Unmanaged,
    /// Not an executable at all
    NotApplicable,
}

/// Magic-number family recognized at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MagicFamily {
    /// DOS/Windows executable stub (MZ)
    Dos,
    /// POSIX ELF image
    Elf,
    /// Anything else, including non-executables
    OtherOrNotApplicable,
}

/// Result of sniffing a single file.
///
/// Invariants: `kind == Assembly` exactly when `assembly != NotApplicable`,
/// and `magic == Elf` implies `assembly == Unmanaged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAnalysis {
    /// Binary/text/executable nature
    pub kind: FileKind,
    /// Managed/unmanaged executable family
    pub assembly: AssemblyKind,
    /// Leading magic-number family
    pub magic: MagicFamily,
    /// Lower-case extension without the leading dot, `""` if none
    pub extension: String,
}

/// Semantic tag attached to challenge files.
///
/// The set is closed: scoring and the extension table stay exhaustive over
/// these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// .NET assembly
    Dotnet,
    /// JVM class file
    Java,
    /// ELF image
    Elf,
    /// DOS/Windows executable
    Dos,
    /// Any managed runtime image
    Managed,
    /// Any native executable
    Unmanaged,
    /// 3D model data (obj, stl, glb, ...)
    Model,
    /// CAD project (f3d, scad)
    Cad,
    /// Source code
    Source,
    /// Shell script
    Shell,
    /// Raster or vector graphic
    Graphic,
    /// Disk image
    Image,
    /// Compressed archive
    Archive,
    /// Everything else
    Other,
}

impl Tag {
    /// The user-facing spelling of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Dotnet => "dotnet",
            Tag::Java => "java",
            Tag::Elf => "elf",
            Tag::Dos => "dos",
            Tag::Managed => "managed",
            Tag::Unmanaged => "unmanaged",
            Tag::Model => "model",
            Tag::Cad => "cad",
            Tag::Source => "source",
            Tag::Shell => "shell",
            Tag::Graphic => "graphic",
            Tag::Image => "image",
            Tag::Archive => "archive",
            Tag::Other => "other",
        }
    }

    /// All tags, in the order they are documented to users.
    pub const ALL: [Tag; 14] = [
        Tag::Dotnet,
        Tag::Java,
        Tag::Elf,
        Tag::Dos,
        Tag::Managed,
        Tag::Unmanaged,
        Tag::Model,
        Tag::Cad,
        Tag::Source,
        Tag::Shell,
        Tag::Graphic,
        Tag::Image,
        Tag::Archive,
        Tag::Other,
    ];
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Error for a tag name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag {:?}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for tag in Tag::ALL {
            assert_eq!(tag.as_str().parse::<Tag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_tag_unknown() {
        let err = "warez".parse::<Tag>().unwrap_err();
        assert_eq!(err, UnknownTag("warez".to_string()));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::Dotnet.to_string(), "dotnet");
        assert_eq!(Tag::Unmanaged.to_string(), "unmanaged");
    }

    #[test]
    fn test_tag_all_distinct() {
        for (i, a) in Tag::ALL.iter().enumerate() {
            for b in &Tag::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_file_analysis_equality() {
        let a = FileAnalysis {
            kind: FileKind::Text,
            assembly: AssemblyKind::NotApplicable,
            magic: MagicFamily::OtherOrNotApplicable,
            extension: String::new(),
        };
        assert_eq!(a, a.clone());
    }
}
