//! Tag derivation from file analyses.
//!
//! Turns a [`FileAnalysis`] into an ordered list of semantic tags: runtime
//! tags first, then magic-number tags, then at most one extension tag.

use crate::types::{AssemblyKind, FileAnalysis, MagicFamily, Tag};

/// Derive the ordered tag list for one analysed file.
///
/// Runtime and magic tags can co-occur with an extension tag, but the
/// extension itself contributes at most one tag. `elf`, `exe` and `class`
/// extensions contribute nothing — the magic/runtime tags already cover them.
/// Duplicates within a single file are kept; callers dedup per challenge.
pub fn tags_for(analysis: &FileAnalysis) -> Vec<Tag> {
    let mut tags = Vec::new();

    match analysis.assembly {
        AssemblyKind::ManagedMicrosoft => {
            tags.push(Tag::Dotnet);
            tags.push(Tag::Managed);
        }
        AssemblyKind::ManagedJava => {
            tags.push(Tag::Java);
            tags.push(Tag::Managed);
        }
        AssemblyKind::Unmanaged => tags.push(Tag::Unmanaged),
        AssemblyKind::NotApplicable => {}
    }

    match analysis.magic {
        MagicFamily::Dos => tags.push(Tag::Dos),
        MagicFamily::Elf => tags.push(Tag::Elf),
        MagicFamily::OtherOrNotApplicable => {}
    }

    if let Some(tag) = extension_tag(&analysis.extension) {
        tags.push(tag);
    }

    tags
}

/// The single tag an extension maps to, if any.
fn extension_tag(extension: &str) -> Option<Tag> {
    match extension {
        "obj" | "stl" | "step" | "glb" | "gltf" | "blend" | "mdl" | "fbx" => Some(Tag::Model),

        "f3d" | "scad" => Some(Tag::Cad),

        "c" | "h" | "cpp" | "c++" | "hpp" | "h++" | "m" | "cs" | "csharp" | "js" | "ts"
        | "coffee" | "py" | "s" | "asm" => Some(Tag::Source),

        "sh" | "zsh" | "fish" => Some(Tag::Shell),

        "png" | "jpg" | "jpeg" | "svg" => Some(Tag::Graphic),

        "img" | "iso" => Some(Tag::Image),

        "tar" | "xz" | "gz" | "zip" | "lzma" | "lzma2" | "bz2" | "7z" => Some(Tag::Archive),

        // Covered by the runtime/magic tags already
        "elf" | "exe" | "class" => None,

        _ => Some(Tag::Other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileKind;

    fn analysis(
        assembly: AssemblyKind,
        magic: MagicFamily,
        extension: &str,
    ) -> FileAnalysis {
        let kind = if assembly == AssemblyKind::NotApplicable {
            FileKind::Binary
        } else {
            FileKind::Assembly
        };
        FileAnalysis {
            kind,
            assembly,
            magic,
            extension: extension.to_string(),
        }
    }

    #[test]
    fn test_dotnet_order() {
        let tags = tags_for(&analysis(
            AssemblyKind::ManagedMicrosoft,
            MagicFamily::Dos,
            "exe",
        ));
        assert_eq!(tags, vec![Tag::Dotnet, Tag::Managed, Tag::Dos]);
    }

    #[test]
    fn test_java_never_dotnet() {
        let tags = tags_for(&analysis(
            AssemblyKind::ManagedJava,
            MagicFamily::OtherOrNotApplicable,
            "class",
        ));
        assert_eq!(tags, vec![Tag::Java, Tag::Managed]);
        assert!(!tags.contains(&Tag::Dotnet));
    }

    #[test]
    fn test_elf_no_extension_tag() {
        for ext in ["elf", "exe", "class", ""] {
            let tags = tags_for(&analysis(AssemblyKind::Unmanaged, MagicFamily::Elf, ext));
            if ext.is_empty() {
                // No extension still falls through the table to `other`
                assert_eq!(tags, vec![Tag::Unmanaged, Tag::Elf, Tag::Other]);
            } else {
                assert_eq!(tags, vec![Tag::Unmanaged, Tag::Elf], "ext {ext:?}");
            }
        }
    }

    #[test]
    fn test_extension_groups() {
        let cases = [
            ("obj", Tag::Model),
            ("fbx", Tag::Model),
            ("scad", Tag::Cad),
            ("c", Tag::Source),
            ("coffee", Tag::Source),
            ("asm", Tag::Source),
            ("fish", Tag::Shell),
            ("svg", Tag::Graphic),
            ("iso", Tag::Image),
            ("7z", Tag::Archive),
            ("lzma2", Tag::Archive),
            ("flag", Tag::Other),
            ("", Tag::Other),
        ];
        for (ext, want) in cases {
            let tags = tags_for(&analysis(
                AssemblyKind::NotApplicable,
                MagicFamily::OtherOrNotApplicable,
                ext,
            ));
            assert_eq!(tags, vec![want], "ext {ext:?}");
        }
    }

    #[test]
    fn test_one_extension_tag_max() {
        // Extension contributes exactly one tag no matter what else fires
        let tags = tags_for(&analysis(
            AssemblyKind::ManagedMicrosoft,
            MagicFamily::Dos,
            "zip",
        ));
        assert_eq!(tags, vec![Tag::Dotnet, Tag::Managed, Tag::Dos, Tag::Archive]);
    }

    #[test]
    fn test_deterministic() {
        let a = analysis(AssemblyKind::Unmanaged, MagicFamily::Elf, "so");
        assert_eq!(tags_for(&a), tags_for(&a));
    }
}
