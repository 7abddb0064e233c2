//! Preference-weighted scoring and ordering of challenges.
//!
//! The user ranks tags in the order they care about them; each challenge is
//! scored by the mean weight of its distinct tags. Exclusion tags never
//! remove a challenge or change its score — they only mark it for demoted
//! display.

use crate::types::{Tag, UnknownTag};
use std::cmp::Ordering;

/// Marker prefix for exclusion tags in a preference string.
pub const EXCLUDE_MARKER: char = '*';

/// Parsed user preferences: ranked wanted tags and excluded tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    /// Tags in user-given order, most wanted first
    pub preferred: Vec<Tag>,
    /// Tags that demote a challenge, marker stripped
    pub excluded: Vec<Tag>,
}

impl Preferences {
    /// Parse a comma-separated preference string.
    ///
    /// A leading `*` marks a tag as excluded. Empty segments are ignored;
    /// an unknown tag name is an error before any scanning happens.
    pub fn parse(input: &str) -> Result<Self, UnknownTag> {
        let mut preferred = Vec::new();
        let mut excluded = Vec::new();

        for segment in input.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if let Some(name) = segment.strip_prefix(EXCLUDE_MARKER) {
                excluded.push(name.trim().parse()?);
            } else {
                preferred.push(segment.parse()?);
            }
        }

        Ok(Preferences {
            preferred,
            excluded,
        })
    }

    /// Weight of one tag: the first preferred tag weighs `preferred.len()`,
    /// the last weighs 1, anything absent weighs 0.
    pub fn weight(&self, tag: Tag) -> f64 {
        match self.preferred.iter().position(|&t| t == tag) {
            Some(i) => (self.preferred.len() - i) as f64,
            None => 0.0,
        }
    }

    /// Score a challenge's deduplicated tag set.
    ///
    /// Returns the mean weight across the tags (an unranked tag still counts
    /// toward the denominator) and whether any tag is excluded. Zero tags
    /// score 0.
    pub fn score(&self, tags: &[Tag]) -> (f64, bool) {
        let sum: f64 = tags.iter().map(|&t| self.weight(t)).sum();
        let score = sum / tags.len().max(1) as f64;
        let excluded = tags.iter().any(|t| self.excluded.contains(t));
        (score, excluded)
    }
}

/// One scored challenge, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// `category/challenge` as discovered in the archive
    pub name: String,
    /// Mean preference weight of the challenge's tags
    pub score: f64,
    /// Deduplicated tags in first-seen order
    pub tags: Vec<Tag>,
    /// At least one tag is on the exclusion list
    pub excluded: bool,
}

/// Order entries for display: descending score, ties ascending by name.
///
/// Exclusion plays no part in ordering. The name tie-break keeps repeated
/// runs deterministic.
pub fn rank(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}
