//! Lithuanian diminutive-suffix glossary.
//! Matches suffix entries against the words of the input text and returns
//! only the matched entries for prompt injection, so the model renders
//! diminutives as "small"/"little" forms instead of unrelated nouns.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Word ending without the leading hyphen, e.g. `ukas`.
    pub suffix: String,
    /// What the ending signals, phrased for the model.
    pub meaning: String,
}

/// On-disk glossary file format.
#[derive(Debug, Deserialize)]
struct GlossaryFile {
    version: u32,
    entries: Vec<GlossaryEntry>,
}

/// Loaded glossary with version tracking.
#[derive(Debug, Clone)]
pub struct Glossary {
    version: u32,
    entries: Vec<GlossaryEntry>,
}

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("glossary IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glossary parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

const BUILTIN: &[(&str, &str)] = &[
    ("ukas", "masculine diminutive: a small or endearing version of the base noun"),
    ("ukė", "feminine diminutive: a small or endearing version of the base noun"),
    ("elis", "masculine diminutive: a small version of the base noun"),
    ("elė", "feminine diminutive: a small version of the base noun"),
    ("ėlis", "masculine diminutive: a small version of the base noun"),
    ("ėlė", "feminine diminutive: a small version of the base noun"),
    ("utis", "masculine diminutive: a tiny or affectionate version of the base noun"),
    ("utė", "feminine diminutive: a tiny or affectionate version of the base noun"),
    ("ytis", "masculine diminutive: a small version of the base noun"),
    ("ytė", "feminine diminutive: a small version of the base noun"),
    ("iukas", "masculine diminutive: a small or endearing version of the base noun"),
    ("iukė", "feminine diminutive: a small or endearing version of the base noun"),
];

impl Glossary {
    /// Load glossary from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, GlossaryError> {
        let content = std::fs::read_to_string(path)?;
        let file: GlossaryFile = serde_json::from_str(&content)?;
        Ok(Self {
            version: file.version,
            entries: file.entries,
        })
    }

    /// The built-in Lithuanian diminutive suffixes.
    pub fn builtin() -> Self {
        Self {
            version: 1,
            entries: BUILTIN
                .iter()
                .map(|(suffix, meaning)| GlossaryEntry {
                    suffix: suffix.to_string(),
                    meaning: meaning.to_string(),
                })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            version: 0,
            entries: Vec::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Return entries whose suffix ends at least one word of `text`
    /// (case-insensitive). A word must be longer than the suffix itself.
    pub fn match_entries(&self, text: &str) -> Vec<GlossaryEntry> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        self.entries
            .iter()
            .filter(|e| {
                let suffix = e.suffix.to_lowercase();
                words
                    .iter()
                    .any(|w| w.len() > suffix.len() && w.ends_with(&suffix))
            })
            .cloned()
            .collect()
    }
}

/// Render matched entries as a prompt section. Empty input renders nothing.
pub fn render_for_prompt(entries: &[GlossaryEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from(
        "Lithuanian diminutive endings found in the text (translate these words as small or endearing forms):\n",
    );
    for e in entries {
        out.push_str(&format!("- \"-{}\": {}\n", e.suffix, e.meaning));
    }
    out
}
