//! Bank-level plumbing around the external dump tool: splitting its output
//! into per-patch blocks, slugging patch names, persisting documents, and
//! per-bank reporting.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::patch::Patch;

/// Blocks with this many lines or fewer are dump-tool banner/noise rather
/// than patches.
const MIN_PATCH_LINES: usize = 10;

/// The dump tool separates voices with a 49-hyphen rule; any line consisting
/// solely of at least this many hyphens is accepted, so a different build of
/// the tool does not silently break splitting.
const MIN_DELIMITER_HYPHENS: usize = 3;

fn is_delimiter(line: &str) -> bool {
    line.len() >= MIN_DELIMITER_HYPHENS && line.bytes().all(|b| b == b'-')
}

/// Splits dump-tool output into per-patch text blocks, dropping anything
/// with [`MIN_PATCH_LINES`] lines or fewer.
pub fn split_patch_blocks(output: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in output.lines() {
        if is_delimiter(line) {
            if current.len() > MIN_PATCH_LINES {
                blocks.push(current.join("\n"));
            }
            current.clear();
        } else {
            current.push(line);
        }
    }
    if current.len() > MIN_PATCH_LINES {
        blocks.push(current.join("\n"));
    }
    blocks
}

/// Filesystem-safe identifier for a patch name: lowercased, with runs of
/// non-alphanumeric characters collapsed to single hyphens and hyphens
/// stripped from both ends. Degenerate names ("!!!") slug to the empty
/// string.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-').len();
    slug.truncate(trimmed);
    slug
}

/// Output directory name for a bank file: its file name without the
/// extension.
pub fn bank_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes one patch as a pretty-printed JSON document under `dir`, named by
/// the slug of its parsed name. Existing documents are overwritten.
pub fn write_patch(dir: &Path, patch: &Patch) -> Result<PathBuf> {
    let name = patch.name.as_deref().unwrap_or_default();
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(anyhow!("patch name {:?} slugs to nothing, skipping", name));
    }
    let path = dir.join(format!("{slug}.json"));
    let json = serde_json::to_string_pretty(patch)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Outcome of one bank file, collected so a run can finish with a summary
/// instead of dropping failures on the floor. Nothing here is ever fatal to
/// the run.
#[derive(Debug)]
pub struct BankReport {
    /// Bank file stem, also the per-bank output directory name.
    pub bank: String,
    /// What happened to the bank.
    pub outcome: BankOutcome,
}

/// What processing one bank produced.
#[derive(Debug)]
pub enum BankOutcome {
    /// The dump tool ran and its output was converted.
    Converted {
        /// Patch documents successfully written.
        written: usize,
        /// Patches that parsed but could not be persisted.
        failed: usize,
    },
    /// The dump tool could not be started or exited unsuccessfully; the bank
    /// produced no output.
    DumpFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_blocks_are_dropped() {
        let eight = "a\n".repeat(8);
        let eleven = "b\n".repeat(11);
        let output = format!("{eight}{}\n{eleven}", "-".repeat(49));
        let blocks = split_patch_blocks(&output);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].starts_with('b'));
    }

    #[test]
    fn delimiter_length_is_flexible() {
        let block = "x\n".repeat(12);
        let output = format!("{block}---\n{block}------------\n{block}");
        assert_eq!(split_patch_blocks(&output).len(), 3);
        // Two hyphens is not a rule, and neither is a rule with other text.
        assert_eq!(split_patch_blocks(&format!("{block}--\n{block}")).len(), 1);
        assert_eq!(split_patch_blocks(&format!("{block}--- x\n{block}")).len(), 1);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Test Patch"), "test-patch");
        assert_eq!(slugify("BRASS   1"), "brass-1");
        assert_eq!(slugify("E.PIANO 1 "), "e-piano-1");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn bank_stems() {
        assert_eq!(bank_stem(Path::new("sysex/rom1a.syx")), "rom1a");
        assert_eq!(bank_stem(Path::new("analog1.SYX")), "analog1");
    }

    #[test]
    fn write_rejects_degenerate_slug() {
        let dir = tempfile::tempdir().unwrap();
        let patch = Patch {
            name: Some("???".to_string()),
            ..Default::default()
        };
        assert!(write_patch(dir.path(), &patch).is_err());
        assert!(write_patch(dir.path(), &Patch::default()).is_err());
    }

    #[test]
    fn write_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut patch = Patch {
            name: Some("Test Patch".to_string()),
            algorithm: Some(5),
            ..Default::default()
        };
        let first = write_patch(dir.path(), &patch).unwrap();
        patch.algorithm = Some(6);
        let second = write_patch(dir.path(), &patch).unwrap();
        assert_eq!(first, second);

        let written = fs::read_to_string(second).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["algorithm"], 6);
    }
}
