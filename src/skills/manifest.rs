//! Manifest-discovered skills
//!
//! A skill directory contains one subdirectory per skill, each with a
//! `skill.toml` manifest declaring the commands it claims and the replies
//! it gives. Discovery order is deterministic: directories are scanned in
//! sorted order, bad manifests are warned about and skipped.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::Skill;
use crate::Result;

/// Manifest file name looked for in each skill subdirectory
const MANIFEST_FILE: &str = "skill.toml";

/// Parsed `skill.toml` manifest
#[derive(Debug, Clone, Deserialize)]
pub struct SkillManifest {
    /// Unique skill name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Command patterns this skill claims, tried in order
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
}

/// One pattern→reply rule
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRule {
    /// Claim commands starting with this prefix
    #[serde(default)]
    pub prefix: Option<String>,
    /// Claim commands equal to this string
    #[serde(default)]
    pub exact: Option<String>,
    /// Reply template; `{rest}` is replaced with the text after the prefix
    pub reply: String,
}

/// A skill backed by a manifest's pattern rules
#[derive(Debug, Clone)]
pub struct ManifestSkill {
    manifest: SkillManifest,
}

impl ManifestSkill {
    /// Wrap a parsed manifest
    #[must_use]
    pub fn new(manifest: SkillManifest) -> Self {
        Self { manifest }
    }
}

impl Skill for ManifestSkill {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn handle(&self, command: &str) -> Result<Option<String>> {
        for rule in &self.manifest.patterns {
            if let Some(exact) = &rule.exact {
                if command == exact {
                    return Ok(Some(rule.reply.clone()));
                }
            }
            if let Some(prefix) = &rule.prefix {
                if let Some(rest) = command.strip_prefix(prefix.as_str()) {
                    return Ok(Some(rule.reply.replace("{rest}", rest.trim())));
                }
            }
        }
        Ok(None)
    }
}

/// Scan directories for skill manifests
///
/// Subdirectories of each root are visited in sorted order; each valid
/// `skill.toml` yields one [`ManifestSkill`]. Missing roots are skipped
/// silently, unreadable ones with a warning.
#[must_use]
pub fn discover(dirs: &[PathBuf]) -> Vec<ManifestSkill> {
    let mut skills = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "skill directory does not exist, skipping");
            continue;
        }

        let Ok(entries) = std::fs::read_dir(dir) else {
            tracing::warn!(path = %dir.display(), "failed to read skill directory");
            continue;
        };

        let mut subdirs: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();

        for path in subdirs {
            let manifest_path = path.join(MANIFEST_FILE);
            if let Some(manifest) = load_manifest(&manifest_path) {
                tracing::debug!(
                    skill = %manifest.name,
                    path = %path.display(),
                    "discovered skill"
                );
                skills.push(ManifestSkill::new(manifest));
            }
        }
    }

    skills
}

/// Load and parse a single manifest file
fn load_manifest(path: &Path) -> Option<SkillManifest> {
    if !path.is_file() {
        return None;
    }
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<SkillManifest>(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse skill manifest"
            );
            None
        }
    }
}
