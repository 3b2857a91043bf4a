use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_COMPANIES;

/// Timeout for the Excel COM conversion, the only script call that has one
pub const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 60;

/// Per-company locations used by the remisión flows
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: String,
    /// Extra spellings matched against free-text affiliations
    pub aliases: Vec<String>,
    pub sender_email: Option<String>,
    pub remision_template: Option<String>,
    pub remisiones_dir: Option<String>,
    pub control_file: Option<String>,
}

impl CompanyProfile {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Whether `text` mentions this company (case-insensitive)
    fn matches(&self, text: &str) -> bool {
        let haystack = text.trim().to_uppercase();
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .filter(|candidate| !candidate.trim().is_empty())
            .any(|candidate| haystack.contains(&candidate.trim().to_uppercase()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Interpreter used to run the external scripts
    pub python: String,
    /// Directory holding the external scripts (resource dir when unset)
    pub scripts_dir: Option<String>,
    /// Directory holding the acta templates (resource dir when unset)
    pub templates_dir: Option<String>,
    pub conversion_timeout_secs: u64,
    pub companies: Vec<CompanyProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            python: default_python().to_string(),
            scripts_dir: None,
            templates_dir: None,
            conversion_timeout_secs: DEFAULT_CONVERSION_TIMEOUT_SECS,
            companies: DEFAULT_COMPANIES
                .iter()
                .map(|name| CompanyProfile::named(name))
                .collect(),
        }
    }
}

fn default_python() -> &'static str {
    if cfg!(target_os = "windows") {
        "python"
    } else {
        "python3"
    }
}

impl Settings {
    /// Scripts directory, falling back to `<resources>/scripts`
    pub fn scripts_dir_or(&self, resource_dir: &Path) -> PathBuf {
        self.scripts_dir
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| resource_dir.join("scripts"))
    }

    /// Templates directory, falling back to `<resources>/templates`
    pub fn templates_dir_or(&self, resource_dir: &Path) -> PathBuf {
        self.templates_dir
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| resource_dir.join("templates"))
    }

    /// Look up a company profile by exact name (case-insensitive)
    pub fn company(&self, name: &str) -> Option<&CompanyProfile> {
        let wanted = name.trim();
        self.companies
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
    }

    /// Map a free-text affiliation ("TEMPOACTIVA EST SAS") to a profile
    ///
    /// Falls back to the first profile when nothing matches.
    pub fn company_for_affiliation(&self, affiliation: &str) -> Option<&CompanyProfile> {
        if let Some(profile) = self.companies.iter().find(|c| c.matches(affiliation)) {
            log::info!("Affiliation '{}' mapped to company '{}'", affiliation, profile.name);
            return Some(profile);
        }

        let fallback = self.companies.first();
        if let Some(profile) = fallback {
            log::warn!(
                "No company matches affiliation '{}', using '{}'",
                affiliation,
                profile.name
            );
        }
        fallback
    }
}
