// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Skip rules for the contributions report.
//!
//! A rule table maps a scope key (`org` or `org/repo`) to a list of named
//! exemptions. A user whose handle matches an exemption of the active scope
//! is recorded as skipped and never queried.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Error, file::read_yaml};

const DEFAULT_REPORT_CONFIG: &str = include_str!("../config/contributions-report.yaml");

/// Skip rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRules {
    #[serde(default)]
    pub skip_inactive: BTreeMap<String, Vec<SkipExemption>>
}

/// A named group of handles exempt from reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipExemption {
    pub name:           String,
    /// Human readable reason recorded for every skipped user.
    #[serde(default)]
    pub reason:         String,
    #[serde(default)]
    pub github_handles: Vec<String>
}

impl SkipExemption {
    /// The reason shown in the report; falls back to the exemption name.
    pub fn display_reason(&self) -> &str {
        if self.reason.trim().is_empty() { &self.name } else { &self.reason }
    }
}

impl SkipRules {
    /// Parses the rule table embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the embedded document is malformed.
    pub fn embedded() -> Result<Self, Error> {
        Ok(serde_yaml::from_str(DEFAULT_REPORT_CONFIG)?)
    }

    /// Loads the embedded defaults and merges the optional override file on
    /// top of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Parse`] when the override cannot be
    /// loaded.
    pub fn load(override_path: Option<&Path>) -> Result<Self, Error> {
        let mut rules = Self::embedded()?;
        if let Some(path) = override_path {
            let overrides: SkipRules = read_yaml(path)?;
            rules.merge(overrides);
        }
        Ok(rules)
    }

    /// Appends the exemptions of `other` to the matching scopes.
    pub fn merge(&mut self, other: SkipRules) {
        for (scope, exemptions) in other.skip_inactive {
            self.skip_inactive.entry(scope).or_default().extend(exemptions);
        }
    }

    /// Builds the lookup key for a report scope: `org/repo` when a
    /// repository is set, `org` otherwise.
    pub fn scope_key(org: &str, repo: Option<&str>) -> String {
        match repo {
            Some(repo) if !repo.is_empty() => format!("{org}/{repo}"),
            _ => org.to_owned()
        }
    }

    /// Finds the exemption that covers `user` within `scope`. Handles are
    /// compared case-insensitively.
    pub fn find(&self, scope: &str, user: &str) -> Option<&SkipExemption> {
        self.skip_inactive.get(scope)?.iter().find(|exemption| {
            exemption
                .github_handles
                .iter()
                .any(|handle| handle.eq_ignore_ascii_case(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn embedded_rules_parse() {
        let rules = SkipRules::embedded().expect("embedded config must parse");
        assert!(rules.skip_inactive.contains_key("kubevirt"));
    }

    #[test]
    fn scope_key_prefers_repository() {
        assert_eq!(SkipRules::scope_key("kubevirt", Some("kubevirt")), "kubevirt/kubevirt");
        assert_eq!(SkipRules::scope_key("kubevirt", Some("")), "kubevirt");
        assert_eq!(SkipRules::scope_key("kubevirt", None), "kubevirt");
    }

    #[test]
    fn find_matches_case_insensitively_within_scope() {
        let yaml = r#"
skipInactive:
  kubevirt/kubevirt:
    - name: maintainers-on-leave
      reason: on parental leave
      githubHandles: [Alice]
"#;
        let rules: SkipRules = serde_yaml::from_str(yaml).expect("valid rules");

        let exemption = rules.find("kubevirt/kubevirt", "alice").expect("alice is exempt");
        assert_eq!(exemption.display_reason(), "on parental leave");
        assert!(rules.find("kubevirt", "alice").is_none());
        assert!(rules.find("kubevirt/kubevirt", "bob").is_none());
    }

    #[test]
    fn display_reason_falls_back_to_name() {
        let exemption = SkipExemption {
            name: "bots".to_owned(),
            ..SkipExemption::default()
        };
        assert_eq!(exemption.display_reason(), "bots");
    }

    #[test]
    fn load_merges_override_file() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("override.yaml");
        fs::write(
            &path,
            "skipInactive:\n  kubevirt:\n    - name: emeritus\n      githubHandles: [oldtimer]\n"
        )
        .expect("failed to write override");

        let rules = SkipRules::load(Some(&path)).expect("rules should load");
        assert!(rules.find("kubevirt", "oldtimer").is_some());
        assert!(rules.find("kubevirt", "kubevirt-bot").is_some());
    }
}
