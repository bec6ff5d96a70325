// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Organization membership as declared in the Prow `orgs.yaml` config.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Error, file::read_yaml};

/// Root document of `orgs.yaml`, keyed by organization login.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Orgs {
    #[serde(default)]
    pub orgs: BTreeMap<String, Org>
}

impl Orgs {
    /// Returns the organization named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the organization is not declared.
    pub fn org(&self, name: &str) -> Result<&Org, Error> {
        self.orgs
            .get(name)
            .ok_or_else(|| Error::validation(format!("organization '{name}' not found in orgs file")))
    }
}

/// Admins and members of one organization. Other keys of the Prow config
/// (teams, repos, metadata) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Org {
    #[serde(default)]
    pub admins:  Vec<String>,
    #[serde(default)]
    pub members: Vec<String>
}

impl Org {
    /// Whether `github_handle` is an admin or member. GitHub handles are
    /// case-insensitive, so is the comparison.
    pub fn has_member(&self, github_handle: &str) -> bool {
        self.admins
            .iter()
            .chain(self.members.iter())
            .any(|handle| handle.eq_ignore_ascii_case(github_handle))
    }

    /// All admins followed by all members, in file order.
    pub fn all_members(&self) -> impl Iterator<Item = &str> {
        self.admins.iter().chain(self.members.iter()).map(String::as_str)
    }
}

/// Loads `orgs.yaml` from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parse`] when the file cannot be loaded.
pub fn read_orgs(path: &Path) -> Result<Orgs, Error> {
    read_yaml(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(admins: &[&str], members: &[&str]) -> Org {
        Org {
            admins:  admins.iter().map(|s| (*s).to_owned()).collect(),
            members: members.iter().map(|s| (*s).to_owned()).collect()
        }
    }

    #[test]
    fn has_member_matches_members_and_admins() {
        let org = org(&["admin1", "admin2"], &["member1", "member2"]);
        assert!(org.has_member("member1"));
        assert!(org.has_member("admin2"));
        assert!(!org.has_member("stranger"));
    }

    #[test]
    fn has_member_ignores_case_in_both_directions() {
        let org = org(&["Admin1"], &["member1"]);
        assert!(org.has_member("Member1"));
        assert!(org.has_member("admin1"));
        assert!(org.has_member("ADMIN1"));
    }

    #[test]
    fn orgs_document_ignores_unrelated_keys() {
        let yaml = r#"
orgs:
  kubevirt:
    admins: [root]
    members: [alice, bob]
    teams:
      maintainers:
        members: [alice]
"#;
        let orgs: Orgs = serde_yaml::from_str(yaml).expect("valid orgs");
        let kubevirt = orgs.org("kubevirt").expect("org present");
        assert_eq!(kubevirt.all_members().collect::<Vec<_>>(), ["root", "alice", "bob"]);
    }

    #[test]
    fn missing_org_is_a_validation_error() {
        let orgs = Orgs::default();
        assert!(matches!(orgs.org("kubevirt"), Err(Error::Validation { .. })));
    }
}
