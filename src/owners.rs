// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `OWNERS` and `OWNERS_ALIASES` documents.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Error, file::read_yaml};

/// An `OWNERS` file. `filters` maps path regular expressions to nested
/// owner blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Owners {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers:          Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approvers:          Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emeritus_approvers: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters:            BTreeMap<String, Owners>
}

impl Owners {
    /// Reviewers and approvers of this block and every nested filter, in
    /// declaration order. Duplicates are kept; emeritus approvers are not
    /// part of the active set.
    pub fn active_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .reviewers
            .iter()
            .chain(self.approvers.iter())
            .map(String::as_str)
            .collect();
        for nested in self.filters.values() {
            names.extend(nested.active_names());
        }
        names
    }
}

/// An `OWNERS_ALIASES` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OwnersAliases {
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>
}

impl OwnersAliases {
    /// Replaces every alias with its handles; names that are not aliases
    /// pass through unchanged.
    pub fn resolve<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>
    {
        let mut resolved = Vec::new();
        for name in names {
            match self.aliases.get(name) {
                Some(handles) => resolved.extend(handles.iter().cloned()),
                None => resolved.push(name.to_owned())
            }
        }
        resolved
    }
}

/// Loads an `OWNERS` file.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parse`] when the file cannot be loaded.
pub fn read_owners(path: &Path) -> Result<Owners, Error> {
    read_yaml(path)
}

/// Loads an `OWNERS_ALIASES` file.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parse`] when the file cannot be loaded.
pub fn read_owners_aliases(path: &Path) -> Result<OwnersAliases, Error> {
    read_yaml(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_names_flatten_nested_filters() {
        let yaml = r#"
reviewers: [alice]
approvers: [bob]
emeritus_approvers: [retired]
filters:
  ".*":
    reviewers: [carol]
  "\\.go$":
    approvers: [dave]
    filters:
      "vendor/":
        reviewers: [erin]
"#;
        let owners: Owners = serde_yaml::from_str(yaml).expect("valid owners");
        let mut names = owners.active_names();
        names.sort_unstable();
        assert_eq!(names, ["alice", "bob", "carol", "dave", "erin"]);
    }

    #[test]
    fn resolve_expands_aliases_and_keeps_plain_names() {
        let aliases = OwnersAliases {
            aliases: BTreeMap::from([(
                "sig-ci-approvers".to_owned(),
                vec!["alice".to_owned(), "bob".to_owned()]
            )])
        };

        let resolved = aliases.resolve(["sig-ci-approvers", "carol"]);
        assert_eq!(resolved, ["alice", "bob", "carol"]);
    }
}
