// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Document types for `sigs.yaml`.
//!
//! The file lists special interest groups, working groups, user groups and
//! committees. Every collection shares the [`Group`] shape. Optional fields
//! are skipped on output when empty so that a load/save cycle without
//! changes reproduces the same document structure.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::Error, file::read_yaml};

/// Root document of `sigs.yaml`.
///
/// # Examples
///
/// ```
/// use community::Sigs;
///
/// let yaml = r#"
/// sigs:
///   - name: sig-ci
///     dir: sig-ci
/// "#;
/// let sigs: Sigs = serde_yaml::from_str(yaml).expect("valid document");
/// assert_eq!(sigs.sigs[0].name, "sig-ci");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sigs {
    /// Special interest groups.
    #[serde(default)]
    pub sigs:          Vec<Group>,
    /// Working groups.
    #[serde(default)]
    pub workinggroups: Vec<Group>,
    /// User groups.
    #[serde(default)]
    pub usergroups:    Vec<Group>,
    /// Committees.
    #[serde(default)]
    pub committees:    Vec<Group>
}

impl Sigs {
    /// Iterates over every collection paired with its short kind label
    /// (`sig`, `wg`, `ug`, `committee`).
    pub fn categories(&self) -> [(&'static str, &[Group]); 4] {
        [
            ("sig", &self.sigs),
            ("wg", &self.workinggroups),
            ("ug", &self.usergroups),
            ("committee", &self.committees)
        ]
    }

    /// Mutable counterpart of [`Sigs::categories`].
    pub fn categories_mut(&mut self) -> [(&'static str, &mut Vec<Group>); 4] {
        [
            ("sig", &mut self.sigs),
            ("wg", &mut self.workinggroups),
            ("ug", &mut self.usergroups),
            ("committee", &mut self.committees)
        ]
    }
}

/// A SIG, working group, user group or committee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    pub name:              String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir:               String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description:       String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mission_statement: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label:             String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leads:             Vec<OrgMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leadership:        Option<Leadership>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meetings:          Vec<Meeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact:           Option<Contact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subprojects:       Vec<SubProject>
}

/// Communication channels of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Contact {
    #[serde(default)]
    pub slack:        String,
    #[serde(default)]
    pub mailing_list: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams:        Vec<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liaison:      Option<OrgMember>
}

/// GitHub team referenced from a group contact block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Team {
    pub name:        String,
    #[serde(default)]
    pub description: String
}

/// Recurring meeting of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Meeting {
    #[serde(default)]
    pub description:    String,
    #[serde(default)]
    pub day:            String,
    #[serde(default)]
    pub time:           String,
    #[serde(default)]
    pub tz:             String,
    #[serde(default)]
    pub frequency:      String,
    #[serde(default)]
    pub url:            String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub archive_url:    String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recordings_url: String
}

/// Chairs of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Leadership {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chairs: Vec<OrgMember>
}

/// A person referenced by GitHub handle; used for leads, chairs and liaisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrgMember {
    pub github:  String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name:    String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String
}

impl OrgMember {
    /// Creates a member entry that only carries a GitHub handle.
    pub fn with_github(github: impl Into<String>) -> Self {
        Self {
            github: github.into(),
            ..Self::default()
        }
    }
}

/// A subproject owned by a group; `owners` are URLs of OWNERS files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubProject {
    pub name:        String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub owners:      Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leads:       Vec<OrgMember>
}

/// Loads `sigs.yaml` from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when it is not a valid sigs document.
pub fn read_sigs(path: &Path) -> Result<Sigs, Error> {
    read_yaml(path)
}
