// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Label catalog as declared in the Prow `labels.yaml` config.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Error, file::read_yaml};

/// Root document of `labels.yaml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LabelsYaml {
    /// Labels applied to every repository.
    #[serde(default)]
    pub default: LabelSet,
    /// Additional labels keyed by `org/repo`.
    #[serde(default)]
    pub repos:   BTreeMap<String, LabelSet>
}

impl LabelsYaml {
    /// Whether `name` is one of the default labels. Repository specific
    /// labels do not count.
    pub fn has_default_label(&self, name: &str) -> bool {
        self.default.labels.iter().any(|label| label.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LabelSet {
    #[serde(default)]
    pub labels: Vec<Label>
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(default)]
    pub name:        String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color:       Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prow_plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by:    Option<String>
}

/// Loads `labels.yaml` from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parse`] when the file cannot be loaded.
pub fn read_labels(path: &Path) -> Result<LabelsYaml, Error> {
    read_yaml(path)
}
