// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `alumni.yaml` and the generated `ALUMNI.md`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Error,
    file::{read_yaml, write_output}
};

/// Root document of `alumni.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlumniFile {
    #[serde(default)]
    pub alumni: Vec<Alumnus>
}

/// A former community member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Alumnus {
    pub github:  String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name:    String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub since:   String
}

/// Loads `alumni.yaml`.
///
/// # Errors
///
/// Returns [`Error::Io`] or [`Error::Parse`].
pub fn read_alumni(path: &Path) -> Result<AlumniFile, Error> {
    read_yaml(path)
}

/// Renders the alumni table in file order.
pub fn render_alumni(file: &AlumniFile) -> String {
    let mut out = String::from(
        "<!-- Generated from alumni.yaml; do not edit by hand. -->\n\n# Alumni\n\nFormer members who helped shape the project.\n\n"
    );

    if file.alumni.is_empty() {
        out.push_str("No alumni recorded yet.\n");
        return out;
    }

    out.push_str("| GitHub | Name | Company | Since |\n|--------|------|---------|-------|\n");
    for alumnus in &file.alumni {
        out.push_str(&format!(
            "| [@{0}](https://github.com/{0}) | {1} | {2} | {3} |\n",
            alumnus.github, alumnus.name, alumnus.company, alumnus.since
        ));
    }
    out
}

/// Renders `file` into `output_path`.
///
/// # Errors
///
/// Returns [`Error::Write`] when the document cannot be written.
pub fn write_alumni(file: &AlumniFile, output_path: &Path) -> Result<(), Error> {
    write_output(output_path, &render_alumni(file))?;
    info!("alumni list written to {}", output_path.display());
    Ok(())
}
