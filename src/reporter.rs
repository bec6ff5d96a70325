// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Classification of users into active, inactive and skipped, and the
//! aggregate report written at the end of a run.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf}
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    activity::ContributionReport,
    contributions::ContributionReportGenerator,
    error::Error,
    file::{to_yaml, write_output},
    graphql::GraphQlExecutor,
    skip::SkipRules
};

/// How the reporter treats a fetched activity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMode {
    /// Print every activity log and write every detail file.
    Unconditional,
    /// Record active users by name; dump details for inactive users only.
    InactiveOnly
}

/// Options of the run, echoed into the aggregate report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    pub org:                      String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo:                     Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username:                 Option<String>,
    pub months:                   u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgs_file_path:           Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners_file_path:         Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners_aliases_file_path: Option<PathBuf>
}

/// Users by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub active_users:   Vec<String>,
    pub inactive_users: Vec<String>,
    /// Skipped users grouped by the reason they were skipped for.
    pub skipped_users:  BTreeMap<String, Vec<String>>
}

impl ReportResult {
    fn skip_user(&mut self, reason: &str, user: &str) {
        self.skipped_users
            .entry(reason.to_owned())
            .or_default()
            .push(user.to_owned());
    }
}

/// Aggregate report of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_options: ReportOptions,
    pub report_config:  SkipRules,
    pub result:         ReportResult,
    pub log:            Vec<String>
}

impl Report {
    pub fn new(options: ReportOptions, config: SkipRules) -> Self {
        Self {
            report_options: options,
            report_config:  config,
            result:         ReportResult::default(),
            log:            Vec::new()
        }
    }

    /// Writes the report as YAML to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Emit`] or [`Error::Write`].
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let content = to_yaml(self)?;
        write_output(path, &content)?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

/// Accumulates outcomes according to a [`ReportingMode`].
#[derive(Debug)]
pub struct Reporter {
    mode:       ReportingMode,
    report:     Report,
    output_dir: PathBuf
}

impl Reporter {
    /// Creates a reporter writing per-user detail files into `output_dir`.
    pub fn new(
        mode: ReportingMode,
        options: ReportOptions,
        config: SkipRules,
        output_dir: impl Into<PathBuf>
    ) -> Self {
        Self {
            mode,
            report: Report::new(options, config),
            output_dir: output_dir.into()
        }
    }

    /// Records the outcome for `user`.
    ///
    /// In unconditional mode the returned text is the activity log to show
    /// the operator; the caller decides where it goes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] or [`Error::Emit`] when the detail file
    /// cannot be written.
    pub fn report(&mut self, activity: &ContributionReport, user: &str) -> Result<Option<String>, Error> {
        match self.mode {
            ReportingMode::Unconditional => {
                let path = activity.write_to_file(&self.output_dir, user)?;
                return Ok(Some(format!(
                    "{}\nuser activity log: {:?}\n",
                    activity.summary(),
                    path.display().to_string()
                )));
            }
            ReportingMode::InactiveOnly => {
                if activity.has_activity() {
                    debug!("active user: {}", user);
                    self.report.result.active_users.push(user.to_owned());
                    return Ok(None);
                }
                info!("inactive user: {}", user);
                self.report.log.push(activity.summary());
                let path = activity.write_to_file(&self.output_dir, user)?;
                self.report
                    .log
                    .push(format!("activity log written to {:?}", path.display().to_string()));
                self.report.result.inactive_users.push(user.to_owned());
            }
        }
        Ok(None)
    }

    /// Records `user` as skipped for `reason`.
    pub fn skip(&mut self, user: &str, reason: &str) {
        debug!("skipping user {}: {}", user, reason);
        self.report.result.skip_user(reason, user);
    }

    /// Text printed at the end of the run; empty in unconditional mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Emit`] when the user list cannot be serialized.
    pub fn summary(&self) -> Result<String, Error> {
        match self.mode {
            ReportingMode::Unconditional => Ok(String::new()),
            ReportingMode::InactiveOnly => {
                let users = to_yaml(&self.report.result.inactive_users)?;
                Ok(format!("inactive users:\n{users}"))
            }
        }
    }

    /// The aggregate report accumulated so far.
    pub fn full(&self) -> &Report {
        &self.report
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.yellow} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb
}

/// Runs the report for every user in order.
///
/// Users covered by a skip rule of the generator's scope are recorded as
/// skipped without a query. The first failure aborts the run.
///
/// # Errors
///
/// Returns the first query or write error.
pub async fn generate_reports<E: GraphQlExecutor>(
    generator: &ContributionReportGenerator<E>,
    users: &[String],
    skip_rules: &SkipRules,
    reporter: &mut Reporter
) -> Result<(), Error> {
    let scope = SkipRules::scope_key(generator.org(), generator.repo());
    let pb = spinner();

    for (index, user) in users.iter().enumerate() {
        if let Some(exemption) = skip_rules.find(&scope, user) {
            reporter.skip(user, exemption.display_reason());
            continue;
        }

        pb.set_message(format!("[{}/{}] Querying activity of {}...", index + 1, users.len(), user));
        let activity = match generator.generate_report(user).await {
            Ok(activity) => activity,
            Err(e) => {
                pb.abandon_with_message(format!("Aborted at {user}"));
                return Err(e);
            }
        };
        if let Some(log) = reporter.report(&activity, user)? {
            pb.suspend(|| print!("{log}"));
        }
    }

    pb.finish_with_message(format!("Processed {} users", users.len()));
    Ok(())
}
