// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Contribution reports returned by the activity query client.
//!
//! The structures mirror the GraphQL selections sent to the GitHub API. The
//! `*_count`/`total_count` fields carry the remote totals while `nodes` only
//! hold the bounded sample requested with `first`/`last`, so every summary
//! reports the totals.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf}
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, emit_error, write_error};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a `search(type: ISSUE, ...)` selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    #[serde(default)]
    pub issue_count: u64,
    #[serde(default = "Vec::new")]
    pub nodes:       Vec<T>
}

impl<T> Default for SearchResult<T> {
    fn default() -> Self {
        Self {
            issue_count: 0,
            nodes:       Vec::new()
        }
    }
}

/// A connection that reports its remote `totalCount`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountedConnection<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub nodes:       Vec<T>
}

impl<T> Default for CountedConnection<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            nodes:       Vec::new()
        }
    }
}

/// A connection queried without a count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Actor {
    #[serde(default)]
    pub login: String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryName {
    #[serde(default)]
    pub name: String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNameWithOwner {
    #[serde(default)]
    pub name_with_owner: String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlRef {
    #[serde(default)]
    pub url: String
}

/// Issue authored by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    #[serde(default)]
    pub number:     u64,
    #[serde(default)]
    pub title:      String,
    #[serde(default)]
    pub url:        String,
    #[serde(default)]
    pub repository: Option<RepositoryName>,
    #[serde(default)]
    pub author:     Option<Actor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub author:     Option<Actor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url:        String
}

/// Issue or pull request the user commented on, with its comment thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentedNode {
    #[serde(default)]
    pub number:     u64,
    #[serde(default)]
    pub title:      String,
    #[serde(default)]
    pub url:        String,
    #[serde(default)]
    pub repository: Option<RepositoryName>,
    #[serde(default)]
    pub author:     Option<Actor>,
    #[serde(default)]
    pub comments:   Connection<Comment>
}

/// Pull request authored by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    #[serde(default)]
    pub number:     u64,
    #[serde(default)]
    pub title:      String,
    #[serde(default)]
    pub url:        String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author:     Option<Actor>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Review {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub url:   String
}

/// Pull request reviewed by the user, with the user's reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedPullRequestNode {
    #[serde(default)]
    pub number:     u64,
    #[serde(default)]
    pub title:      String,
    #[serde(default)]
    pub url:        String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviews:    CountedConnection<Review>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssociatedPullRequest {
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title:  String,
    #[serde(default)]
    pub url:    String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    #[serde(default)]
    pub commit_url:               String,
    #[serde(default)]
    pub associated_pull_requests: Connection<AssociatedPullRequest>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitTarget {
    #[serde(default)]
    pub history: CountedConnection<CommitNode>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchRef {
    #[serde(default)]
    pub target: Option<CommitTarget>
}

/// Commits by the user on the repository default branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCommits {
    #[serde(default)]
    pub default_branch_ref: Option<BranchRef>
}

impl RepositoryCommits {
    /// Remote total of commits in the window; zero when the repository has
    /// no default branch.
    pub fn total_count(&self) -> u64 {
        self.default_branch_ref
            .as_ref()
            .and_then(|branch| branch.target.as_ref())
            .map_or(0, |target| target.history.total_count)
    }
}

/// Activity of one user within one repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryActivity {
    pub org:                     String,
    pub repo:                    String,
    pub user_name:               String,
    pub user_id:                 String,
    pub start_from:              DateTime<Utc>,
    pub issues_created:          SearchResult<IssueNode>,
    pub issues_commented:        SearchResult<CommentedNode>,
    pub pull_requests_created:   SearchResult<PullRequestNode>,
    pub pull_requests_reviewed:  SearchResult<ReviewedPullRequestNode>,
    pub pull_requests_commented: SearchResult<CommentedNode>,
    pub commits_by_user:         RepositoryCommits
}

impl RepositoryActivity {
    /// The six category counts in summary order.
    fn counts(&self) -> [u64; 6] {
        [
            self.issues_created.issue_count,
            self.issues_commented.issue_count,
            self.pull_requests_reviewed.issue_count,
            self.pull_requests_created.issue_count,
            self.pull_requests_commented.issue_count,
            self.commits_by_user.total_count()
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContribution {
    #[serde(default)]
    pub issue:       UrlRef,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestContribution {
    #[serde(default)]
    pub pull_request: UrlRef,
    #[serde(default)]
    pub occurred_at:  Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestReviewDetail {
    #[serde(default)]
    pub repository:   RepositoryNameWithOwner,
    #[serde(default)]
    pub pull_request: UrlRef,
    #[serde(default)]
    pub created_at:   Option<DateTime<Utc>>,
    #[serde(default)]
    pub state:        String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestReviewContribution {
    #[serde(default)]
    pub pull_request_review: PullRequestReviewDetail
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContributorName {
    #[serde(default)]
    pub name: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitContribution {
    #[serde(default)]
    pub repository:  RepositoryNameWithOwner,
    #[serde(default)]
    pub user:        Option<ContributorName>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitContributionsByRepository {
    #[serde(default)]
    pub contributions: CountedConnection<CommitContribution>
}

/// `contributionsCollection` of a user restricted to one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    #[serde(default)]
    pub has_any_contributions:                   bool,
    #[serde(default)]
    pub total_commit_contributions:              u64,
    #[serde(default)]
    pub total_issue_contributions:               u64,
    #[serde(default)]
    pub total_pull_request_contributions:        u64,
    #[serde(default)]
    pub total_pull_request_review_contributions: u64,
    #[serde(default)]
    pub issue_contributions:                     CountedConnection<IssueContribution>,
    #[serde(default)]
    pub pull_request_contributions:              CountedConnection<PullRequestContribution>,
    #[serde(default)]
    pub pull_request_review_contributions:       CountedConnection<PullRequestReviewContribution>,
    #[serde(default)]
    pub commit_contributions_by_repository:      Vec<CommitContributionsByRepository>
}

/// Activity of one user across an organization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationActivity {
    pub org:                      String,
    pub org_id:                   String,
    pub user_name:                String,
    pub start_from:               DateTime<Utc>,
    pub contributions_collection: ContributionsCollection
}

/// Result of one activity query, scoped to a repository or an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributionReport {
    Repository(RepositoryActivity),
    Organization(OrganizationActivity)
}

impl ContributionReport {
    /// Whether any activity category reports a non-zero count.
    pub fn has_activity(&self) -> bool {
        match self {
            Self::Repository(activity) => activity.counts().iter().any(|count| *count > 0),
            Self::Organization(activity) => {
                let collection = &activity.contributions_collection;
                collection.has_any_contributions
                    || collection.total_issue_contributions > 0
                    || collection.total_pull_request_contributions > 0
                    || collection.total_pull_request_review_contributions > 0
                    || collection.total_commit_contributions > 0
            }
        }
    }

    /// Human readable activity log. Counts are the remote totals.
    pub fn summary(&self) -> String {
        let mut out = String::from("activity log:\n");
        match self {
            Self::Repository(activity) => {
                let [created, commented, reviewed, prs_created, prs_commented, commits] =
                    activity.counts();
                let _ = write!(
                    out,
                    "    user:          {}\n    repository:    {}/{}\n    since:         {}\n\n    issues\n        created:   {}\n        commented: {}\n    pull requests:\n        reviewed:  {}\n        created:   {}\n        commented: {}\n    commits:       {}\n",
                    activity.user_name,
                    activity.org,
                    activity.repo,
                    activity.start_from.format(TIMESTAMP_FORMAT),
                    created,
                    commented,
                    reviewed,
                    prs_created,
                    prs_commented,
                    commits
                );
            }
            Self::Organization(activity) => {
                let collection = &activity.contributions_collection;
                let _ = write!(
                    out,
                    "    user:          {}\n    organization:  {}\n    since:         {}\n\n    hasContributions: {}\n    issues:        {}\n    pull requests:\n        created:   {}\n        reviewed:  {}\n    commits:       {}\n",
                    activity.user_name,
                    activity.org,
                    activity.start_from.format(TIMESTAMP_FORMAT),
                    collection.has_any_contributions,
                    collection.total_issue_contributions,
                    collection.total_pull_request_contributions,
                    collection.total_pull_request_review_contributions,
                    collection.total_commit_contributions
                );
            }
        }
        out
    }

    /// Prefix of the per-user detail file; a random suffix and `.yaml` are
    /// appended on creation.
    pub fn log_file_prefix(&self, user_name: &str) -> String {
        match self {
            Self::Repository(activity) => {
                format!("user-activity-{user_name}-{}_{}-", activity.org, activity.repo)
            }
            Self::Organization(activity) => {
                format!("user-activity-{user_name}-{}-", activity.org)
            }
        }
    }

    /// Renders the complete report as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Emit`] when serialization fails.
    pub fn to_yaml(&self) -> Result<String, Error> {
        match self {
            Self::Repository(activity) => serde_yaml::to_string(activity),
            Self::Organization(activity) => serde_yaml::to_string(activity)
        }
        .map_err(emit_error)
    }

    /// Writes the full YAML dump into a new file inside `dir` and returns its
    /// path. The file is kept after the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] when the file cannot be created or persisted
    /// and [`Error::Emit`] when serialization fails.
    pub fn write_to_file(&self, dir: &Path, user_name: &str) -> Result<PathBuf, Error> {
        let content = self.to_yaml()?;
        let mut file = tempfile::Builder::new()
            .prefix(&self.log_file_prefix(user_name))
            .suffix(".yaml")
            .tempfile_in(dir)
            .map_err(|source| write_error(dir, source))?;

        std::io::Write::write_all(&mut file, content.as_bytes())
            .map_err(|source| write_error(file.path(), source))?;

        let (_, path) = file.keep().map_err(|persist| write_error(dir, persist.error))?;
        debug!("user activity log: {}", path.display());
        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::{fixtures::empty_repository_activity, *};

    #[test]
    fn empty_repository_report_has_no_activity() {
        let report = ContributionReport::Repository(empty_repository_activity());
        assert!(!report.has_activity());
    }

    #[test]
    fn commit_history_alone_counts_as_activity() {
        let mut activity = empty_repository_activity();
        activity.commits_by_user = RepositoryCommits {
            default_branch_ref: Some(BranchRef {
                target: Some(CommitTarget {
                    history: CountedConnection {
                        total_count: 3,
                        nodes:       Vec::new()
                    }
                })
            })
        };
        assert!(ContributionReport::Repository(activity).has_activity());
    }

    #[test]
    fn summary_reports_remote_totals_not_sample_length() {
        let mut activity = empty_repository_activity();
        activity.issues_created = SearchResult {
            issue_count: 42,
            nodes:       vec![IssueNode::default(); 5]
        };
        let summary = ContributionReport::Repository(activity).summary();

        assert!(summary.starts_with("activity log:\n"));
        assert!(summary.contains("repository:    kubevirt/kubevirt"));
        assert!(summary.contains("since:         2024-01-15 10:00:00"));
        assert!(summary.contains("created:   42"));
    }

    #[test]
    fn organization_activity_uses_collection_flags() {
        let activity = OrganizationActivity {
            org:                      "kubevirt".to_owned(),
            org_id:                   "O_kgDO".to_owned(),
            user_name:                "octocat".to_owned(),
            start_from:               Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            contributions_collection: ContributionsCollection {
                total_pull_request_review_contributions: 2,
                ..ContributionsCollection::default()
            }
        };
        let report = ContributionReport::Organization(activity);
        assert!(report.has_activity());
        assert!(report.summary().contains("organization:  kubevirt"));
        assert_eq!(report.log_file_prefix("octocat"), "user-activity-octocat-kubevirt-");
    }

    #[test]
    fn write_to_file_uses_naming_pattern() {
        let dir = tempdir().expect("failed to create tempdir");
        let report = ContributionReport::Repository(empty_repository_activity());

        let path = report.write_to_file(dir.path(), "octocat").expect("write failed");

        let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(file_name.starts_with("user-activity-octocat-kubevirt_kubevirt-"));
        assert!(file_name.ends_with(".yaml"));
        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.contains("userName: octocat"));
        assert!(content.contains("issuesCreated:"));
    }

    #[test]
    fn search_nodes_of_other_types_decode_as_defaults() {
        let json = r#"{"issueCount": 2, "nodes": [{}, {"number": 7, "title": "t", "url": "u"}]}"#;
        let result: SearchResult<IssueNode> = serde_json::from_str(json).expect("valid json");
        assert_eq!(result.issue_count, 2);
        assert_eq!(result.nodes[1].number, 7);
    }
}
