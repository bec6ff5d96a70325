// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Activity queries for a single user.
///
/// A report is either scoped to one repository, answered by six search and
/// history selections, or to a whole organization, answered by the user's
/// `contributionsCollection`. Each report is fetched as a unit inside the
/// retry combinator: a failed attempt discards everything and starts over.
use chrono::{DateTime, Months, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    activity::{
        CommentedNode, ContributionReport, ContributionsCollection, IssueNode,
        OrganizationActivity, PullRequestNode, RepositoryActivity, RepositoryCommits,
        ReviewedPullRequestNode, SearchResult,
    },
    error::Error,
    graphql::{GraphQlExecutor, GraphQlRequest, run_query},
    retry::{RetryConfig, retry_with_backoff},
};

const USER_ID_QUERY: &str = "query($username: String!) { user(login: $username) { id } }";

const ORGANIZATION_ID_QUERY: &str =
    "query($organizationName: String!) { organization(login: $organizationName) { id } }";

const REPOSITORY_ACTIVITY_QUERY: &str = r"
query(
  $org: String!,
  $repo: String!,
  $username: String!,
  $userId: ID!,
  $startFrom: GitTimestamp!,
  $authorSearchQuery: String!,
  $commenterSearchQuery: String!,
  $pullRequestsCreatedQuery: String!,
  $pullRequestsReviewedQuery: String!,
  $pullRequestsCommentedQuery: String!
) {
  issuesCreated: search(first: 5, type: ISSUE, query: $authorSearchQuery) {
    issueCount
    nodes { ... on Issue { number title url repository { name } author { login } createdAt } }
  }
  issuesCommented: search(first: 5, type: ISSUE, query: $commenterSearchQuery) {
    issueCount
    nodes {
      ... on Issue {
        number title url repository { name } author { login }
        comments(first: 100, orderBy: {field: UPDATED_AT, direction: ASC}) {
          nodes { author { login } createdAt url }
        }
      }
    }
  }
  prsCreated: search(type: ISSUE, first: 5, query: $pullRequestsCreatedQuery) {
    issueCount
    nodes { ... on PullRequest { number title url createdAt author { login } } }
  }
  prsReviewed: search(type: ISSUE, first: 5, query: $pullRequestsReviewedQuery) {
    issueCount
    nodes {
      ... on PullRequest {
        title number url createdAt
        reviews(first: 5, author: $username) { totalCount nodes { state url } }
      }
    }
  }
  prsCommented: search(last: 100, type: ISSUE, query: $pullRequestsCommentedQuery) {
    issueCount
    nodes {
      ... on PullRequest {
        number title url repository { name } author { login }
        comments(first: 100, orderBy: {field: UPDATED_AT, direction: ASC}) {
          nodes { author { login } createdAt url }
        }
      }
    }
  }
  commitsByUser: repository(owner: $org, name: $repo) {
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: 5, author: {id: $userId}, since: $startFrom) {
            totalCount
            nodes { commitUrl associatedPullRequests(first: 5) { nodes { number title url } } }
          }
        }
      }
    }
  }
}
";

const ORGANIZATION_ACTIVITY_QUERY: &str = r"
query($username: String!, $organizationId: ID!, $startFrom: DateTime!) {
  user(login: $username) {
    contributionsCollection(organizationID: $organizationId, from: $startFrom) {
      hasAnyContributions
      totalCommitContributions
      totalIssueContributions
      totalPullRequestContributions
      totalPullRequestReviewContributions
      issueContributions(first: 1, orderBy: {direction: DESC}) {
        totalCount
        nodes { issue { url } occurredAt }
      }
      pullRequestContributions(first: 1, orderBy: {direction: DESC}) {
        totalCount
        nodes { pullRequest { url } occurredAt }
      }
      pullRequestReviewContributions(first: 1, orderBy: {direction: DESC}) {
        totalCount
        nodes {
          pullRequestReview { repository { nameWithOwner } pullRequest { url } createdAt state }
        }
      }
      commitContributionsByRepository(maxRepositories: 10) {
        contributions(first: 10, orderBy: {field: OCCURRED_AT, direction: DESC}) {
          totalCount
          nodes { repository { nameWithOwner } user { name } occurredAt }
        }
      }
    }
  }
}
";

/// Scope and lookback of one activity query.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ActivityWindow
{
    org:    String,
    repo:   Option<String,>,
    user:   String,
    months: u32,
}

impl ActivityWindow
{
    /// Creates a window; an empty repository name means organization scope.
    pub fn new(org: impl Into<String,>, repo: Option<&str,>, user: impl Into<String,>, months: u32,) -> Self
    {
        Self {
            org: org.into(),
            repo: repo.filter(|name| !name.is_empty(),).map(str::to_owned,),
            user: user.into(),
            months,
        }
    }

    pub fn org(&self,) -> &str
    {
        &self.org
    }

    pub fn repo(&self,) -> Option<&str,>
    {
        self.repo.as_deref()
    }

    pub fn user(&self,) -> &str
    {
        &self.user
    }

    /// Absolute start of the window, `months` calendar months before `now`.
    pub fn start_from(&self, now: DateTime<Utc,>,) -> DateTime<Utc,>
    {
        now.checked_sub_months(Months::new(self.months,),).unwrap_or(DateTime::<Utc,>::MIN_UTC,)
    }
}

/// Day boundary used in search expressions.
fn search_date(start_from: DateTime<Utc,>,) -> String
{
    start_from.format("%Y-%m-%d",).to_string()
}

/// Search expressions for the five repository-scoped searches, in the
/// order: issues authored, issues commented, PRs authored, PRs reviewed,
/// PRs commented.
pub fn repository_search_queries(org: &str, repo: &str, user: &str, start_from: DateTime<Utc,>,) -> [String; 5]
{
    let date = search_date(start_from,);
    let scope = format!("repo:{org}/{repo}");
    [
        format!("{scope} author:{user} is:issue created:>={date}"),
        format!("{scope} commenter:{user} is:issue created:>={date}"),
        format!("{scope} author:{user} is:pr created:>={date}"),
        format!("{scope} reviewed-by:{user} is:pr updated:>={date}"),
        format!("{scope} commenter:{user} is:pr updated:>={date}"),
    ]
}

#[derive(Debug, Deserialize,)]
struct NodeId
{
    id: String,
}

#[derive(Debug, Deserialize,)]
struct UserIdData
{
    user: Option<NodeId,>,
}

#[derive(Debug, Deserialize,)]
struct OrganizationIdData
{
    organization: Option<NodeId,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct RepositoryActivityData
{
    #[serde(default)]
    issues_created:   SearchResult<IssueNode,>,
    #[serde(default)]
    issues_commented: SearchResult<CommentedNode,>,
    #[serde(default)]
    prs_created:      SearchResult<PullRequestNode,>,
    #[serde(default)]
    prs_reviewed:     SearchResult<ReviewedPullRequestNode,>,
    #[serde(default)]
    prs_commented:    SearchResult<CommentedNode,>,
    #[serde(default)]
    commits_by_user:  Option<RepositoryCommits,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct UserContributions
{
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize,)]
struct OrganizationActivityData
{
    user: Option<UserContributions,>,
}

/// Fetches contribution reports through a [`GraphQlExecutor`].
#[derive(Debug, Clone,)]
pub struct ContributionReportGenerator<E,>
{
    executor: E,
    org:      String,
    repo:     Option<String,>,
    months:   u32,
    retry:    RetryConfig,
}

impl<E: GraphQlExecutor,> ContributionReportGenerator<E,>
{
    /// Creates a generator for `org` (and `repo` when set) looking back
    /// `months` months.
    pub fn new(executor: E, org: impl Into<String,>, repo: Option<&str,>, months: u32,) -> Self
    {
        Self {
            executor,
            org: org.into(),
            repo: repo.filter(|name| !name.is_empty(),).map(str::to_owned,),
            months,
            retry: RetryConfig::default(),
        }
    }

    pub fn org(&self,) -> &str
    {
        &self.org
    }

    pub fn repo(&self,) -> Option<&str,>
    {
        self.repo.as_deref()
    }

    /// The executor queries are sent through.
    pub fn executor(&self,) -> &E
    {
        &self.executor
    }

    /// Window for `user` with this generator's scope.
    pub fn window(&self, user: &str,) -> ActivityWindow
    {
        ActivityWindow::new(self.org.clone(), self.repo.as_deref(), user, self.months,)
    }

    /// Produces the report for `user`, with the window ending now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] wrapping the last failure once both
    /// attempts failed.
    pub async fn generate_report(&self, user: &str,) -> Result<ContributionReport, Error,>
    {
        let window = self.window(user,);
        let start_from = window.start_from(Utc::now(),);
        self.fetch_activity(&window, start_from,).await
    }

    /// Fetches the report for `window` starting at `start_from`, retrying the
    /// complete fetch once on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] wrapping the last failure once the retry
    /// budget is spent.
    pub async fn fetch_activity(
        &self,
        window: &ActivityWindow,
        start_from: DateTime<Utc,>,
    ) -> Result<ContributionReport, Error,>
    {
        let operation = format!("activity query for {}", window.user());
        retry_with_backoff(&self.retry, &operation, || self.fetch_once(window, start_from,),)
            .await
            .map_err(|e| Error::service(format!("query failed (aborting): {}", e.detail()),),)
    }

    async fn fetch_once(
        &self,
        window: &ActivityWindow,
        start_from: DateTime<Utc,>,
    ) -> Result<ContributionReport, Error,>
    {
        match window.repo() {
            Some(repo,) => {
                let activity = self.repository_activity(window.org(), repo, window.user(), start_from,).await?;
                Ok(ContributionReport::Repository(activity,),)
            }
            None => {
                let activity = self.organization_activity(window.org(), window.user(), start_from,).await?;
                Ok(ContributionReport::Organization(activity,),)
            }
        }
    }

    async fn user_id(&self, user: &str,) -> Result<String, Error,>
    {
        let request = GraphQlRequest {
            operation: "userId",
            query:     USER_ID_QUERY,
            variables: json!({ "username": user }),
        };
        let data: UserIdData = run_query(&self.executor, &request,).await?;
        data.user.map(|node| node.id,).ok_or_else(|| Error::Query {
            operation: request.operation.to_owned(),
            variables: request.variables.to_string(),
            message:   format!("user '{user}' not found"),
        },)
    }

    async fn organization_id(&self, org: &str,) -> Result<String, Error,>
    {
        let request = GraphQlRequest {
            operation: "organizationId",
            query:     ORGANIZATION_ID_QUERY,
            variables: json!({ "organizationName": org }),
        };
        let data: OrganizationIdData = run_query(&self.executor, &request,).await?;
        data.organization.map(|node| node.id,).ok_or_else(|| Error::Query {
            operation: request.operation.to_owned(),
            variables: request.variables.to_string(),
            message:   format!("organization '{org}' not found"),
        },)
    }

    async fn repository_activity(
        &self,
        org: &str,
        repo: &str,
        user: &str,
        start_from: DateTime<Utc,>,
    ) -> Result<RepositoryActivity, Error,>
    {
        let user_id = self.user_id(user,).await?;
        let [author, commenter, prs_created, prs_reviewed, prs_commented] =
            repository_search_queries(org, repo, user, start_from,);

        let request = GraphQlRequest {
            operation: "repositoryActivity",
            query:     REPOSITORY_ACTIVITY_QUERY,
            variables: json!({
                "org": org,
                "repo": repo,
                "username": user,
                "userId": user_id,
                "startFrom": start_from.to_rfc3339(),
                "authorSearchQuery": author,
                "commenterSearchQuery": commenter,
                "pullRequestsCreatedQuery": prs_created,
                "pullRequestsReviewedQuery": prs_reviewed,
                "pullRequestsCommentedQuery": prs_commented,
            }),
        };
        let data: RepositoryActivityData = run_query(&self.executor, &request,).await?;
        debug!("Received repository activity for {} in {}/{}", user, org, repo);

        Ok(RepositoryActivity {
            org: org.to_owned(),
            repo: repo.to_owned(),
            user_name: user.to_owned(),
            user_id,
            start_from,
            issues_created: data.issues_created,
            issues_commented: data.issues_commented,
            pull_requests_created: data.prs_created,
            pull_requests_reviewed: data.prs_reviewed,
            pull_requests_commented: data.prs_commented,
            commits_by_user: data.commits_by_user.unwrap_or_default(),
        },)
    }

    async fn organization_activity(
        &self,
        org: &str,
        user: &str,
        start_from: DateTime<Utc,>,
    ) -> Result<OrganizationActivity, Error,>
    {
        let org_id = self.organization_id(org,).await?;

        let request = GraphQlRequest {
            operation: "organizationActivity",
            query:     ORGANIZATION_ACTIVITY_QUERY,
            variables: json!({
                "username": user,
                "organizationId": org_id,
                "startFrom": start_from.to_rfc3339(),
            }),
        };
        let data: OrganizationActivityData = run_query(&self.executor, &request,).await?;
        let collection = data.user.ok_or_else(|| Error::Query {
            operation: request.operation.to_owned(),
            variables: request.variables.to_string(),
            message:   format!("user '{user}' not found"),
        },)?;
        info!("Received organization activity for {} in {}", user, org);

        Ok(OrganizationActivity {
            org: org.to_owned(),
            org_id,
            user_name: user.to_owned(),
            start_from,
            contributions_collection: collection.contributions_collection,
        },)
    }
}
