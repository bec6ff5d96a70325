//! Governance tooling for an open-source community.
//!
//! The library reads the community configuration files (SIG list,
//! organization membership, OWNERS and OWNERS_ALIASES, label catalog,
//! alumni list), queries the GitHub GraphQL API for recent user activity,
//! classifies users by activity and cross-checks the SIG list against live
//! data. Every operation is a single sequential pass; the `community`
//! binary wires them into subcommands.

mod activity;
mod alumni;
mod contributions;
mod error;
mod file;
mod graphql;
mod labels;
mod membership;
mod orgs;
mod owners;
mod reporter;
mod repo_groups;
mod retry;
mod sig_list;
mod sigs;
mod skip;
mod validator;

pub use activity::{
    ContributionReport, ContributionsCollection, OrganizationActivity, RepositoryActivity,
    SearchResult
};
pub use alumni::{AlumniFile, Alumnus, read_alumni, render_alumni, write_alumni};
pub use contributions::{ActivityWindow, ContributionReportGenerator, repository_search_queries};
pub use error::{Error, io_error, write_error};
pub use file::{read_yaml, to_yaml, write_output, write_preserving_permissions};
pub use graphql::{GraphQlExecutor, GraphQlRequest, OctocrabExecutor, read_token, run_query};
pub use labels::{Label, LabelSet, LabelsYaml, read_labels};
pub use membership::MembershipSources;
pub use orgs::{Org, Orgs, read_orgs};
pub use owners::{Owners, OwnersAliases, read_owners, read_owners_aliases};
pub use reporter::{
    Report, ReportOptions, ReportResult, Reporter, ReportingMode, generate_reports
};
pub use repo_groups::{
    RepoGroup, extract_repo_groups, render_repo_groups_sql, repo_name, write_repo_groups
};
pub use retry::{RetryConfig, retry_with_backoff};
pub use sig_list::{render_sig_list, write_sig_list};
pub use sigs::{
    Contact, Group, Leadership, Meeting, OrgMember, Sigs, SubProject, Team, read_sigs
};
pub use skip::{SkipExemption, SkipRules};
pub use validator::{HttpOwnersProbe, OwnersProbe, validate_group, validate_sigs, write_sigs};
