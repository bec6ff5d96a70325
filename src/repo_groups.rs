// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repo-group SQL for the devstats dashboards.
///
/// Every SIG owns the repositories its subprojects reference through raw
/// OWNERS URLs. The generated statement assigns those repositories to the
/// SIG in `gha_repos`.
use std::{collections::BTreeSet, path::Path, sync::LazyLock};

use regex::Regex;
use tracing::info;

use crate::{
    error::Error,
    file::write_output,
    sigs::Sigs
};

static REPO_NAME: LazyLock<Result<Regex, regex::Error,>,> =
    LazyLock::new(|| Regex::new(r"^https://raw.githubusercontent.com/([^/]+/[^/]+)/.*$",),);

/// Repositories assigned to one SIG.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepoGroup
{
    pub name:  String,
    pub alias: String,
    /// Sorted, without duplicates.
    pub repos: Vec<String,>,
}

/// Extracts `owner/repo` from a raw OWNERS URL.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the URL does not point at
/// `raw.githubusercontent.com`.
pub fn repo_name(owners_ref: &str,) -> Result<&str, Error,>
{
    let matcher = REPO_NAME
        .as_ref()
        .map_err(|e| Error::validation(format!("invalid repository pattern: {e}"),),)?;
    matcher
        .captures(owners_ref,)
        .and_then(|captures| captures.get(1,),)
        .map(|m| m.as_str(),)
        .ok_or_else(|| Error::validation(format!("ownerRef {owners_ref:?} doesn't match"),),)
}

/// Collects one [`RepoGroup`] per SIG with at least one repository.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first OWNERS reference that is not
/// a raw GitHub URL.
pub fn extract_repo_groups(sigs: &Sigs,) -> Result<Vec<RepoGroup,>, Error,>
{
    let mut groups = Vec::new();
    for sig in &sigs.sigs {
        let mut repos = BTreeSet::new();
        for subproject in &sig.subprojects {
            for owners_ref in &subproject.owners {
                repos.insert(repo_name(owners_ref,)?.to_owned(),);
            }
        }
        if repos.is_empty() {
            continue;
        }
        groups.push(RepoGroup {
            name:  sig.name.clone(),
            alias: sig.dir.clone(),
            repos: repos.into_iter().collect(),
        },);
    }
    Ok(groups,)
}

/// Renders the `update gha_repos` statement for `groups`.
pub fn render_repo_groups_sql(groups: &[RepoGroup],) -> String
{
    let mut rows = Vec::new();
    for group in groups {
        rows.push(format!("      -- {}", group.name),);
        for repo in &group.repos {
            rows.push(format!("      ('{}', '{}')", sql_literal(repo,), sql_literal(&group.name,)),);
        }
    }

    // commas separate value tuples only, never comment lines
    let value_rows: Vec<usize,> =
        rows.iter().enumerate().filter(|(_, row,)| !row.trim_start().starts_with("--",),).map(|(i, _,)| i,).collect();
    if let Some((_, init,),) = value_rows.split_last() {
        for &index in init {
            rows[index].push(',',);
        }
    }

    let mut sql = String::from("update gha_repos r\nset repo_group = rg.repo_group, alias = rg.repo_group\nfrom (\n    values\n",);
    for row in &rows {
        sql.push_str(row,);
        sql.push('\n',);
    }
    sql.push_str("  ) AS rg(repo_name, repo_group)\nwhere r.name = rg.repo_name;\n",);
    sql
}

fn sql_literal(value: &str,) -> String
{
    value.replace('\'', "''",)
}

/// Extracts the groups from `sigs` and writes the SQL to `output_path`.
///
/// # Errors
///
/// Returns [`Error::Validation`] for malformed OWNERS references and
/// [`Error::Write`] when the file cannot be written.
pub fn write_repo_groups(sigs: &Sigs, output_path: &Path,) -> Result<(), Error,>
{
    let groups = extract_repo_groups(sigs,)?;
    write_output(output_path, &render_repo_groups_sql(&groups,),)?;
    info!("output written to {:?}", output_path.display().to_string());
    Ok((),)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::sigs::{Group, SubProject};

    fn group(name: &str, repos: &[&str],) -> RepoGroup
    {
        RepoGroup {
            name:  name.to_owned(),
            alias: "bled".to_owned(),
            repos: repos.iter().map(|r| (*r).to_owned(),).collect(),
        }
    }

    #[test]
    fn two_groups()
    {
        let sql = render_repo_groups_sql(&[
            group("sig-testing", &["kubevirt/kubevirt", "kubevirt/test",],),
            group("sig-ci", &["kubevirt/ci-health", "kubevirt/kubevirtci",],),
        ],);

        assert!(sql.contains(
            "from (
    values
      -- sig-testing
      ('kubevirt/kubevirt', 'sig-testing'),
      ('kubevirt/test', 'sig-testing'),
      -- sig-ci
      ('kubevirt/ci-health', 'sig-ci'),
      ('kubevirt/kubevirtci', 'sig-ci')
  ) AS"
        ));
    }

    #[test]
    fn three_groups()
    {
        let sql = render_repo_groups_sql(&[
            group("sig-testing", &["kubevirt/kubevirt", "kubevirt/test",],),
            group("sig-ci", &["kubevirt/ci-health", "kubevirt/kubevirtci",],),
            group("sig-buildsystem", &["kubevirt/kubevirt", "kubevirt/project-infra",],),
        ],);

        assert!(sql.contains(
            "from (
    values
      -- sig-testing
      ('kubevirt/kubevirt', 'sig-testing'),
      ('kubevirt/test', 'sig-testing'),
      -- sig-ci
      ('kubevirt/ci-health', 'sig-ci'),
      ('kubevirt/kubevirtci', 'sig-ci'),
      -- sig-buildsystem
      ('kubevirt/kubevirt', 'sig-buildsystem'),
      ('kubevirt/project-infra', 'sig-buildsystem')
  ) AS"
        ));
        assert!(sql.starts_with("update gha_repos r\n"));
        assert!(sql.ends_with("where r.name = rg.repo_name;\n"));
    }

    #[test]
    fn extraction_sorts_deduplicates_and_skips_empty_groups()
    {
        let sigs = Sigs {
            sigs: vec![
                Group {
                    name: "sig-ci".to_owned(),
                    dir: "sig-ci".to_owned(),
                    subprojects: vec![
                        SubProject {
                            owners: vec![
                                "https://raw.githubusercontent.com/kubevirt/project-infra/main/OWNERS".to_owned(),
                                "https://raw.githubusercontent.com/kubevirt/kubevirtci/main/OWNERS".to_owned(),
                            ],
                            ..SubProject::default()
                        },
                        SubProject {
                            owners: vec![
                                "https://raw.githubusercontent.com/kubevirt/project-infra/main/robots/OWNERS"
                                    .to_owned(),
                            ],
                            ..SubProject::default()
                        },
                    ],
                    ..Group::default()
                },
                Group {
                    name: "sig-empty".to_owned(),
                    ..Group::default()
                },
            ],
            ..Sigs::default()
        };

        let groups = extract_repo_groups(&sigs,).expect("valid references",);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].alias, "sig-ci");
        assert_eq!(groups[0].repos, ["kubevirt/kubevirtci", "kubevirt/project-infra"]);
    }

    #[test]
    fn non_raw_reference_is_rejected()
    {
        let error = repo_name("https://github.com/kubevirt/kubevirt/blob/main/OWNERS",).expect_err("should not match",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn empty_input_renders_valid_statement()
    {
        let sql = render_repo_groups_sql(&[],);
        assert!(sql.contains("    values\n  ) AS rg"));
    }
}
