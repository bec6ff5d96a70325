// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cross-checks `sigs.yaml` against the repository, the label catalog, the
//! organization membership and the referenced OWNERS files.
//!
//! Broken references are logged and removed; nothing found here aborts the
//! run.

use std::{
    future::Future,
    io::{self, Write as _},
    path::Path
};

use tracing::{error, info};

use crate::{
    error::{Error, write_error},
    file::{to_yaml, write_preserving_permissions},
    labels::LabelsYaml,
    orgs::Org,
    sigs::{Group, OrgMember, Sigs}
};

/// Answers the HTTP status of an OWNERS file reference.
pub trait OwnersProbe {
    /// Status code returned by a `HEAD` request to `url`.
    fn status(&self, url: &str) -> impl Future<Output = Result<u16, Error>> + Send;
}

/// [`OwnersProbe`] issuing real `HEAD` requests.
#[derive(Debug, Clone, Default)]
pub struct HttpOwnersProbe {
    client: reqwest::Client
}

impl OwnersProbe for HttpOwnersProbe {
    async fn status(&self, url: &str) -> Result<u16, Error> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| Error::service(format!("HEAD {url} failed: {e}")))?;
        Ok(response.status().as_u16())
    }
}

/// Validates every group of every category in place.
pub async fn validate_sigs<P: OwnersProbe>(sigs: &mut Sigs, labels: &LabelsYaml, org: &Org, probe: &P) {
    for (kind, groups) in sigs.categories_mut() {
        for group in groups.iter_mut() {
            validate_group(kind, group, labels, org, probe).await;
        }
    }
}

/// Validates one group: directory, label, leads, chairs and subprojects.
pub async fn validate_group<P: OwnersProbe>(
    kind: &str,
    group: &mut Group,
    labels: &LabelsYaml,
    org: &Org,
    probe: &P
) {
    let name = group.name.clone();

    if !group.dir.is_empty() {
        let dir = Path::new(&group.dir);
        match dir.metadata() {
            Err(e) => {
                error!(kind, group = %name, "dir {:?} not found: {}", group.dir, e);
                group.dir.clear();
            }
            Ok(metadata) if !metadata.is_dir() => {
                error!(kind, group = %name, "dir {:?} is not a directory", group.dir);
                group.dir.clear();
            }
            Ok(_) => {}
        }
    }

    if !group.label.is_empty() && !labels.has_default_label(&group.label) {
        error!(kind, group = %name, "label {:?} not found", group.label);
        group.label.clear();
    }

    retain_members(&mut group.leads, org, |lead| {
        error!(kind, group = %name, "lead {:?} not found", lead.github);
    });

    if let Some(leadership) = group.leadership.as_mut() {
        retain_members(&mut leadership.chairs, org, |chair| {
            error!(kind, group = %name, "leadership chair {:?} not found", chair.github);
        });
    }

    for subproject in &mut group.subprojects {
        let mut reachable = Vec::with_capacity(subproject.owners.len());
        for url in subproject.owners.drain(..) {
            match probe.status(&url).await {
                Ok(status) if (200..300).contains(&status) => reachable.push(url),
                Ok(status) => {
                    error!(kind, group = %name, subproject = %subproject.name, "failed to retrieve {:?}: {}", url, status);
                }
                Err(e) => {
                    error!(kind, group = %name, subproject = %subproject.name, "failed to retrieve {:?}, continuing with next: {}", url, e);
                }
            }
        }
        subproject.owners = reachable;

        let subproject_name = subproject.name.clone();
        retain_members(&mut subproject.leads, org, |lead| {
            error!(kind, group = %name, subproject = %subproject_name, "lead {:?} not found", lead.github);
        });
    }
}

fn retain_members(members: &mut Vec<OrgMember>, org: &Org, mut on_missing: impl FnMut(&OrgMember)) {
    members.retain(|member| {
        let found = org.has_member(&member.github);
        if !found {
            on_missing(member);
        }
        found
    });
}

/// Serializes `sigs` and prints it (dry run) or writes it back to `path`
/// with the permissions the file already had.
///
/// # Errors
///
/// Returns [`Error::Emit`] on serialization failure, [`Error::Write`] when
/// stdout or the file cannot be written.
pub fn write_sigs(sigs: &Sigs, path: &Path, dry_run: bool) -> Result<(), Error> {
    let output = to_yaml(sigs)?;
    if dry_run {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .map_err(|source| write_error(Path::new("<stdout>"), source))?;
        return Ok(());
    }
    write_preserving_permissions(path, &output)?;
    info!("Wrote validated groups to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use tempfile::tempdir;

    use super::*;
    use crate::{
        labels::{Label, LabelSet},
        sigs::{Leadership, SubProject}
    };

    const OWNERS_OK: &str = "https://raw.githubusercontent.com/kubevirt/community/main/OWNERS";
    const OWNERS_404: &str = "https://raw.githubusercontent.com/kubevirt/non-existing-repo/main/OWNERS";

    /// Returns canned statuses; unknown URLs fail like a network error.
    struct StubProbe(HashMap<&'static str, u16>);

    impl StubProbe {
        fn new() -> Self {
            Self(HashMap::from([(OWNERS_OK, 200), (OWNERS_404, 404)]))
        }
    }

    impl OwnersProbe for StubProbe {
        async fn status(&self, url: &str) -> Result<u16, Error> {
            self.0
                .get(url)
                .copied()
                .ok_or_else(|| Error::service(format!("connection refused: {url}")))
        }
    }

    fn sig(group: Group) -> Sigs {
        Sigs {
            sigs: vec![group],
            ..Sigs::default()
        }
    }

    fn named(name: &str) -> Group {
        Group {
            name: name.to_owned(),
            ..Group::default()
        }
    }

    fn labels(names: &[&str]) -> LabelsYaml {
        LabelsYaml {
            default: LabelSet {
                labels: names
                    .iter()
                    .map(|name| Label {
                        name: (*name).to_owned(),
                        ..Label::default()
                    })
                    .collect()
            },
            ..LabelsYaml::default()
        }
    }

    fn org(members: &[&str]) -> Org {
        Org {
            members: members.iter().map(|m| (*m).to_owned()).collect(),
            ..Org::default()
        }
    }

    async fn validated(input: Sigs, labels: &LabelsYaml, org: &Org) -> Sigs {
        let mut sigs = input;
        validate_sigs(&mut sigs, labels, org, &StubProbe::new()).await;
        sigs
    }

    #[tokio::test]
    async fn missing_directory_is_cleared_idempotently() {
        let input = sig(Group {
            dir: "non-existing-dir".to_owned(),
            ..named("sig-test")
        });

        let once = validated(input, &labels(&[]), &org(&[])).await;
        assert_eq!(once, sig(named("sig-test")));

        let twice = validated(once.clone(), &labels(&[]), &org(&[])).await;
        assert_eq!(twice, once);
    }

    #[tokio::test]
    async fn existing_directory_is_kept() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("existing-dir");
        fs::create_dir(&path).expect("create dir");
        let input = sig(Group {
            dir: path.display().to_string(),
            ..named("sig-test")
        });

        let output = validated(input.clone(), &labels(&[]), &org(&[])).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn file_in_place_of_directory_is_cleared() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("existing-file");
        fs::write(&path, "").expect("create file");
        let input = sig(Group {
            dir: path.display().to_string(),
            ..named("sig-test")
        });

        let output = validated(input, &labels(&[]), &org(&[])).await;
        assert_eq!(output, sig(named("sig-test")));
    }

    #[tokio::test]
    async fn unknown_label_is_cleared() {
        let input = sig(Group {
            label: "nonexisting-label".to_owned(),
            ..named("sig-test")
        });

        let output = validated(input, &labels(&["existing-label"]), &org(&[])).await;
        assert_eq!(output, sig(named("sig-test")));
    }

    #[tokio::test]
    async fn default_label_is_kept() {
        let input = sig(Group {
            label: "existing-label".to_owned(),
            ..named("sig-test")
        });

        let output = validated(input.clone(), &labels(&["existing-label"]), &org(&[])).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn repository_specific_label_does_not_count() {
        let mut catalog = labels(&[""]);
        catalog.repos.insert("somerepo".to_owned(), LabelSet {
            labels: vec![Label {
                name: "existing-label".to_owned(),
                ..Label::default()
            }]
        });
        let input = sig(Group {
            label: "existing-label".to_owned(),
            ..named("sig-test")
        });

        let output = validated(input, &catalog, &org(&[])).await;
        assert_eq!(output, sig(named("sig-test")));
    }

    #[tokio::test]
    async fn leads_and_chairs_must_be_org_members() {
        let input = sig(Group {
            leads: vec![OrgMember::with_github("existing-gh"), OrgMember::with_github("nonexisting-gh")],
            leadership: Some(Leadership {
                chairs: vec![OrgMember::with_github("nonexisting-gh"), OrgMember::with_github("Existing-GH")]
            }),
            ..named("sig-test")
        });

        let output = validated(input, &labels(&[]), &org(&["existing-gh"])).await;

        let group = &output.sigs[0];
        assert_eq!(group.leads, [OrgMember::with_github("existing-gh")]);
        assert_eq!(group.leadership.as_ref().map(|l| l.chairs.clone()), Some(vec![
            OrgMember::with_github("Existing-GH")
        ]));
    }

    #[tokio::test]
    async fn emptied_leadership_is_kept_as_record() {
        let input = sig(Group {
            leadership: Some(Leadership {
                chairs: vec![OrgMember::with_github("nonexisting-gh")]
            }),
            ..named("sig-test")
        });

        let output = validated(input, &labels(&[]), &org(&[])).await;
        assert_eq!(output.sigs[0].leadership, Some(Leadership::default()));
    }

    #[tokio::test]
    async fn unreachable_owners_reference_is_removed() {
        let input = sig(Group {
            subprojects: vec![SubProject {
                name: "x".to_owned(),
                owners: vec![OWNERS_404.to_owned()],
                ..SubProject::default()
            }],
            ..named("sig-test")
        });

        let output = validated(input, &labels(&[]), &org(&[])).await;

        let group = &output.sigs[0];
        assert_eq!(group.name, "sig-test");
        assert_eq!(group.subprojects[0].name, "x");
        assert!(group.subprojects[0].owners.is_empty());
    }

    #[tokio::test]
    async fn reachable_owners_reference_and_member_leads_survive() {
        let input = sig(Group {
            subprojects: vec![SubProject {
                name: "some-subproject".to_owned(),
                owners: vec![OWNERS_OK.to_owned(), "https://unreachable.invalid/OWNERS".to_owned()],
                leads: vec![OrgMember::with_github("existing-gh"), OrgMember::with_github("ghost")],
                ..SubProject::default()
            }],
            ..named("sig-test")
        });

        let output = validated(input, &labels(&[]), &org(&["existing-gh"])).await;

        let subproject = &output.sigs[0].subprojects[0];
        assert_eq!(subproject.owners, [OWNERS_OK]);
        assert_eq!(subproject.leads, [OrgMember::with_github("existing-gh")]);
    }

    #[tokio::test]
    async fn every_category_is_validated() {
        let broken = Group {
            label: "missing".to_owned(),
            ..named("group")
        };
        let mut sigs = Sigs {
            sigs:          vec![broken.clone()],
            workinggroups: vec![broken.clone()],
            usergroups:    vec![broken.clone()],
            committees:    vec![broken]
        };

        validate_sigs(&mut sigs, &labels(&[]), &org(&[]), &StubProbe::new()).await;

        for (_, groups) in sigs.categories() {
            assert!(groups[0].label.is_empty());
        }
    }

    #[cfg(unix)]
    #[test]
    fn write_back_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("sigs.yaml");
        fs::write(&path, "sigs: []\n").expect("seed file");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).expect("chmod");

        write_sigs(&sig(named("sig-test")), &path, false).expect("write failed");

        let content = fs::read_to_string(&path).expect("read back");
        assert!(content.contains("name: sig-test"));
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("sigs.yaml");
        fs::write(&path, "sigs: []\n").expect("seed file");

        write_sigs(&sig(named("sig-test")), &path, true).expect("dry run failed");

        assert_eq!(fs::read_to_string(&path).expect("read back"), "sigs: []\n");
    }
}
