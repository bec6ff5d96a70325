// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Renders `sigs.yaml` into the Markdown overview `sig-list.md`.
///
/// One section per category (SIGs, working groups, user groups,
/// committees); empty categories are left out.
use std::path::Path;

use tracing::info;

use crate::{
    error::Error,
    file::write_output,
    sigs::{Group, Meeting, OrgMember, Sigs}
};

const HEADER: &str = "<!-- Generated from sigs.yaml; do not edit by hand. -->\n\n# Community groups\n";

/// Renders the complete sig list document.
pub fn render_sig_list(sigs: &Sigs) -> String {
    let mut out = String::from(HEADER);

    for (kind, groups) in sigs.categories() {
        if groups.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {}\n\n", category_title(kind)));
        out.push_str(&generate_group_table(groups));
    }

    out
}

/// Renders `sigs` and writes the document to `output_path`.
///
/// # Errors
///
/// Returns [`Error::Write`] when the output cannot be written.
pub fn write_sig_list(sigs: &Sigs, output_path: &Path) -> Result<(), Error> {
    write_output(output_path, &render_sig_list(sigs))?;
    info!("sig list written to {}", output_path.display());
    Ok(())
}

fn category_title(kind: &str) -> &'static str {
    match kind {
        "sig" => "Special Interest Groups",
        "wg" => "Working Groups",
        "ug" => "User Groups",
        _ => "Committees"
    }
}

fn generate_group_table(groups: &[Group]) -> String {
    let mut table =
        String::from("| Name | Directory | Leads | Contact | Meetings |\n|------|-----------|-------|---------|----------|\n");

    for group in groups {
        let directory = if group.dir.is_empty() {
            String::new()
        } else {
            format!("[{0}](./{0}/)", escape_cell(&group.dir))
        };

        table.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&group.name),
            directory,
            leads(group),
            contact(group),
            meetings(&group.meetings)
        ));
    }

    table
}

/// Leadership chairs when present, the plain lead list otherwise.
fn leads(group: &Group) -> String {
    let members: &[OrgMember] = match &group.leadership {
        Some(leadership) if !leadership.chairs.is_empty() => &leadership.chairs,
        _ => &group.leads
    };
    members.iter().map(member_link).collect::<Vec<_>>().join("<br>")
}

fn member_link(member: &OrgMember) -> String {
    let link = format!("[@{0}](https://github.com/{0})", escape_cell(&member.github));
    if member.name.is_empty() {
        link
    } else {
        format!("{} ({link})", escape_cell(&member.name))
    }
}

fn contact(group: &Group) -> String {
    let Some(contact) = &group.contact else {
        return String::new();
    };

    let mut entries = Vec::new();
    if !contact.slack.is_empty() {
        entries.push(format!("[Slack]({})", contact.slack));
    }
    if !contact.mailing_list.is_empty() {
        entries.push(format!("[Mailing list]({})", contact.mailing_list));
    }
    if let Some(liaison) = &contact.liaison {
        entries.push(format!("Liaison: {}", member_link(liaison)));
    }
    entries.join("<br>")
}

fn meetings(meetings: &[Meeting]) -> String {
    meetings
        .iter()
        .map(|meeting| {
            let schedule = [&meeting.frequency, &meeting.day, &meeting.time, &meeting.tz]
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            let description = escape_cell(&meeting.description);
            let summary = match (description.is_empty(), schedule.is_empty()) {
                (false, false) => format!("{description}: {schedule}"),
                (false, true) => description,
                (true, _) => schedule
            };
            if meeting.url.is_empty() {
                summary
            } else {
                format!("[{summary}]({})", meeting.url)
            }
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::sigs::{Contact, Leadership};

    fn sample() -> Sigs {
        Sigs {
            sigs: vec![Group {
                name: "sig-ci".to_owned(),
                dir: "sig-ci".to_owned(),
                leadership: Some(Leadership {
                    chairs: vec![OrgMember {
                        github:  "chair1".to_owned(),
                        name:    "Chair One".to_owned(),
                        company: String::new()
                    }]
                }),
                leads: vec![OrgMember::with_github("lead1")],
                meetings: vec![Meeting {
                    description: "Weekly sync".to_owned(),
                    day: "Monday".to_owned(),
                    time: "14:00".to_owned(),
                    tz: "UTC".to_owned(),
                    frequency: "weekly".to_owned(),
                    url: "https://meet.example.com".to_owned(),
                    ..Meeting::default()
                }],
                contact: Some(Contact {
                    slack: "https://slack.example.com".to_owned(),
                    ..Contact::default()
                }),
                ..Group::default()
            }],
            committees: vec![Group {
                name: "code|of|conduct".to_owned(),
                leads: vec![OrgMember::with_github("member")],
                ..Group::default()
            }],
            ..Sigs::default()
        }
    }

    #[test]
    fn render_includes_only_populated_categories() {
        let doc = render_sig_list(&sample());

        assert!(doc.contains("## Special Interest Groups"));
        assert!(doc.contains("## Committees"));
        assert!(!doc.contains("## Working Groups"));
    }

    #[test]
    fn chairs_take_precedence_over_leads() {
        let doc = render_sig_list(&sample());

        assert!(doc.contains("Chair One ([@chair1](https://github.com/chair1))"));
        assert!(!doc.contains("@lead1"));
        assert!(doc.contains("[@member](https://github.com/member)"));
    }

    #[test]
    fn row_contains_directory_contact_and_meeting() {
        let doc = render_sig_list(&sample());

        assert!(doc.contains(
            "| sig-ci | [sig-ci](./sig-ci/) | Chair One ([@chair1](https://github.com/chair1)) | [Slack](https://slack.example.com) | [Weekly sync: weekly Monday 14:00 UTC](https://meet.example.com) |"
        ));
    }

    #[test]
    fn pipes_in_cells_are_escaped() {
        let doc = render_sig_list(&sample());
        assert!(doc.contains("| code\\|of\\|conduct |"));
    }

    #[test]
    fn write_sig_list_creates_file() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("sig-list.md");

        write_sig_list(&sample(), &path).expect("write failed");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.starts_with("<!-- Generated from sigs.yaml"));
    }
}
