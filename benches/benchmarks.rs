// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use community::{MembershipSources, Org, Owners, OwnersAliases, Sigs, extract_repo_groups};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn sigs_yaml(groups: usize,) -> String
{
    let mut yaml = String::from("sigs:\n",);
    for i in 0..groups {
        yaml.push_str(&format!(
            "  - name: sig-{i}\n    dir: sig-{i}\n    label: sig/{i}\n    leadership:\n      chairs:\n        - github: chair{i}\n    subprojects:\n      - name: sub-{i}\n        owners:\n          - https://raw.githubusercontent.com/kubevirt/repo{i}/main/OWNERS\n"
        ),);
    }
    yaml
}

fn benchmark_sigs_parse(c: &mut Criterion,)
{
    let yaml = sigs_yaml(50,);

    c.bench_function("parse_50_sigs", |b| {
        b.iter(|| serde_yaml::from_str::<Sigs,>(black_box(&yaml,),).expect("parse failed",),)
    },);
}

fn benchmark_repo_groups(c: &mut Criterion,)
{
    let sigs: Sigs = serde_yaml::from_str(&sigs_yaml(50,),).expect("parse failed",);

    c.bench_function("extract_repo_groups_50_sigs", |b| {
        b.iter(|| extract_repo_groups(black_box(&sigs,),).expect("extraction failed",),)
    },);
}

fn benchmark_membership_resolution(c: &mut Criterion,)
{
    let owners = Owners {
        reviewers: (0..200).map(|i| format!("reviewer{i}"),).collect(),
        approvers: (0..20).map(|i| format!("alias{i}"),).collect(),
        ..Owners::default()
    };
    let aliases = OwnersAliases {
        aliases: (0..20)
            .map(|i| (format!("alias{i}"), (0..10).map(|j| format!("member{}", i * 10 + j),).collect(),),)
            .collect::<BTreeMap<_, _,>>(),
    };
    let org = Org {
        members: (0..500).map(|i| format!("member{i}"),).collect(),
        ..Org::default()
    };

    c.bench_function("resolve_owners_with_aliases", |b| {
        let sources = MembershipSources {
            owners:      Some(&owners,),
            aliases:     Some(&aliases,),
            org_members: None,
        };
        b.iter(|| black_box(sources,).resolve(),)
    },);

    c.bench_function("resolve_org_members", |b| {
        let sources = MembershipSources {
            org_members: Some(&org,),
            ..MembershipSources::default()
        };
        b.iter(|| black_box(sources,).resolve(),)
    },);
}

criterion_group!(benches, benchmark_sigs_parse, benchmark_repo_groups, benchmark_membership_resolution);
criterion_main!(benches);
