// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Resolution of the user handles a report runs over.

use std::collections::BTreeSet;

use crate::{
    orgs::Org,
    owners::{Owners, OwnersAliases}
};

/// Inputs that contribute handles to a membership list.
///
/// Each source is optional. Resolution expands aliases in the OWNERS names,
/// unions the result with the organization members and returns a sorted
/// list without duplicates. Comparison is case-sensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct MembershipSources<'a> {
    pub owners:      Option<&'a Owners>,
    pub aliases:     Option<&'a OwnersAliases>,
    pub org_members: Option<&'a Org>
}

impl MembershipSources<'_> {
    /// Resolves the sources into a sorted, de-duplicated handle list.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use community::{MembershipSources, Owners, OwnersAliases};
    ///
    /// let owners = Owners {
    ///     reviewers: vec!["team".to_owned(), "zed".to_owned()],
    ///     ..Owners::default()
    /// };
    /// let aliases = OwnersAliases {
    ///     aliases: BTreeMap::from([("team".to_owned(), vec!["bob".to_owned(), "amy".to_owned()])]),
    /// };
    /// let sources = MembershipSources {
    ///     owners: Some(&owners),
    ///     aliases: Some(&aliases),
    ///     org_members: None,
    /// };
    /// assert_eq!(sources.resolve(), ["amy", "bob", "zed"]);
    /// ```
    pub fn resolve(&self) -> Vec<String> {
        let mut handles = BTreeSet::new();

        if let Some(owners) = self.owners {
            let names = owners.active_names();
            match self.aliases {
                Some(aliases) => handles.extend(aliases.resolve(names)),
                None => handles.extend(names.into_iter().map(str::to_owned))
            }
        }

        if let Some(org) = self.org_members {
            handles.extend(org.all_members().map(str::to_owned));
        }

        handles.into_iter().filter(|handle| !handle.is_empty()).collect()
    }

    /// Whether at least one source is present.
    pub fn is_empty(&self) -> bool {
        self.owners.is_none() && self.org_members.is_none()
    }
}
