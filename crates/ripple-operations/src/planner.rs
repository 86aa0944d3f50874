use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use ripple_core::{ChangeKind, ChangeRecord, next_version};
use ripple_workspace::Workspace;
use tracing::debug;

use crate::loader::LoadedRecords;
use crate::types::BumpDecision;

/// Computes the final change kind and next version for every package.
///
/// The propagation runs as an explicit worklist over package names with a
/// strictly-increased guard on every enqueue: kinds only ever move up the
/// `none < prerelease < patch < minor < major` order, and the order is
/// finite, so the loop terminates even though groups and dependents can form
/// cycles.
#[must_use]
pub fn compute_decision(
    workspace: &Workspace,
    loaded: &LoadedRecords,
    bump_dependents: bool,
    prerelease_id: &str,
) -> BumpDecision {
    let mut calculated: IndexMap<String, ChangeKind> = workspace
        .packages
        .keys()
        .map(|name| (name.clone(), ChangeKind::None))
        .collect();
    let mut decision = BumpDecision {
        records: loaded.records.clone(),
        record_files: loaded.files.clone(),
        ..BumpDecision::default()
    };

    // seed from the surviving records, downgrading through disallowed lists
    let mut dependent_proposals: HashMap<&str, ChangeKind> = HashMap::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    for record in &loaded.records {
        let Some(current) = calculated.get_mut(&record.package) else {
            continue;
        };
        let seeded = record
            .kind
            .allowed(&workspace.disallowed_kinds(&record.package));
        if seeded > *current {
            *current = seeded;
        }
        let proposal = dependent_proposals
            .entry(record.package.as_str())
            .or_insert(ChangeKind::None);
        *proposal = (*proposal).max(record.dependent_kind());
        queue.push_back(record.package.clone());
    }

    while let Some(package) = queue.pop_front() {
        let kind = calculated
            .get(&package)
            .copied()
            .unwrap_or(ChangeKind::None);
        if kind == ChangeKind::None {
            continue;
        }

        // group merge: every member rises to the group's maximum
        if let Some(group) = workspace.group_of(&package) {
            let group_max = group
                .members
                .iter()
                .map(|member| {
                    calculated
                        .get(member)
                        .copied()
                        .unwrap_or(ChangeKind::None)
                        .allowed(&workspace.disallowed_kinds(member))
                })
                .fold(kind, ChangeKind::max);

            for member in group.members.clone() {
                if is_private(workspace, &member) {
                    continue;
                }
                let current = calculated.get(&member).copied().unwrap_or(ChangeKind::None);
                if current < group_max {
                    debug!(package = %member, from = %current, to = %group_max, "group merge raised kind");
                    calculated.insert(member.clone(), group_max);
                    if member != package {
                        decision
                            .dependent_changed_by
                            .entry(member.clone())
                            .or_default()
                            .insert(package.clone());
                    }
                    queue.push_back(member);
                }
            }
        }

        // dependent merge, restricted to in-scope, non-private dependents
        if bump_dependents {
            let proposal_base = dependent_proposals
                .get(package.as_str())
                .copied()
                .unwrap_or(ChangeKind::Patch);
            let dependents: Vec<String> = workspace
                .direct_dependents(&package)
                .map(ToString::to_string)
                .collect();
            for dependent in dependents {
                if !workspace.in_scope(&dependent) || is_private(workspace, &dependent) {
                    continue;
                }
                let proposed = proposal_base.allowed(&workspace.disallowed_kinds(&dependent));
                let current = calculated
                    .get(&dependent)
                    .copied()
                    .unwrap_or(ChangeKind::None);
                if current < proposed {
                    debug!(package = %dependent, from = %current, to = %proposed, cause = %package, "dependent merge raised kind");
                    calculated.insert(dependent.clone(), proposed);
                    decision
                        .dependent_changed_by
                        .entry(dependent.clone())
                        .or_default()
                        .insert(package.clone());
                    queue.push_back(dependent);
                }
            }
        }
    }

    // version materialization: private packages and kind-none packages keep
    // their existing version
    for (name, kind) in &calculated {
        if *kind == ChangeKind::None || is_private(workspace, name) {
            continue;
        }
        let Some(manifest) = workspace.get(name) else {
            continue;
        };
        let version = next_version(&manifest.version, *kind, prerelease_id);
        decision.versions.insert(name.clone(), version);
        decision.modified.insert(name.clone());
    }

    decision.kinds = calculated;
    decision
}

fn is_private(workspace: &Workspace, name: &str) -> bool {
    workspace.get(name).is_some_and(|p| p.private)
}
