//! Ref snapshots and change classification.

use std::collections::BTreeMap;

/// Remote-tracking ref name (short form, e.g. `origin/main`) mapped to its
/// commit hash, captured once before and once after a fetch.
pub type RefSnapshot = BTreeMap<String, String>;

/// How an updated ref's new tip relates to its old tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefDelta {
    /// New tip is ahead of the old one by this many commits.
    Advanced(usize),
    /// New tip is strictly behind the old one: the branch was reset backward.
    Reset(usize),
    /// Neither history contains the other: a true rewrite (force-push).
    Rewritten,
}

/// One ref-level difference between the before and after snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefChange {
    /// Ref only present after the fetch.
    New {
        name: String,
        hash: String,
    },
    /// Ref present in both snapshots with different hashes.
    ///
    /// `delta` is filled in by the engine from reachability counts; the pure
    /// snapshot diff leaves it `None`.
    Updated {
        name: String,
        old: String,
        new: String,
        delta: Option<RefDelta>,
    },
    /// Ref only present before the fetch (pruned remotely).
    Pruned {
        name: String,
        hash: String,
    },
}

impl RefChange {
    /// The ref this change concerns.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::New { name, .. } | Self::Updated { name, .. } | Self::Pruned { name, .. } => name,
        }
    }
}

/// Diff two snapshots into a change list, ordered by ref name.
#[must_use]
pub fn diff_snapshots(before: &RefSnapshot, after: &RefSnapshot) -> Vec<RefChange> {
    let mut changes = Vec::new();

    for (name, new_hash) in after {
        match before.get(name) {
            None => changes.push(RefChange::New {
                name: name.clone(),
                hash: new_hash.clone(),
            }),
            Some(old_hash) if old_hash != new_hash => changes.push(RefChange::Updated {
                name: name.clone(),
                old: old_hash.clone(),
                new: new_hash.clone(),
                delta: None,
            }),
            Some(_) => {}
        }
    }

    for (name, old_hash) in before {
        if !after.contains_key(name) {
            changes.push(RefChange::Pruned {
                name: name.clone(),
                hash: old_hash.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.name().cmp(b.name()));
    changes
}

/// Parse `for-each-ref --format='%(refname:short) %(objectname)'` output.
#[must_use]
pub fn parse_ref_snapshot(output: &str) -> RefSnapshot {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let hash = parts.next()?;
            Some((name.to_string(), hash.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> RefSnapshot {
        pairs
            .iter()
            .map(|(name, hash)| ((*name).to_string(), (*hash).to_string()))
            .collect()
    }

    #[test]
    fn test_diff_updated_and_new() {
        let before = snapshot(&[("origin/A", "h1")]);
        let after = snapshot(&[("origin/A", "h2"), ("origin/B", "h3")]);

        let changes = diff_snapshots(&before, &after);
        assert_eq!(
            changes,
            vec![
                RefChange::Updated {
                    name: "origin/A".to_string(),
                    old: "h1".to_string(),
                    new: "h2".to_string(),
                    delta: None,
                },
                RefChange::New {
                    name: "origin/B".to_string(),
                    hash: "h3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_diff_pruned() {
        let before = snapshot(&[("origin/A", "h1"), ("origin/C", "h4")]);
        let after = snapshot(&[("origin/A", "h1")]);

        let changes = diff_snapshots(&before, &after);
        assert_eq!(
            changes,
            vec![RefChange::Pruned {
                name: "origin/C".to_string(),
                hash: "h4".to_string(),
            }]
        );
    }

    #[test]
    fn test_diff_identical_snapshots() {
        let refs = snapshot(&[("origin/A", "h1"), ("origin/B", "h2")]);
        assert!(diff_snapshots(&refs, &refs).is_empty());
    }

    #[test]
    fn test_diff_is_sorted_by_ref_name() {
        let before = snapshot(&[("origin/zeta", "h1")]);
        let after = snapshot(&[("origin/alpha", "h2")]);

        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes[0].name(), "origin/alpha");
        assert_eq!(changes[1].name(), "origin/zeta");
    }

    #[test]
    fn test_parse_ref_snapshot() {
        let output = "origin/main 1111\norigin/feature 2222\n";
        let snap = parse_ref_snapshot(output);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap["origin/main"], "1111");
        assert_eq!(snap["origin/feature"], "2222");
    }

    #[test]
    fn test_parse_ref_snapshot_ignores_blank_lines() {
        let snap = parse_ref_snapshot("\n\norigin/main 1111\n\n");
        assert_eq!(snap.len(), 1);
    }
}
