//! Turning a merge history back into clusters.

use pathfinding::undirected::connected_components::connected_components;
use tracing::debug;

use crate::clustering::MergeEvent;

/// Decides whether two multi-member clusters may be joined during a
/// constrained replay.
pub trait MergeGuard {
    fn allows_merge(&self, a: &[usize], b: &[usize]) -> bool;
}

impl<F> MergeGuard for F
where
    F: Fn(&[usize], &[usize]) -> bool,
{
    fn allows_merge(&self, a: &[usize], b: &[usize]) -> bool {
        self(a, b)
    }
}

/// Result of a constrained replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// Partition of all items: members ascending, clusters ordered by their
    /// smallest member
    pub clusters: Vec<Vec<usize>>,
    /// Index into the merge history of the merge the guard refused
    pub stopped_at: Option<usize>,
}

/// Replays merge histories over items `0..n`.
#[derive(Debug, Clone, Copy)]
pub struct ClusterReconstructor {
    n: usize,
}

impl ClusterReconstructor {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Union of every merge. Singletons are included.
    pub fn unconstrained(&self, history: &[MergeEvent]) -> Vec<Vec<usize>> {
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.n];
        for event in history {
            if event.a < self.n && event.b < self.n {
                adjacency[event.a].push(event.b);
                adjacency[event.b].push(event.a);
            }
        }

        let starts: Vec<usize> = (0..self.n).collect();
        let components = connected_components(&starts, |&item| adjacency[item].clone());
        normalize(components.into_iter().map(|set| set.into_iter().collect()))
    }

    /// Replay merges in order, asking `guard` before joining two clusters
    /// that both have more than one member. The first refusal ends the
    /// replay; later merges are ignored.
    pub fn constrained(&self, history: &[MergeEvent], guard: &dyn MergeGuard) -> Reconstruction {
        let mut labels: Vec<usize> = (0..self.n).collect();
        let mut members: Vec<Vec<usize>> = (0..self.n).map(|i| vec![i]).collect();
        let mut stopped_at = None;

        for (idx, event) in history.iter().enumerate() {
            if event.a >= self.n || event.b >= self.n {
                continue;
            }
            let (x, y) = (labels[event.a], labels[event.b]);
            if x == y {
                continue;
            }
            if members[x].len() > 1
                && members[y].len() > 1
                && !guard.allows_merge(&members[x], &members[y])
            {
                debug!(
                    merge = idx,
                    remaining = history.len() - idx,
                    "merge refused, discarding rest of history"
                );
                stopped_at = Some(idx);
                break;
            }

            let (keep, absorb) = (x.min(y), x.max(y));
            let moved = std::mem::take(&mut members[absorb]);
            for &item in &moved {
                labels[item] = keep;
            }
            members[keep].extend(moved);
        }

        Reconstruction {
            clusters: normalize(members.into_iter().filter(|m| !m.is_empty())),
            stopped_at,
        }
    }
}

fn normalize(clusters: impl Iterator<Item = Vec<usize>>) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = clusters
        .map(|mut cluster| {
            cluster.sort_unstable();
            cluster
        })
        .collect();
    clusters.sort_by_key(|cluster| cluster[0]);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(a: usize, b: usize) -> MergeEvent {
        MergeEvent { a, b, score: 1.0 }
    }

    #[test]
    fn test_unconstrained_includes_singletons() {
        let clusters =
            ClusterReconstructor::new(6).unconstrained(&[merge(4, 1), merge(1, 5), merge(0, 2)]);
        assert_eq!(clusters, vec![vec![0, 2], vec![1, 4, 5], vec![3]]);
    }

    #[test]
    fn test_empty() {
        assert!(ClusterReconstructor::new(0).unconstrained(&[]).is_empty());
        let result = ClusterReconstructor::new(0).constrained(&[], &|_: &[usize], _: &[usize]| true);
        assert!(result.clusters.is_empty());
        assert_eq!(result.stopped_at, None);
    }

    #[test]
    fn test_guard_not_consulted_for_singletons() {
        let refuse_all = |_: &[usize], _: &[usize]| false;
        let result = ClusterReconstructor::new(4)
            .constrained(&[merge(0, 1), merge(1, 2), merge(3, 2)], &refuse_all);
        assert_eq!(result.clusters, vec![vec![0, 1, 2, 3]]);
        assert_eq!(result.stopped_at, None);
    }

    #[test]
    fn test_refusal_stops_replay() {
        let refuse_all = |_: &[usize], _: &[usize]| false;
        let history = [merge(0, 1), merge(2, 3), merge(1, 2), merge(4, 5)];
        let result = ClusterReconstructor::new(6).constrained(&history, &refuse_all);
        assert_eq!(result.clusters, vec![vec![0, 1], vec![2, 3], vec![4], vec![5]]);
        assert_eq!(result.stopped_at, Some(2));
    }

    #[test]
    fn test_accepting_guard_matches_unconstrained() {
        let history = [merge(0, 1), merge(2, 3), merge(1, 2), merge(4, 5)];
        let reconstructor = ClusterReconstructor::new(7);
        let result = reconstructor.constrained(&history, &|_: &[usize], _: &[usize]| true);
        assert_eq!(result.clusters, reconstructor.unconstrained(&history));
    }
}
