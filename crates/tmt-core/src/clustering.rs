//! Spatial k-means over living agents.
//!
//! Centroids are seeded from `k` distinct agents' positions (fewer when the
//! population is smaller than `k`). The loop assigns each agent to its
//! nearest centroid by Euclidean distance, moves each centroid to the mean
//! of its assignees, and stops when no assignment changes or the iteration
//! bound is hit. The result is derived per-iteration state and is never
//! persisted.

use std::collections::BTreeMap;

use rand::Rng;
use tmt_types::{AgentId, Position};
use tracing::debug;

/// A cluster centre in continuous grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Column coordinate.
    pub x: f64,
    /// Row coordinate.
    pub y: f64,
}

impl Centroid {
    fn from_position(p: Position) -> Self {
        Self {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }
    }

    /// Euclidean distance to a grid position.
    pub fn distance(&self, p: Position) -> f64 {
        (self.x - f64::from(p.x)).hypot(self.y - f64::from(p.y))
    }
}

/// Outcome of one clustering pass.
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    /// Final centroids; cluster ids index this list.
    pub centroids: Vec<Centroid>,
    /// Cluster id of every clustered agent.
    pub assignments: BTreeMap<AgentId, u32>,
    /// Assign/update rounds performed.
    pub iterations: u32,
}

impl Clustering {
    /// Number of clusters (centroids).
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Whether no clusters were formed.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// The cluster id of an agent.
    pub fn cluster_of(&self, agent: AgentId) -> Option<u32> {
        self.assignments.get(&agent).copied()
    }

    /// The id of the centroid nearest a position.
    pub fn nearest(&self, position: Position) -> Option<u32> {
        nearest_centroid(&self.centroids, position)
    }

    /// Members of every cluster, indexed by cluster id.
    pub fn groups(&self) -> Vec<Vec<AgentId>> {
        let mut groups: Vec<Vec<AgentId>> = vec![Vec::new(); self.centroids.len()];
        for (agent, cluster) in &self.assignments {
            let slot = usize::try_from(*cluster)
                .ok()
                .and_then(|i| groups.get_mut(i));
            if let Some(members) = slot {
                members.push(*agent);
            }
        }
        groups
    }
}

fn nearest_centroid(centroids: &[Centroid], position: Position) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for (index, centroid) in centroids.iter().enumerate() {
        let d = centroid.distance(position);
        let Ok(id) = u32::try_from(index) else {
            break;
        };
        match best {
            Some((_, bd)) if bd <= d => {}
            _ => best = Some((id, d)),
        }
    }
    best.map(|(id, _)| id)
}

/// Partition agents into at most `k` clusters.
///
/// Empty input or `k == 0` yields an empty clustering.
pub fn kmeans(
    agents: &[(AgentId, Position)],
    k: usize,
    max_iterations: u32,
    rng: &mut impl Rng,
) -> Clustering {
    let seeds = k.min(agents.len());
    if seeds == 0 {
        return Clustering::default();
    }
    let mut centroids: Vec<Centroid> = rand::seq::index::sample(rng, agents.len(), seeds)
        .into_iter()
        .filter_map(|i| agents.get(i))
        .map(|(_, p)| Centroid::from_position(*p))
        .collect();

    let mut assignments: BTreeMap<AgentId, u32> = BTreeMap::new();
    let mut iterations = 0_u32;
    while iterations < max_iterations.max(1) {
        iterations = iterations.saturating_add(1);

        let mut changed = false;
        for (id, position) in agents {
            let Some(cluster) = nearest_centroid(&centroids, *position) else {
                continue;
            };
            if assignments.insert(*id, cluster) != Some(cluster) {
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums: Vec<(f64, f64, u32)> = vec![(0.0, 0.0, 0); centroids.len()];
        for (id, position) in agents {
            let slot = assignments
                .get(id)
                .and_then(|c| usize::try_from(*c).ok())
                .and_then(|i| sums.get_mut(i));
            if let Some((sx, sy, n)) = slot {
                *sx += f64::from(position.x);
                *sy += f64::from(position.y);
                *n = n.saturating_add(1);
            }
        }
        for (centroid, (sx, sy, n)) in centroids.iter_mut().zip(sums) {
            // An empty cluster keeps its previous centre.
            if n > 0 {
                centroid.x = sx / f64::from(n);
                centroid.y = sy / f64::from(n);
            }
        }
    }

    debug!(
        agents = agents.len(),
        clusters = centroids.len(),
        iterations,
        "Clustering complete"
    );
    Clustering {
        centroids,
        assignments,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn at(points: &[(i32, i32)]) -> Vec<(AgentId, Position)> {
        points
            .iter()
            .map(|(x, y)| (AgentId::new(), Position::new(*x, *y)))
            .collect()
    }

    fn distinct_clusters(c: &Clustering) -> usize {
        c.assignments.values().collect::<BTreeSet<_>>().len()
    }

    #[test]
    fn far_apart_pair_splits_with_two_clusters() {
        let mut rng = SmallRng::seed_from_u64(42);
        let agents = at(&[(0, 0), (100, 100)]);
        let c = kmeans(&agents, 2, 100, &mut rng);
        assert_eq!(c.len(), 2);
        assert_ne!(c.cluster_of(agents[0].0), c.cluster_of(agents[1].0));
    }

    #[test]
    fn single_cluster_holds_everyone() {
        let mut rng = SmallRng::seed_from_u64(42);
        let agents = at(&[(0, 0), (100, 100), (50, 3)]);
        let c = kmeans(&agents, 1, 100, &mut rng);
        assert_eq!(distinct_clusters(&c), 1);
        assert_eq!(c.assignments.len(), 3);
    }

    #[test]
    fn small_population_caps_cluster_count() {
        let mut rng = SmallRng::seed_from_u64(42);
        let agents = at(&[(1, 1), (5, 5), (9, 9)]);
        let c = kmeans(&agents, 8, 100, &mut rng);
        assert!(c.len() <= 3);
        assert!(distinct_clusters(&c) <= 3);
    }

    #[test]
    fn empty_input_is_empty() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(kmeans(&[], 3, 100, &mut rng).is_empty());
        let agents = at(&[(1, 1)]);
        assert!(kmeans(&agents, 0, 100, &mut rng).is_empty());
    }

    #[test]
    fn two_blobs_are_recovered() {
        let mut rng = SmallRng::seed_from_u64(3);
        let agents = at(&[(0, 0), (1, 0), (0, 1), (40, 40), (41, 40), (40, 41)]);
        let c = kmeans(&agents, 2, 100, &mut rng);
        let left = c.cluster_of(agents[0].0);
        assert_eq!(c.cluster_of(agents[1].0), left);
        assert_eq!(c.cluster_of(agents[2].0), left);
        let right = c.cluster_of(agents[3].0);
        assert_ne!(left, right);
        assert_eq!(c.cluster_of(agents[4].0), right);
        assert_eq!(c.cluster_of(agents[5].0), right);
    }

    #[test]
    fn assignments_point_at_nearest_final_centroid() {
        let mut rng = SmallRng::seed_from_u64(8);
        let agents = at(&[(0, 0), (3, 7), (9, 2), (15, 15), (20, 1), (6, 6), (12, 18)]);
        let c = kmeans(&agents, 3, 100, &mut rng);
        for (id, pos) in &agents {
            assert_eq!(c.cluster_of(*id), c.nearest(*pos));
        }
        let groups = c.groups();
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), agents.len());
    }
}
