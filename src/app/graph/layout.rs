use std::f32::consts::TAU;

use eframe::egui::Vec2;
use rand::Rng;

use crate::config::ClusterSpec;
use crate::util::polar;

use super::{Entity, Link, LinkKind};

const RING_BASE_RADIUS: f32 = 80.0;
const RING_SPREAD: f32 = 40.0;
const ENTITY_BASE_RADIUS: f32 = 3.0;
const ENTITY_RADIUS_SPREAD: f32 = 2.0;

/// Place every configured entity on a jittered ring around its cluster
/// center. Shape is deterministic (counts, cluster assignment, concept
/// cycling); exact coordinates depend on `rng`.
pub(super) fn generate_entities(clusters: &[ClusterSpec], rng: &mut impl Rng) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(clusters.iter().map(|cluster| cluster.count).sum());
    let mut sequence = 0usize;

    for (cluster_index, cluster) in clusters.iter().enumerate() {
        let center = cluster.center();
        for slot in 0..cluster.count {
            let angle = (slot as f32 / cluster.count as f32) * TAU;
            let ring = RING_BASE_RADIUS + rng.gen_range(0.0..RING_SPREAD);
            let concept = if cluster.concepts.is_empty() {
                format!("Concept {slot}")
            } else {
                cluster.concepts[slot % cluster.concepts.len()].clone()
            };

            entities.push(Entity {
                id: format!("{}-{}", cluster.id, sequence),
                cluster: cluster_index,
                concept,
                pos: center + polar(angle, ring),
                vel: Vec2::ZERO,
                base_radius: ENTITY_BASE_RADIUS + rng.gen_range(0.0..ENTITY_RADIUS_SPREAD),
            });
            sequence += 1;
        }
    }

    entities
}

/// Sample relationship edges: per entity, 0 or 1 edges to a random peer in
/// the same cluster (self-picks are dropped, not retried), plus 2-5 edges
/// between random members of every unordered pair of non-empty clusters.
pub(super) fn generate_links(
    entities: &[Entity],
    cluster_count: usize,
    rng: &mut impl Rng,
) -> Vec<Link> {
    let mut members = vec![Vec::new(); cluster_count];
    for (index, entity) in entities.iter().enumerate() {
        if entity.cluster < cluster_count {
            members[entity.cluster].push(index);
        }
    }

    let mut links = Vec::new();

    for (index, entity) in entities.iter().enumerate() {
        if rng.gen_range(0..2) == 0 {
            continue;
        }

        let pool = &members[entity.cluster];
        let target = pool[rng.gen_range(0..pool.len())];
        if target != index {
            links.push(Link {
                source: index,
                target,
                kind: LinkKind::Intra,
            });
        }
    }

    for first in 0..cluster_count {
        for second in (first + 1)..cluster_count {
            if members[first].is_empty() || members[second].is_empty() {
                continue;
            }

            for _ in 0..rng.gen_range(2..=5usize) {
                links.push(Link {
                    source: members[first][rng.gen_range(0..members[first].len())],
                    target: members[second][rng.gen_range(0..members[second].len())],
                    kind: LinkKind::Inter,
                });
            }
        }
    }

    links
}
