use eframe::egui::{Vec2, vec2};

use super::{ClusterRender, Entity, Link};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;
const BARNES_HUT_THETA: f32 = 0.8;
const SOFTENING: f32 = 80.0;

#[derive(Clone, Copy, Debug)]
pub(super) struct SimulationConfig {
    pub link_distance: f32,
    pub link_strength: f32,
    pub repulsion: f32,
    pub collision_margin: f32,
    pub collision_strength: f32,
    pub center_pull: f32,
    pub cluster_strength: f32,
    pub alpha_decay: f32,
    pub velocity_damping: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            link_strength: 0.1,
            repulsion: 600.0,
            collision_margin: 2.0,
            collision_strength: 0.7,
            center_pull: 0.004,
            cluster_strength: 0.15,
            alpha_decay: 0.02,
            velocity_damping: 0.6,
        }
    }
}

/// Iterative position solver. One `step` per frame; the annealing factor
/// relaxes toward zero asymptotically, so the layout settles into gentle
/// ambient drift instead of ever reaching a hard rest state.
pub(super) struct Simulation {
    alpha: f32,
    forces: Vec<Vec2>,
    pushes: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

impl Simulation {
    pub(super) fn new() -> Self {
        Self {
            alpha: 1.0,
            forces: Vec::new(),
            pushes: Vec::new(),
            positions: Vec::new(),
            radii: Vec::new(),
        }
    }

    pub(super) fn step(
        &mut self,
        entities: &mut [Entity],
        links: &[Link],
        clusters: &[ClusterRender],
        config: &SimulationConfig,
    ) -> bool {
        let count = entities.len();
        if count == 0 {
            return false;
        }

        self.alpha += (0.0 - self.alpha) * config.alpha_decay;

        self.forces.clear();
        self.forces.resize(count, Vec2::ZERO);
        self.pushes.clear();
        self.pushes.resize(count, Vec2::ZERO);
        self.positions.clear();
        self.radii.clear();
        let mut max_radius = 0.0_f32;
        for entity in entities.iter() {
            self.positions.push(entity.pos);
            self.radii.push(entity.base_radius);
            max_radius = max_radius.max(entity.base_radius);
        }

        if let Some(tree) = QuadNode::build(&self.positions) {
            for (index, force) in self.forces.iter_mut().enumerate() {
                tree.accumulate_repulsion(index, &self.positions, config.repulsion, force);
            }

            let reach = max_radius + config.collision_margin;
            for index in 0..count {
                let point = self.positions[index];
                tree.visit_within(point, self.radii[index] + reach, &mut |other| {
                    if other <= index {
                        return;
                    }
                    let min_distance =
                        self.radii[index] + self.radii[other] + config.collision_margin;
                    let delta = point - self.positions[other];
                    let distance = delta.length();
                    if distance >= min_distance {
                        return;
                    }
                    let direction = if distance > 0.0001 {
                        delta / distance
                    } else {
                        let angle = ((index as f32) * 0.618_034 + (other as f32) * 0.414_214)
                            * std::f32::consts::TAU;
                        vec2(angle.cos(), angle.sin())
                    };
                    let push =
                        direction * ((min_distance - distance) * config.collision_strength * 0.5);
                    self.pushes[index] += push;
                    self.pushes[other] -= push;
                });
            }
        }

        for link in links {
            if link.source >= count || link.target >= count || link.source == link.target {
                continue;
            }

            let delta = entities[link.source].pos - entities[link.target].pos;
            let distance = delta.length();
            if distance <= 0.0001 {
                continue;
            }
            let stretch = (distance - config.link_distance) * config.link_strength;
            let correction = (delta / distance) * stretch;

            self.forces[link.source] -= correction;
            self.forces[link.target] += correction;
        }

        for (index, force) in self.forces.iter_mut().enumerate() {
            *force -= entities[index].pos * config.center_pull;
        }

        let alpha = self.alpha;
        let mut any_motion = false;
        for (index, entity) in entities.iter_mut().enumerate() {
            entity.vel += self.forces[index] * alpha + self.pushes[index];

            if let Some(cluster) = clusters.get(entity.cluster) {
                entity.vel -= (entity.pos - cluster.center) * config.cluster_strength * alpha;
            }

            entity.vel *= config.velocity_damping;
            entity.pos += entity.vel;
            if entity.vel.length_sq() > 0.000_001 {
                any_motion = true;
            }
        }

        any_motion
    }
}

struct QuadNode {
    center: Vec2,
    half_extent: f32,
    center_of_mass: Vec2,
    mass: f32,
    items: Vec<usize>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn build(positions: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in positions {
            min = min.min(*point);
            max = max.max(*point);
        }
        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = ((max.x - min.x).max(max.y - min.y) * 0.5).max(1.0);
        let mut root = Self::empty((min + max) * 0.5, span + 1.0);
        for index in 0..positions.len() {
            root.insert(index, positions, 0);
        }
        root.finalize(positions);
        Some(root)
    }

    fn empty(center: Vec2, half_extent: f32) -> Self {
        Self {
            center,
            half_extent,
            center_of_mass: Vec2::ZERO,
            mass: 0.0,
            items: Vec::new(),
            children: None,
        }
    }

    fn quadrant_of(center: Vec2, point: Vec2) -> usize {
        ((point.x >= center.x) as usize) | (((point.y >= center.y) as usize) << 1)
    }

    fn child_center(&self, quadrant: usize) -> Vec2 {
        let quarter = self.half_extent * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        self.center + vec2(dx, dy)
    }

    fn insert(&mut self, index: usize, positions: &[Vec2], depth: usize) {
        let center = self.center;
        let Some(children) = self.children.as_mut() else {
            if self.items.len() < LEAF_CAPACITY || depth >= MAX_DEPTH {
                self.items.push(index);
                return;
            }

            let quarter = self.half_extent * 0.5;
            let mut children: Box<[QuadNode; 4]> = Box::new(std::array::from_fn(|quadrant| {
                Self::empty(self.child_center(quadrant), quarter)
            }));
            for held in std::mem::take(&mut self.items) {
                let quadrant = Self::quadrant_of(center, positions[held]);
                children[quadrant].insert(held, positions, depth + 1);
            }
            let quadrant = Self::quadrant_of(center, positions[index]);
            children[quadrant].insert(index, positions, depth + 1);
            self.children = Some(children);
            return;
        };

        let quadrant = Self::quadrant_of(center, positions[index]);
        children[quadrant].insert(index, positions, depth + 1);
    }

    fn finalize(&mut self, positions: &[Vec2]) -> (Vec2, f32) {
        let mut weighted = Vec2::ZERO;
        let mut mass = 0.0;

        for &index in &self.items {
            weighted += positions[index];
            mass += 1.0;
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                let (child_weighted, child_mass) = child.finalize(positions);
                weighted += child_weighted;
                mass += child_mass;
            }
        }

        self.mass = mass;
        self.center_of_mass = if mass > 0.0 { weighted / mass } else { self.center };
        (weighted, mass)
    }

    fn accumulate_repulsion(
        &self,
        index: usize,
        positions: &[Vec2],
        strength: f32,
        force: &mut Vec2,
    ) {
        if self.mass <= 0.0 {
            return;
        }

        let point = positions[index];
        let delta = point - self.center_of_mass;
        let distance_sq = delta.length_sq().max(0.0001);

        let far_enough = (self.half_extent * 2.0) / distance_sq.sqrt() < BARNES_HUT_THETA;
        if self.children.is_some() && far_enough && !self.contains(point) {
            *force += (delta / distance_sq.sqrt()) * (strength * self.mass / (distance_sq + SOFTENING));
            return;
        }

        for &other in &self.items {
            if other == index {
                continue;
            }
            let delta = point - positions[other];
            let distance_sq = delta.length_sq();
            let direction = if distance_sq > 0.0001 {
                delta / distance_sq.sqrt()
            } else {
                vec2(1.0, 0.0)
            };
            *force += direction * (strength / (distance_sq + SOFTENING));
        }

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.accumulate_repulsion(index, positions, strength, force);
            }
        }
    }

    fn visit_within(&self, point: Vec2, range: f32, visit: &mut impl FnMut(usize)) {
        let dx = ((point.x - self.center.x).abs() - self.half_extent).max(0.0);
        let dy = ((point.y - self.center.y).abs() - self.half_extent).max(0.0);
        if (dx * dx) + (dy * dy) > range * range {
            return;
        }

        for &index in &self.items {
            visit(index);
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.visit_within(point, range, visit);
            }
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Color32;

    use super::super::LinkKind;
    use super::*;

    fn cluster_at(x: f32, y: f32) -> ClusterRender {
        ClusterRender {
            id: "a".to_string(),
            label: "A".to_string(),
            color: Color32::WHITE,
            center: vec2(x, y),
        }
    }

    fn entity_at(x: f32, y: f32) -> Entity {
        Entity {
            id: format!("a-{x}-{y}"),
            cluster: 0,
            concept: "c".to_string(),
            pos: vec2(x, y),
            vel: Vec2::ZERO,
            base_radius: 4.0,
        }
    }

    #[test]
    fn empty_entity_set_is_a_no_op() {
        let mut simulation = Simulation::new();
        let moved = simulation.step(&mut [], &[], &[], &SimulationConfig::default());
        assert!(!moved);
    }

    #[test]
    fn cooling_decays_but_never_reaches_zero() {
        let mut simulation = Simulation::new();
        let clusters = [cluster_at(0.0, 0.0)];
        let mut entities = vec![entity_at(50.0, 0.0), entity_at(-50.0, 0.0)];

        for _ in 0..300 {
            simulation.step(
                &mut entities,
                &[],
                &clusters,
                &SimulationConfig::default(),
            );
        }

        assert!(simulation.alpha < 0.01);
        assert!(simulation.alpha > 0.0);
    }

    #[test]
    fn cluster_cohesion_pulls_entities_toward_their_center() {
        let mut simulation = Simulation::new();
        let clusters = [cluster_at(0.0, 0.0)];
        let mut entities = vec![entity_at(300.0, 0.0), entity_at(0.0, 280.0)];
        let start: Vec<f32> = entities.iter().map(|e| e.pos.length()).collect();

        for _ in 0..40 {
            simulation.step(
                &mut entities,
                &[],
                &clusters,
                &SimulationConfig::default(),
            );
        }

        for (entity, before) in entities.iter().zip(start) {
            assert!(entity.pos.length() < before);
        }
    }

    #[test]
    fn link_attraction_shrinks_long_edges() {
        let mut simulation = Simulation::new();
        // Distant cluster centers so cohesion does not mask the spring.
        let clusters = [cluster_at(-400.0, 0.0), cluster_at(400.0, 0.0)];
        let mut entities = vec![entity_at(-400.0, 0.0), entity_at(400.0, 0.0)];
        entities[1].cluster = 1;
        let links = [Link {
            source: 0,
            target: 1,
            kind: LinkKind::Inter,
        }];
        let config = SimulationConfig::default();

        let before = (entities[0].pos - entities[1].pos).length();
        for _ in 0..30 {
            simulation.step(&mut entities, &links, &clusters, &config);
        }
        let after = (entities[0].pos - entities[1].pos).length();

        assert!(after < before);
    }

    #[test]
    fn collision_separates_overlapping_entities() {
        let mut simulation = Simulation::new();
        let clusters = [cluster_at(0.0, 0.0)];
        let mut entities = vec![entity_at(0.0, 0.0), entity_at(1.0, 0.0)];

        for _ in 0..60 {
            simulation.step(
                &mut entities,
                &[],
                &clusters,
                &SimulationConfig::default(),
            );
        }

        let separation = (entities[0].pos - entities[1].pos).length();
        let min_separation = entities[0].base_radius + entities[1].base_radius;
        assert!(separation >= min_separation * 0.8, "separation {separation}");
    }

    #[test]
    fn quadtree_repulsion_approximates_pairwise_for_small_sets() {
        let positions = vec![
            vec2(0.0, 0.0),
            vec2(40.0, 5.0),
            vec2(-35.0, 12.0),
            vec2(8.0, -50.0),
        ];
        let tree = QuadNode::build(&positions).unwrap();

        let mut approximated = Vec2::ZERO;
        tree.accumulate_repulsion(0, &positions, 600.0, &mut approximated);

        let mut exact = Vec2::ZERO;
        for other in 1..positions.len() {
            let delta = positions[0] - positions[other];
            let distance_sq = delta.length_sq();
            exact += (delta / distance_sq.sqrt()) * (600.0 / (distance_sq + SOFTENING));
        }

        assert!((approximated - exact).length() < 0.01);
    }

    #[test]
    fn visit_within_prunes_distant_quadrants() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 4.0)];
        for slot in 0..12 {
            positions.push(vec2(400.0 + (slot as f32) * 6.0, 400.0));
        }
        let tree = QuadNode::build(&positions).unwrap();

        let mut seen = Vec::new();
        tree.visit_within(vec2(0.0, 0.0), 10.0, &mut |index| seen.push(index));
        seen.sort_unstable();

        assert!(seen.contains(&0) && seen.contains(&1) && seen.contains(&2));
        assert!(seen.iter().all(|&index| index < 3));
    }
}
