//! Translates narrative step ids into choreographed visual transitions over
//! the graph's entities, relationships and cluster labels.
//!
//! Every piece of scheduled work for a step lives on the sequencer, so a step
//! change can revoke all of it in one place before the next plan starts. A
//! transition captures its starting values on first application, which keeps
//! mid-flight step switches continuous instead of snapping.

use eframe::egui::Color32;

use super::super::anim::{Ease, Pulse, Tween};
use super::super::render_utils::{blend_color, lerp};
use super::{
    BASE_ENTITY_OPACITY, BASE_LABEL_OPACITY, BASE_LINK_COLOR, BASE_LINK_OPACITY, BASE_LINK_WIDTH,
    ClusterRender, Entity, GraphVisuals, Link, LinkKind,
};

const SIMPLE_PROMPT_CLUSTER: &str = "market-analysis";

const HIGHLIGHT_AMBER: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
const HIGHLIGHT_BLUE: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);

const RESET_DURATION: f64 = 0.3;
const DIM_DURATION: f64 = 0.3;
const GROUP_STAGGER: f64 = 0.45;
const GROUP_REVEAL_DURATION: f64 = 0.8;
const LINK_PASS_DURATION: f64 = 0.6;
const FADE_DURATION: f64 = 0.8;
const PULSE_PERIOD: f64 = 2.0;
const PULSE_GROWTH: f32 = 0.5;

const EMPHASIS_OPACITY: f32 = 0.9;
const MUTED_ENTITY_OPACITY: f32 = 0.2;
const DIM_ENTITY_OPACITY: f32 = 0.1;
const DIM_LINK_OPACITY: f32 = 0.05;
const DIM_LABEL_OPACITY: f32 = 0.3;
const ACTIVE_LINK_OPACITY: f32 = 0.4;
const ACTIVE_LINK_WIDTH: f32 = 2.0;
const ACTIVE_RING: f32 = 0.35;

#[derive(Clone, Copy, Debug, Default)]
struct VisualTarget {
    opacity: Option<f32>,
    fill: Option<Color32>,
    radius_scale: Option<f32>,
    stroke: Option<f32>,
    width: Option<f32>,
    ring: Option<f32>,
}

enum TargetSet {
    Entities(Vec<usize>),
    Links(Vec<usize>),
    Labels(Vec<usize>),
}

enum CapturedFrom {
    Entities(Vec<super::EntityVisual>),
    Links(Vec<super::LinkVisual>),
    Labels(Vec<super::LabelVisual>),
}

struct Transition {
    tween: Tween,
    targets: TargetSet,
    to: VisualTarget,
    from: Option<CapturedFrom>,
}

struct PulseTask {
    pulse: Pulse,
    targets: Vec<usize>,
}

/// Deferred relationship re-evaluation scheduled by the staged multi-cluster
/// reveal; fires once after the last group is due.
struct LinkPass {
    due: f64,
    active: Vec<bool>,
}

pub(super) struct HighlightSequencer {
    last_step: Option<String>,
    transitions: Vec<Transition>,
    pulse: Option<PulseTask>,
    link_pass: Option<LinkPass>,
}

impl HighlightSequencer {
    pub(super) fn new() -> Self {
        Self {
            last_step: None,
            transitions: Vec::new(),
            pulse: None,
            link_pass: None,
        }
    }

    pub(super) fn enter_step(
        &mut self,
        step: &str,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        clusters: &[ClusterRender],
    ) {
        if self.last_step.as_deref() == Some(step) {
            return;
        }

        match step {
            "intro" => {
                self.begin(step);
                self.reset_plan(now, entities, links, clusters);
            }
            "simple-prompt" => {
                self.begin(step);
                self.single_cluster_plan(SIMPLE_PROMPT_CLUSTER, now, entities, links, clusters);
            }
            "structured-prompt" => {
                self.begin(step);
                self.multi_cluster_plan(now, entities, links, clusters);
            }
            // Keeps the structured state on screen while the narrative
            // draws its conclusion.
            "key-insight" => {
                self.last_step = Some(step.to_owned());
            }
            "transition" => {
                self.begin(step);
                self.fade_plan(now, entities, links, clusters);
            }
            _ => {
                log::debug!("ignoring unknown highlight step {step:?}");
            }
        }
    }

    /// Revoke every pending and running piece of work in one operation.
    pub(super) fn cancel_all(&mut self) {
        self.transitions.clear();
        self.pulse = None;
        self.link_pass = None;
    }

    pub(super) fn tick(
        &mut self,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        visuals: &mut GraphVisuals,
    ) -> bool {
        if self.link_pass.as_ref().is_some_and(|pass| now >= pass.due)
            && let Some(pass) = self.link_pass.take()
        {
            self.evaluate_links(&pass, now, entities, links);
        }

        self.transitions.retain_mut(|transition| {
            apply_transition(transition, now, visuals);
            !transition.tween.finished(now)
        });

        if let Some(task) = &self.pulse {
            let amount = task.pulse.amplitude(now);
            for &index in &task.targets {
                if let Some(visual) = visuals.entities.get_mut(index) {
                    visual.radius_scale = 1.0 + PULSE_GROWTH * amount;
                }
            }
        }

        !self.transitions.is_empty() || self.pulse.is_some() || self.link_pass.is_some()
    }

    fn begin(&mut self, step: &str) {
        self.cancel_all();
        self.last_step = Some(step.to_owned());
    }

    fn schedule(&mut self, tween: Tween, targets: TargetSet, to: VisualTarget) {
        let empty = match &targets {
            TargetSet::Entities(indices) => indices.is_empty(),
            TargetSet::Links(indices) => indices.is_empty(),
            TargetSet::Labels(indices) => indices.is_empty(),
        };
        if empty {
            return;
        }

        self.transitions.push(Transition {
            tween,
            targets,
            to,
            from: None,
        });
    }

    fn reset_plan(
        &mut self,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        clusters: &[ClusterRender],
    ) {
        for (index, cluster) in clusters.iter().enumerate() {
            self.schedule(
                Tween::after(now, 0.0, RESET_DURATION, Ease::CubicOut),
                TargetSet::Entities(members(entities, index)),
                VisualTarget {
                    opacity: Some(BASE_ENTITY_OPACITY),
                    fill: Some(cluster.color),
                    radius_scale: Some(1.0),
                    stroke: Some(0.0),
                    ..Default::default()
                },
            );
        }

        self.schedule(
            Tween::after(now, 0.0, RESET_DURATION, Ease::CubicOut),
            TargetSet::Links(all_indices(links.len())),
            VisualTarget {
                opacity: Some(BASE_LINK_OPACITY),
                width: Some(BASE_LINK_WIDTH),
                fill: Some(BASE_LINK_COLOR),
                ..Default::default()
            },
        );

        self.schedule(
            Tween::after(now, 0.0, RESET_DURATION, Ease::CubicOut),
            TargetSet::Labels(all_indices(clusters.len())),
            VisualTarget {
                opacity: Some(BASE_LABEL_OPACITY),
                ring: Some(0.0),
                ..Default::default()
            },
        );
    }

    fn single_cluster_plan(
        &mut self,
        cluster_id: &str,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        clusters: &[ClusterRender],
    ) {
        let matched = clusters.iter().position(|cluster| cluster.id == cluster_id);

        for (index, cluster) in clusters.iter().enumerate() {
            let target = if matched == Some(index) {
                VisualTarget {
                    opacity: Some(EMPHASIS_OPACITY),
                    fill: Some(HIGHLIGHT_AMBER),
                    stroke: Some(0.0),
                    ..Default::default()
                }
            } else {
                VisualTarget {
                    opacity: Some(MUTED_ENTITY_OPACITY),
                    fill: Some(cluster.color),
                    radius_scale: Some(1.0),
                    stroke: Some(0.0),
                    ..Default::default()
                }
            };

            self.schedule(
                Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
                TargetSet::Entities(members(entities, index)),
                target,
            );
        }

        self.schedule(
            Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
            TargetSet::Links(all_indices(links.len())),
            VisualTarget {
                opacity: Some(DIM_LINK_OPACITY),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
            TargetSet::Labels(all_indices(clusters.len())),
            VisualTarget {
                opacity: Some(BASE_LABEL_OPACITY),
                ring: Some(0.0),
                ..Default::default()
            },
        );

        if let Some(index) = matched {
            let targets = members(entities, index);
            if !targets.is_empty() {
                self.pulse = Some(PulseTask {
                    pulse: Pulse::after(now, DIM_DURATION, PULSE_PERIOD),
                    targets,
                });
            }
        }
    }

    fn multi_cluster_plan(
        &mut self,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        clusters: &[ClusterRender],
    ) {
        self.schedule(
            Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
            TargetSet::Entities(all_indices(entities.len())),
            VisualTarget {
                opacity: Some(DIM_ENTITY_OPACITY),
                radius_scale: Some(1.0),
                stroke: Some(0.0),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
            TargetSet::Links(all_indices(links.len())),
            VisualTarget {
                opacity: Some(DIM_LINK_OPACITY),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, DIM_DURATION, Ease::CubicOut),
            TargetSet::Labels(all_indices(clusters.len())),
            VisualTarget {
                opacity: Some(DIM_LABEL_OPACITY),
                ring: Some(0.0),
                ..Default::default()
            },
        );

        let groups: Vec<usize> = (0..clusters.len())
            .filter(|&index| entities.iter().any(|entity| entity.cluster == index))
            .collect();

        for (order, &cluster_index) in groups.iter().enumerate() {
            let delay = DIM_DURATION + (order as f64) * GROUP_STAGGER;

            self.schedule(
                Tween::after(now, delay, GROUP_REVEAL_DURATION, Ease::CubicOut),
                TargetSet::Entities(members(entities, cluster_index)),
                VisualTarget {
                    opacity: Some(EMPHASIS_OPACITY),
                    fill: Some(HIGHLIGHT_BLUE),
                    stroke: Some(0.9),
                    ..Default::default()
                },
            );
            self.schedule(
                Tween::after(now, delay, GROUP_REVEAL_DURATION, Ease::CubicOut),
                TargetSet::Labels(vec![cluster_index]),
                VisualTarget {
                    opacity: Some(BASE_LABEL_OPACITY),
                    ring: Some(ACTIVE_RING),
                    ..Default::default()
                },
            );
        }

        if let Some(last) = groups.len().checked_sub(1) {
            let mut active = vec![false; clusters.len()];
            for &cluster_index in &groups {
                active[cluster_index] = true;
            }
            self.link_pass = Some(LinkPass {
                due: now + DIM_DURATION + (last as f64) * GROUP_STAGGER + GROUP_REVEAL_DURATION,
                active,
            });
        }
    }

    fn fade_plan(
        &mut self,
        now: f64,
        entities: &[Entity],
        links: &[Link],
        clusters: &[ClusterRender],
    ) {
        self.schedule(
            Tween::after(now, 0.0, FADE_DURATION, Ease::CubicInOut),
            TargetSet::Entities(all_indices(entities.len())),
            VisualTarget {
                opacity: Some(0.0),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, FADE_DURATION, Ease::CubicInOut),
            TargetSet::Links(all_indices(links.len())),
            VisualTarget {
                opacity: Some(0.0),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, FADE_DURATION, Ease::CubicInOut),
            TargetSet::Labels(all_indices(clusters.len())),
            VisualTarget {
                opacity: Some(0.0),
                ring: Some(0.0),
                ..Default::default()
            },
        );
    }

    fn evaluate_links(&mut self, pass: &LinkPass, now: f64, entities: &[Entity], links: &[Link]) {
        let mut promoted = Vec::new();
        let mut demoted = Vec::new();

        for (index, link) in links.iter().enumerate() {
            let source_active = entities
                .get(link.source)
                .is_some_and(|entity| pass.active.get(entity.cluster) == Some(&true));
            let target_active = entities
                .get(link.target)
                .is_some_and(|entity| pass.active.get(entity.cluster) == Some(&true));

            if link.kind == LinkKind::Inter && source_active && target_active {
                promoted.push(index);
            } else {
                demoted.push(index);
            }
        }

        self.schedule(
            Tween::after(now, 0.0, LINK_PASS_DURATION, Ease::CubicOut),
            TargetSet::Links(promoted),
            VisualTarget {
                opacity: Some(ACTIVE_LINK_OPACITY),
                width: Some(ACTIVE_LINK_WIDTH),
                fill: Some(HIGHLIGHT_BLUE),
                ..Default::default()
            },
        );
        self.schedule(
            Tween::after(now, 0.0, LINK_PASS_DURATION, Ease::CubicOut),
            TargetSet::Links(demoted),
            VisualTarget {
                opacity: Some(DIM_LINK_OPACITY),
                width: Some(BASE_LINK_WIDTH),
                fill: Some(BASE_LINK_COLOR),
                ..Default::default()
            },
        );
    }
}

fn apply_transition(transition: &mut Transition, now: f64, visuals: &mut GraphVisuals) {
    let Some(amount) = transition.tween.sample(now) else {
        return;
    };
    let to = transition.to;

    match &transition.targets {
        TargetSet::Entities(indices) => {
            let from = transition.from.get_or_insert_with(|| {
                CapturedFrom::Entities(
                    indices
                        .iter()
                        .map(|&index| visuals.entities.get(index).copied().unwrap_or_default())
                        .collect(),
                )
            });
            let CapturedFrom::Entities(snapshots) = from else {
                return;
            };
            for (&index, snapshot) in indices.iter().zip(snapshots.iter()) {
                let Some(visual) = visuals.entities.get_mut(index) else {
                    continue;
                };
                if let Some(opacity) = to.opacity {
                    visual.opacity = lerp(snapshot.opacity, opacity, amount);
                }
                if let Some(fill) = to.fill {
                    visual.fill = blend_color(snapshot.fill, fill, amount);
                }
                if let Some(scale) = to.radius_scale {
                    visual.radius_scale = lerp(snapshot.radius_scale, scale, amount);
                }
                if let Some(stroke) = to.stroke {
                    visual.stroke_width = lerp(snapshot.stroke_width, stroke, amount);
                }
            }
        }
        TargetSet::Links(indices) => {
            let from = transition.from.get_or_insert_with(|| {
                CapturedFrom::Links(
                    indices
                        .iter()
                        .map(|&index| visuals.links.get(index).copied().unwrap_or_default())
                        .collect(),
                )
            });
            let CapturedFrom::Links(snapshots) = from else {
                return;
            };
            for (&index, snapshot) in indices.iter().zip(snapshots.iter()) {
                let Some(visual) = visuals.links.get_mut(index) else {
                    continue;
                };
                if let Some(opacity) = to.opacity {
                    visual.opacity = lerp(snapshot.opacity, opacity, amount);
                }
                if let Some(width) = to.width {
                    visual.width = lerp(snapshot.width, width, amount);
                }
                if let Some(color) = to.fill {
                    visual.color = blend_color(snapshot.color, color, amount);
                }
            }
        }
        TargetSet::Labels(indices) => {
            let from = transition.from.get_or_insert_with(|| {
                CapturedFrom::Labels(
                    indices
                        .iter()
                        .map(|&index| visuals.labels.get(index).copied().unwrap_or_default())
                        .collect(),
                )
            });
            let CapturedFrom::Labels(snapshots) = from else {
                return;
            };
            for (&index, snapshot) in indices.iter().zip(snapshots.iter()) {
                let Some(visual) = visuals.labels.get_mut(index) else {
                    continue;
                };
                if let Some(opacity) = to.opacity {
                    visual.opacity = lerp(snapshot.opacity, opacity, amount);
                }
                if let Some(ring) = to.ring {
                    visual.ring = lerp(snapshot.ring, ring, amount);
                }
            }
        }
    }
}

fn members(entities: &[Entity], cluster_index: usize) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter_map(|(index, entity)| (entity.cluster == cluster_index).then_some(index))
        .collect()
}

fn all_indices(len: usize) -> Vec<usize> {
    (0..len).collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    struct Fixture {
        entities: Vec<Entity>,
        links: Vec<Link>,
        clusters: Vec<ClusterRender>,
        visuals: GraphVisuals,
    }

    fn fixture() -> Fixture {
        let clusters = vec![
            ClusterRender {
                id: "market-analysis".to_string(),
                label: "Market Analysis".to_string(),
                color: Color32::from_rgb(0xe7, 0x4c, 0x3c),
                center: vec2(-150.0, 0.0),
            },
            ClusterRender {
                id: "demographics".to_string(),
                label: "Demographics".to_string(),
                color: Color32::from_rgb(0x2e, 0xcc, 0x71),
                center: vec2(150.0, 0.0),
            },
        ];

        let mut entities = Vec::new();
        for (cluster, count) in [(0usize, 3usize), (1, 2)] {
            for slot in 0..count {
                entities.push(Entity {
                    id: format!("{}-{slot}", clusters[cluster].id),
                    cluster,
                    concept: format!("Concept {slot}"),
                    pos: clusters[cluster].center,
                    vel: vec2(0.0, 0.0),
                    base_radius: 4.0,
                });
            }
        }

        let links = vec![
            Link {
                source: 0,
                target: 1,
                kind: LinkKind::Intra,
            },
            Link {
                source: 0,
                target: 3,
                kind: LinkKind::Inter,
            },
        ];

        let visuals = GraphVisuals::baseline(&entities, &links, &clusters);
        Fixture {
            entities,
            links,
            clusters,
            visuals,
        }
    }

    fn enter(sequencer: &mut HighlightSequencer, fixture: &Fixture, step: &str, now: f64) {
        sequencer.enter_step(step, now, &fixture.entities, &fixture.links, &fixture.clusters);
    }

    fn tick(sequencer: &mut HighlightSequencer, fixture: &mut Fixture, now: f64) -> bool {
        sequencer.tick(now, &fixture.entities, &fixture.links, &mut fixture.visuals)
    }

    #[test]
    fn re_entering_the_active_step_schedules_nothing() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "simple-prompt", 0.0);
        let scheduled = sequencer.transitions.len();
        assert!(scheduled > 0);
        assert!(sequencer.pulse.is_some());

        enter(&mut sequencer, &fixture, "simple-prompt", 0.1);
        assert_eq!(sequencer.transitions.len(), scheduled);

        // Still a no-op after the first plan has fully drained.
        tick(&mut sequencer, &mut fixture, 10.0);
        enter(&mut sequencer, &fixture, "simple-prompt", 10.1);
        assert!(sequencer.transitions.is_empty());
    }

    #[test]
    fn unknown_steps_are_ignored() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "intro", 0.0);
        let scheduled = sequencer.transitions.len();

        enter(&mut sequencer, &fixture, "hyperdrive", 0.1);
        assert_eq!(sequencer.last_step.as_deref(), Some("intro"));
        assert_eq!(sequencer.transitions.len(), scheduled);

        let _ = tick(&mut sequencer, &mut fixture, 0.2);
    }

    #[test]
    fn single_cluster_emphasis_splits_matched_and_muted() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "simple-prompt", 0.0);
        tick(&mut sequencer, &mut fixture, 5.0);

        for (entity, visual) in fixture.entities.iter().zip(&fixture.visuals.entities) {
            if entity.cluster == 0 {
                assert!(visual.opacity >= 0.85 && visual.opacity <= 1.0);
                assert_eq!(
                    (visual.fill.r(), visual.fill.g(), visual.fill.b()),
                    (0xf3, 0x9c, 0x12)
                );
            } else {
                assert!(visual.opacity <= MUTED_ENTITY_OPACITY + 0.001);
            }
        }
        for visual in &fixture.visuals.links {
            assert!(visual.opacity <= DIM_LINK_OPACITY + 0.001);
        }
    }

    #[test]
    fn stepping_back_to_single_cluster_clears_structured_styling() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "structured-prompt", 0.0);
        tick(&mut sequencer, &mut fixture, 4.0);
        assert!(fixture.visuals.entities[0].stroke_width > 0.5);
        assert!(fixture.visuals.labels[0].ring > 0.1);

        enter(&mut sequencer, &fixture, "simple-prompt", 4.0);
        tick(&mut sequencer, &mut fixture, 8.0);

        for visual in &fixture.visuals.entities {
            assert!(visual.stroke_width < 0.001);
        }
        for visual in &fixture.visuals.labels {
            assert!(visual.ring < 0.001);
            assert!((visual.opacity - BASE_LABEL_OPACITY).abs() < 0.001);
        }
    }

    #[test]
    fn pulse_loops_until_the_step_changes() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "simple-prompt", 0.0);
        // Mid-period, two cycles in: the loop is still going.
        tick(&mut sequencer, &mut fixture, DIM_DURATION + PULSE_PERIOD * 2.0 + 0.5);
        assert!(fixture.visuals.entities[0].radius_scale > 1.05);
    }

    #[test]
    fn switching_steps_cancels_the_pulse_loop() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "simple-prompt", 0.0);
        tick(&mut sequencer, &mut fixture, 1.3);
        assert!(fixture.visuals.entities[0].radius_scale > 1.0);

        enter(&mut sequencer, &fixture, "structured-prompt", 1.3);
        assert!(sequencer.pulse.is_none());

        // After the new step settles, sample two instants that would sit at
        // different pulse phases; the scale must hold steady at baseline.
        tick(&mut sequencer, &mut fixture, 6.3);
        let first = fixture.visuals.entities[0].radius_scale;
        tick(&mut sequencer, &mut fixture, 7.0);
        let second = fixture.visuals.entities[0].radius_scale;
        assert!((first - 1.0).abs() < 0.001);
        assert!((second - 1.0).abs() < 0.001);
    }

    #[test]
    fn staged_reveal_orders_groups_by_delay() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "structured-prompt", 0.0);
        tick(&mut sequencer, &mut fixture, 0.5);

        let first_group = fixture.visuals.entities[0].opacity;
        let second_group = fixture.visuals.entities[3].opacity;
        assert!(first_group > second_group + 0.1);
        assert!((second_group - DIM_ENTITY_OPACITY).abs() < 0.01);
    }

    #[test]
    fn link_promotion_waits_for_the_last_group() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "structured-prompt", 0.0);

        // Before the deferred pass: the inter link still sits at its dim value.
        tick(&mut sequencer, &mut fixture, 1.0);
        assert!(fixture.visuals.links[1].opacity <= DIM_LINK_OPACITY + 0.01);
        assert!(sequencer.link_pass.is_some());

        // After: inter promoted, intra kept dim.
        tick(&mut sequencer, &mut fixture, 2.0);
        assert!(sequencer.link_pass.is_none());
        tick(&mut sequencer, &mut fixture, 4.0);
        assert!((fixture.visuals.links[1].opacity - ACTIVE_LINK_OPACITY).abs() < 0.01);
        assert!((fixture.visuals.links[1].width - ACTIVE_LINK_WIDTH).abs() < 0.01);
        assert!(fixture.visuals.links[0].opacity <= DIM_LINK_OPACITY + 0.01);

        for visual in &fixture.visuals.entities {
            assert!(visual.opacity >= 0.85);
        }
        for visual in &fixture.visuals.labels {
            assert!((visual.ring - ACTIVE_RING).abs() < 0.01);
        }
    }

    #[test]
    fn key_insight_holds_the_structured_state() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "structured-prompt", 0.0);
        let scheduled = sequencer.transitions.len();

        enter(&mut sequencer, &fixture, "key-insight", 0.1);
        assert_eq!(sequencer.last_step.as_deref(), Some("key-insight"));
        assert_eq!(sequencer.transitions.len(), scheduled);
        assert!(sequencer.link_pass.is_some());
    }

    #[test]
    fn fade_out_drives_everything_to_zero_opacity() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "structured-prompt", 0.0);
        tick(&mut sequencer, &mut fixture, 4.0);

        enter(&mut sequencer, &fixture, "transition", 4.0);
        tick(&mut sequencer, &mut fixture, 4.0 + FADE_DURATION + 0.1);

        for visual in &fixture.visuals.entities {
            assert!(visual.opacity < 0.001);
        }
        for visual in &fixture.visuals.links {
            assert!(visual.opacity < 0.001);
        }
        for visual in &fixture.visuals.labels {
            assert!(visual.opacity < 0.001);
        }
    }

    #[test]
    fn switching_mid_fade_resumes_from_current_values() {
        let mut fixture = fixture();
        let mut sequencer = HighlightSequencer::new();

        enter(&mut sequencer, &fixture, "transition", 0.0);
        tick(&mut sequencer, &mut fixture, 0.4);
        let mid_fade = fixture.visuals.entities[0].opacity;
        assert!(mid_fade > 0.0 && mid_fade < BASE_ENTITY_OPACITY);

        enter(&mut sequencer, &fixture, "intro", 0.4);
        tick(&mut sequencer, &mut fixture, 0.55);
        let recovering = fixture.visuals.entities[0].opacity;
        assert!(recovering >= mid_fade - 0.001);

        let animating = tick(&mut sequencer, &mut fixture, 1.0);
        assert!((fixture.visuals.entities[0].opacity - BASE_ENTITY_OPACITY).abs() < 0.001);
        assert!(!animating);
    }

    #[test]
    fn empty_scene_is_a_no_op() {
        let mut sequencer = HighlightSequencer::new();
        let mut visuals = GraphVisuals::baseline(&[], &[], &[]);

        sequencer.enter_step("structured-prompt", 0.0, &[], &[], &[]);
        let animating = sequencer.tick(1.0, &[], &[], &mut visuals);
        assert!(!animating);
    }
}
