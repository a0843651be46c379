use eframe::egui::{Align2, Color32, FontId, Rect, Stroke, Ui, Vec2, vec2};
use rand::Rng;

use crate::config::PresentationConfig;

use super::render_utils::{fit_scale, with_opacity, world_to_screen};

mod layout;
mod physics;
mod sequencer;

use layout::{generate_entities, generate_links};
use physics::{Simulation, SimulationConfig};
use sequencer::HighlightSequencer;

const BASE_ENTITY_OPACITY: f32 = 0.6;
const BASE_LINK_OPACITY: f32 = 0.1;
const BASE_LINK_WIDTH: f32 = 1.0;
const BASE_LABEL_OPACITY: f32 = 1.0;
const BASE_LINK_COLOR: Color32 = Color32::from_gray(153);

const CLUSTER_RING_RADIUS: f32 = 130.0;
const LABEL_LIFT: f32 = 120.0;
const HOVER_RADIUS_FACTOR: f32 = 2.0;

#[derive(Clone, Debug)]
pub(in crate::app) struct ClusterRender {
    pub id: String,
    pub label: String,
    pub color: Color32,
    pub center: Vec2,
}

#[derive(Clone, Debug)]
pub(in crate::app) struct Entity {
    pub id: String,
    pub cluster: usize,
    pub concept: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub base_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum LinkKind {
    Intra,
    Inter,
}

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct Link {
    pub source: usize,
    pub target: usize,
    pub kind: LinkKind,
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct EntityVisual {
    pub opacity: f32,
    pub fill: Color32,
    pub radius_scale: f32,
    pub stroke_width: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct LinkVisual {
    pub opacity: f32,
    pub width: f32,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct LabelVisual {
    pub opacity: f32,
    pub ring: f32,
}

/// The retained visual-attribute arrays, one slot per entity, relationship
/// and cluster label. The simulation never writes here; the sequencer never
/// writes positions.
pub(in crate::app) struct GraphVisuals {
    pub entities: Vec<EntityVisual>,
    pub links: Vec<LinkVisual>,
    pub labels: Vec<LabelVisual>,
}

impl GraphVisuals {
    fn baseline(entities: &[Entity], links: &[Link], clusters: &[ClusterRender]) -> Self {
        Self {
            entities: entities
                .iter()
                .map(|entity| EntityVisual {
                    opacity: BASE_ENTITY_OPACITY,
                    fill: clusters
                        .get(entity.cluster)
                        .map(|cluster| cluster.color)
                        .unwrap_or(Color32::from_gray(140)),
                    radius_scale: 1.0,
                    stroke_width: 0.0,
                })
                .collect(),
            links: links
                .iter()
                .map(|_| LinkVisual {
                    opacity: BASE_LINK_OPACITY,
                    width: BASE_LINK_WIDTH,
                    color: BASE_LINK_COLOR,
                })
                .collect(),
            labels: clusters
                .iter()
                .map(|_| LabelVisual {
                    opacity: BASE_LABEL_OPACITY,
                    ring: 0.0,
                })
                .collect(),
        }
    }
}

pub(in crate::app) struct GraphScene {
    clusters: Vec<ClusterRender>,
    entities: Vec<Entity>,
    links: Vec<Link>,
    visuals: GraphVisuals,
    simulation: Simulation,
    sim_config: SimulationConfig,
    sequencer: HighlightSequencer,
}

impl GraphScene {
    pub(in crate::app) fn new(config: &PresentationConfig, rng: &mut impl Rng) -> Self {
        let clusters: Vec<ClusterRender> = config
            .clusters
            .iter()
            .map(|cluster| ClusterRender {
                id: cluster.id.clone(),
                label: cluster.label.clone(),
                color: cluster.color32(),
                center: cluster.center(),
            })
            .collect();

        let entities = generate_entities(&config.clusters, rng);
        let links = generate_links(&entities, clusters.len(), rng);
        log::info!(
            "force graph: {} entities, {} relationships across {} clusters",
            entities.len(),
            links.len(),
            clusters.len()
        );

        let visuals = GraphVisuals::baseline(&entities, &links, &clusters);
        Self {
            clusters,
            entities,
            links,
            visuals,
            simulation: Simulation::new(),
            sim_config: SimulationConfig::default(),
            sequencer: HighlightSequencer::new(),
        }
    }

    pub(in crate::app) fn enter_step(&mut self, step: &str, now: f64) {
        self.sequencer
            .enter_step(step, now, &self.entities, &self.links, &self.clusters);
    }

    /// One simulation iteration plus one sequencer tick. Returns whether
    /// anything is still in motion so the app can keep repainting.
    pub(in crate::app) fn update(&mut self, now: f64) -> bool {
        let moving = self.simulation.step(
            &mut self.entities,
            &self.links,
            &self.clusters,
            &self.sim_config,
        );
        let animating = self
            .sequencer
            .tick(now, &self.entities, &self.links, &mut self.visuals);
        moving || animating
    }

    pub(in crate::app) fn draw(&self, ui: &mut Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        let scale = fit_scale(rect);
        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer
            .filter(|position| rect.contains(*position))
            .and_then(|pointer| {
                self.entities
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entity)| {
                        let position = world_to_screen(rect, scale, entity.pos);
                        let radius = entity.base_radius
                            * self.visuals.entities[index].radius_scale
                            * scale;
                        let distance = position.distance(pointer);
                        (distance <= radius + 2.0).then_some((index, distance))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1))
            });
        let hovered_index = hovered.map(|(index, _)| index);

        for (link, visual) in self.links.iter().zip(&self.visuals.links) {
            if visual.opacity <= 0.002 {
                continue;
            }
            let start = world_to_screen(rect, scale, self.entities[link.source].pos);
            let end = world_to_screen(rect, scale, self.entities[link.target].pos);
            painter.line_segment(
                [start, end],
                Stroke::new(
                    (visual.width * scale).max(0.4),
                    with_opacity(visual.color, visual.opacity),
                ),
            );
        }

        for (index, (entity, visual)) in
            self.entities.iter().zip(&self.visuals.entities).enumerate()
        {
            let is_hovered = hovered_index == Some(index);
            if visual.opacity <= 0.002 && !is_hovered {
                continue;
            }

            let position = world_to_screen(rect, scale, entity.pos);
            let (radius_scale, opacity) = if is_hovered {
                (visual.radius_scale * HOVER_RADIUS_FACTOR, 1.0)
            } else {
                (visual.radius_scale, visual.opacity)
            };
            let radius = entity.base_radius * radius_scale * scale;

            painter.circle_filled(position, radius, with_opacity(visual.fill, opacity));
            if visual.stroke_width > 0.05 {
                painter.circle_stroke(
                    position,
                    radius + 0.5,
                    Stroke::new(
                        visual.stroke_width,
                        with_opacity(Color32::from_gray(235), opacity),
                    ),
                );
            }
        }

        for (cluster, visual) in self.clusters.iter().zip(&self.visuals.labels) {
            if visual.ring > 0.002 {
                painter.circle_stroke(
                    world_to_screen(rect, scale, cluster.center),
                    CLUSTER_RING_RADIUS * scale,
                    Stroke::new(1.2, with_opacity(cluster.color, visual.ring)),
                );
            }
            if visual.opacity > 0.002 {
                painter.text(
                    world_to_screen(rect, scale, cluster.center - vec2(0.0, LABEL_LIFT)),
                    Align2::CENTER_CENTER,
                    &cluster.label,
                    FontId::proportional(16.0),
                    with_opacity(Color32::from_gray(228), visual.opacity),
                );
            }
        }

        if let (Some(index), Some(pointer)) = (hovered_index, pointer) {
            let entity = &self.entities[index];
            let concept = painter.layout_no_wrap(
                entity.concept.clone(),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
            let detail = painter.layout_no_wrap(
                entity.id.clone(),
                FontId::proportional(10.0),
                Color32::from_gray(150),
            );

            let padding = vec2(7.0, 5.0);
            let width = concept.size().x.max(detail.size().x);
            let height = concept.size().y + 2.0 + detail.size().y;
            let tooltip = Rect::from_min_size(
                pointer + vec2(14.0, -10.0),
                vec2(width, height) + padding * 2.0,
            );

            painter.rect_filled(tooltip, 4.0, Color32::from_rgba_unmultiplied(26, 31, 40, 235));
            painter.galley(tooltip.min + padding, concept, Color32::from_gray(240));
            painter.galley(
                tooltip.min + padding + vec2(0.0, height - detail.size().y),
                detail,
                Color32::from_gray(150),
            );
        }
    }
}
