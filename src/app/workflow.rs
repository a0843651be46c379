//! Closing stage: the skills / synthesis / research cycle with a traveling
//! pulse that loops until the step changes.

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Ui, vec2};

use super::anim::{Ease, Tween};
use super::render_utils::{draw_stage_card, with_opacity};
use crate::util::polar;

const STAGES: &[(&str, &str, f32, Color32)] = &[
    ("Use Skills", "Structured thinking", -90.0, Color32::from_rgb(0x9b, 0x87, 0xc4)),
    ("Synthesize", "Custom prompt", 150.0, Color32::from_rgb(0xe9, 0xa8, 0x7e)),
    ("Deep Research", "Generate output", 30.0, Color32::from_rgb(0x6e, 0xb5, 0xa8)),
];

const NODE_RADIUS: f32 = 55.0;
const CYCLE_RADIUS: f32 = 160.0;
const CURVE_OFFSET: f32 = 40.0;
const ARROW_SAMPLES: usize = 24;

const NODE_STAGGER: f64 = 0.3;
const ARROW_START: f64 = 0.8;
const ARROW_STAGGER: f64 = 0.6;
const PULSE_START: f64 = 2.8;
const PULSE_LEG_SECONDS: f64 = 1.2;

pub(super) struct WorkflowScene {
    step: Option<String>,
    entered: f64,
}

impl WorkflowScene {
    pub(super) fn new() -> Self {
        Self {
            step: None,
            entered: 0.0,
        }
    }

    pub(super) fn enter_step(&mut self, step: &str, now: f64) {
        if self.step.as_deref() == Some(step) {
            return;
        }
        match step {
            "workflow-intro" | "custom-prompt" | "closing" => {
                self.step = Some(step.to_owned());
                self.entered = now;
            }
            _ => log::debug!("ignoring unknown workflow step {step:?}"),
        }
    }

    pub(super) fn animating(&self, now: f64) -> bool {
        match self.step.as_deref() {
            // The traveling pulse loops for as long as the step is active.
            Some("workflow-intro") => true,
            Some("custom-prompt") => now < self.entered + 0.6,
            _ => false,
        }
    }

    pub(super) fn draw(&self, ui: &Ui, rect: Rect, now: f64) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        match self.step.as_deref() {
            Some("workflow-intro") => self.draw_cycle(&painter, rect, now),
            Some("custom-prompt") => {
                let reveal = Tween::after(self.entered, 0.0, 0.6, Ease::BackOut)
                    .sample(now)
                    .unwrap_or(0.0);
                draw_stage_card(
                    &painter,
                    rect,
                    "Deep research prompt",
                    "Based on the estimation work we just did: research estimation \
                     techniques for business decisions, formatted for technical \
                     leadership.",
                    reveal,
                );
            }
            _ => {}
        }
    }

    fn draw_cycle(&self, painter: &Painter, rect: Rect, now: f64) {
        let scale = (rect.height().min(rect.width()) / 700.0).clamp(0.6, 1.3);
        let center = rect.center();
        let centers: Vec<Pos2> = STAGES
            .iter()
            .map(|(_, _, angle, _)| center + polar(angle.to_radians(), CYCLE_RADIUS * scale))
            .collect();

        let arrows: Vec<(Pos2, Pos2, Pos2)> = (0..STAGES.len())
            .map(|index| {
                let from = centers[index];
                let to = centers[(index + 1) % STAGES.len()];
                arrow_geometry(from, to, NODE_RADIUS * scale, CURVE_OFFSET * scale)
            })
            .collect();

        for (index, (tail, control, tip)) in arrows.iter().enumerate() {
            let progress = Tween::after(
                self.entered,
                ARROW_START + (index as f64) * ARROW_STAGGER,
                0.8,
                Ease::CubicInOut,
            )
            .sample(now)
            .unwrap_or(0.0);
            if progress <= 0.002 {
                continue;
            }

            let samples = (ARROW_SAMPLES as f32 * progress).ceil().max(2.0) as usize;
            let points: Vec<Pos2> = (0..=samples)
                .map(|step| bezier(*tail, *control, *tip, progress * (step as f32 / samples as f32)))
                .collect();
            painter.add(Shape::line(
                points,
                Stroke::new(3.0, Color32::from_gray(187)),
            ));

            if progress > 0.98 {
                let tangent = (*tip - bezier(*tail, *control, *tip, 0.96)).normalized();
                let side = vec2(-tangent.y, tangent.x);
                painter.add(Shape::convex_polygon(
                    vec![
                        *tip + tangent * 10.0,
                        *tip + side * 5.0,
                        *tip - side * 5.0,
                    ],
                    Color32::from_gray(187),
                    Stroke::NONE,
                ));
            }
        }

        for (index, (label, detail, _, color)) in STAGES.iter().enumerate() {
            let pop = Tween::after(
                self.entered,
                (index as f64) * NODE_STAGGER,
                0.6,
                Ease::BackOut,
            )
            .sample(now)
            .unwrap_or(0.0);
            if pop <= 0.002 {
                continue;
            }

            let position = centers[index];
            let radius = NODE_RADIUS * scale * (0.6 + 0.4 * pop);
            painter.circle_filled(position, radius, with_opacity(*color, pop));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(3.0, with_opacity(Color32::WHITE, pop)),
            );
            painter.text(
                position - vec2(0.0, 8.0),
                Align2::CENTER_CENTER,
                *label,
                FontId::proportional(14.0),
                with_opacity(Color32::from_rgb(34, 40, 49), pop),
            );
            painter.text(
                position + vec2(0.0, 12.0),
                Align2::CENTER_CENTER,
                *detail,
                FontId::proportional(10.0),
                with_opacity(Color32::from_rgb(52, 60, 70), pop),
            );
        }

        let travel = now - self.entered - PULSE_START;
        if travel >= 0.0 {
            let leg = ((travel / PULSE_LEG_SECONDS) as usize) % arrows.len();
            let along = ((travel / PULSE_LEG_SECONDS).fract()) as f32;
            let (tail, control, tip) = arrows[leg];
            let position = bezier(tail, control, tip, along);

            painter.circle_filled(
                position,
                8.0,
                with_opacity(Color32::from_rgb(0x34, 0x98, 0xdb), 0.9),
            );
            painter.circle_stroke(
                position,
                11.0,
                Stroke::new(2.0, Color32::from_rgba_unmultiplied(52, 152, 219, 90)),
            );
        }
    }
}

fn arrow_geometry(from: Pos2, to: Pos2, node_radius: f32, curve_offset: f32) -> (Pos2, Pos2, Pos2) {
    let delta = to - from;
    let direction = delta.normalized();
    let side = vec2(-direction.y, direction.x);
    let control = from + delta * 0.5 + side * curve_offset;
    (
        from + direction * node_radius,
        control,
        to - direction * node_radius,
    )
}

fn bezier(a: Pos2, control: Pos2, b: Pos2, t: f32) -> Pos2 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    let x = inv * inv * a.x + 2.0 * inv * t * control.x + t * t * b.x;
    let y = inv * inv * a.y + 2.0 * inv * t * control.y + t * t * b.y;
    Pos2::new(x, y)
}
