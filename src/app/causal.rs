//! Causal-reasoning stage: the completion-rate bar chart and the confounder
//! diagram.

use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Ui, pos2, vec2,
};

use super::anim::{Ease, Tween};
use super::render_utils::{draw_stage_card, with_opacity};

const BARS: &[(&str, f32, Color32)] = &[
    ("Diabetes pages", 25.0, Color32::from_rgb(0xe7, 0x4c, 0x3c)),
    ("Acne pages", 67.0, Color32::from_rgb(0x27, 0xae, 0x60)),
    ("Short flow", 60.0, Color32::from_rgb(0x34, 0x98, 0xdb)),
    ("Long flow", 35.0, Color32::from_rgb(0xf3, 0x9c, 0x12)),
];

// Normalized positions inside the diagram panel.
const DAG_NODES: &[(&str, f32, f32)] = &[
    ("CONDITION\ndiabetes vs acne", 0.5, 0.16),
    ("Content", 0.22, 0.5),
    ("User intent", 0.5, 0.5),
    ("Flow length", 0.78, 0.5),
    ("COMPLETION", 0.5, 0.84),
];
const DAG_EDGES: &[(usize, usize)] = &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)];
const CONFOUNDER: usize = 0;

const INK: Color32 = Color32::from_rgb(44, 62, 80);
const EDGE_BLUE: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
const WARNING_RED: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

pub(super) struct CausalScene {
    step: Option<String>,
    entered: f64,
}

impl CausalScene {
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
            "data-pattern" | "causal-model" | "experiment-roadmap" => {
                self.step = Some(step.to_owned());
                self.entered = now;
            }
            _ => log::debug!("ignoring unknown causal step {step:?}"),
        }
    }

    pub(super) fn animating(&self, now: f64) -> bool {
        let settle = match self.step.as_deref() {
            Some("data-pattern") => (BARS.len() as f64 - 1.0) * 0.2 + 1.5,
            Some("causal-model") => 3.3,
            Some(_) => 0.6,
            None => 0.0,
        };
        now < self.entered + settle
    }

    pub(super) fn draw(&self, ui: &Ui, rect: Rect, now: f64) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        match self.step.as_deref() {
            Some("data-pattern") => self.draw_bars(&painter, rect, now),
            Some("causal-model") => self.draw_diagram(&painter, rect, now),
            Some("experiment-roadmap") => {
                let reveal = Tween::after(self.entered, 0.0, 0.6, Ease::BackOut)
                    .sample(now)
                    .unwrap_or(0.0);
                draw_stage_card(
                    &painter,
                    rect,
                    "Randomize within condition",
                    "Assign flow length at random inside each condition group; the \
                     confounder can no longer hide in the comparison.",
                    reveal,
                );
            }
            _ => {}
        }
    }

    fn draw_bars(&self, painter: &Painter, rect: Rect, now: f64) {
        let panel = rect.shrink2(vec2(70.0, 70.0));
        painter.rect_filled(panel, 12.0, Color32::WHITE);

        let label_x = panel.left() + 30.0;
        let bar_x = panel.left() + 180.0;
        let max_width = (panel.right() - 60.0 - bar_x).max(120.0);
        let bar_height = 36.0;
        let spacing = ((panel.height() - 100.0) / BARS.len() as f32).max(bar_height + 12.0);

        painter.text(
            pos2(panel.center().x, panel.top() + 26.0),
            Align2::CENTER_CENTER,
            "Completion rate by page and flow",
            FontId::proportional(15.0),
            INK,
        );

        for (index, (label, value, color)) in BARS.iter().enumerate() {
            let y = panel.top() + 60.0 + (index as f32) * spacing;
            let growth = Tween::after(self.entered, (index as f64) * 0.2, 1.0, Ease::CubicOut)
                .sample(now)
                .unwrap_or(0.0);
            if growth <= 0.002 {
                continue;
            }

            painter.text(
                pos2(label_x, y + bar_height * 0.5),
                Align2::LEFT_CENTER,
                *label,
                FontId::proportional(13.0),
                INK,
            );

            let width = (value / 100.0) * max_width * growth;
            let bar = Rect::from_min_size(pos2(bar_x, y), vec2(width, bar_height));
            painter.rect_filled(bar, 3.0, with_opacity(*color, 0.7));

            let value_reveal =
                Tween::after(self.entered, (index as f64) * 0.2 + 1.0, 0.5, Ease::Linear)
                    .sample(now)
                    .unwrap_or(0.0);
            painter.text(
                pos2(bar.right() + 10.0, y + bar_height * 0.5),
                Align2::LEFT_CENTER,
                format!("{value:.0}%"),
                FontId::proportional(13.0),
                with_opacity(INK, value_reveal),
            );
        }
    }

    fn draw_diagram(&self, painter: &Painter, rect: Rect, now: f64) {
        let panel = rect.shrink2(vec2(70.0, 50.0));
        painter.rect_filled(panel, 12.0, Color32::WHITE);

        let place = |nx: f32, ny: f32| -> Pos2 {
            pos2(
                panel.left() + nx * panel.width(),
                panel.top() + ny * panel.height(),
            )
        };

        for (index, (from, to)) in DAG_EDGES.iter().enumerate() {
            let reveal = Tween::after(self.entered, 0.8 + (index as f64) * 0.2, 0.6, Ease::CubicOut)
                .sample(now)
                .unwrap_or(0.0);
            if reveal <= 0.002 {
                continue;
            }

            let start = place(DAG_NODES[*from].1, DAG_NODES[*from].2);
            let end = place(DAG_NODES[*to].1, DAG_NODES[*to].2);
            let direction = (end - start).normalized();
            let tail = start + direction * 38.0;
            let tip = end - direction * 40.0;
            let opacity = 0.7 * reveal;

            painter.line_segment(
                [tail, tip],
                Stroke::new(3.0, with_opacity(EDGE_BLUE, opacity)),
            );

            let side = vec2(-direction.y, direction.x);
            painter.add(Shape::convex_polygon(
                vec![
                    tip + direction * 10.0,
                    tip + side * 5.0,
                    tip - side * 5.0,
                ],
                with_opacity(EDGE_BLUE, opacity),
                Stroke::NONE,
            ));
        }

        for (index, (label, nx, ny)) in DAG_NODES.iter().enumerate() {
            let reveal = Tween::after(self.entered, (index as f64) * 0.2, 0.6, Ease::CubicOut)
                .sample(now)
                .unwrap_or(0.0);
            if reveal <= 0.002 {
                continue;
            }

            let center = place(*nx, *ny);
            let node = Rect::from_center_size(center, vec2(160.0, 60.0));
            let (fill, stroke) = if index == CONFOUNDER {
                (
                    Color32::from_rgb(0xf3, 0x9c, 0x12),
                    Color32::from_rgb(0xe6, 0x7e, 0x22),
                )
            } else {
                (
                    Color32::from_rgb(0xec, 0xf0, 0xf1),
                    Color32::from_rgb(0xbd, 0xc3, 0xc7),
                )
            };

            painter.rect_filled(node, 8.0, with_opacity(fill, reveal));
            painter.rect_stroke(
                node,
                8.0,
                Stroke::new(2.0, with_opacity(stroke, reveal)),
                StrokeKind::Inside,
            );

            let mut line_y = center.y - (label.lines().count() as f32 - 1.0) * 8.0;
            for line in label.lines() {
                painter.text(
                    pos2(center.x, line_y),
                    Align2::CENTER_CENTER,
                    line,
                    FontId::proportional(12.0),
                    with_opacity(INK, reveal),
                );
                line_y += 16.0;
            }
        }

        let callout = Tween::after(self.entered, 2.0, 0.8, Ease::CubicOut)
            .sample(now)
            .unwrap_or(0.0);
        painter.text(
            pos2(panel.center().x, panel.top() + 24.0),
            Align2::CENTER_CENTER,
            "CONDITION is a confounder",
            FontId::proportional(17.0),
            with_opacity(WARNING_RED, callout),
        );

        let footnote = Tween::after(self.entered, 2.5, 0.8, Ease::CubicOut)
            .sample(now)
            .unwrap_or(0.0);
        painter.text(
            pos2(panel.center().x, panel.bottom() - 20.0),
            Align2::CENTER_CENTER,
            "Correlation \u{2260} causation",
            FontId::proportional(14.0),
            with_opacity(Color32::from_gray(110), footnote),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_diagram_edge_references_a_node() {
        for (from, to) in DAG_EDGES {
            assert!(*from < DAG_NODES.len());
            assert!(*to < DAG_NODES.len());
            assert_ne!(from, to);
        }
    }

    #[test]
    fn step_changes_restart_the_reveal_clock() {
        let mut scene = CausalScene::new();
        scene.enter_step("data-pattern", 1.0);
        assert_eq!(scene.entered, 1.0);

        scene.enter_step("causal-model", 6.0);
        assert_eq!(scene.entered, 6.0);
        assert!(scene.animating(6.1));
        assert!(!scene.animating(20.0));
    }

    #[test]
    fn unknown_steps_leave_the_scene_unchanged() {
        let mut scene = CausalScene::new();
        scene.enter_step("causal-model", 2.0);
        scene.enter_step("regression-discontinuity", 3.0);
        assert_eq!(scene.step.as_deref(), Some("causal-model"));
        assert_eq!(scene.entered, 2.0);
    }
}
