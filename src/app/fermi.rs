//! Market-sizing stage: the Fermi decomposition chain and the bounds /
//! sensitivity chart.

use eframe::egui::{Align2, Color32, FontId, Painter, Rect, Stroke, Ui, pos2, vec2};

use super::anim::{Ease, Tween};
use super::render_utils::{draw_stage_card, lerp, with_opacity};

const TREE_LEVELS: &[(&str, &str)] = &[
    ("US adults", "260M"),
    ("70% overweight or obese", "182M"),
    ("45% actively dieting", "82M"),
    ("35% digital adopters", "29M"),
    ("22% open to an AI chatbot", "6.4M SAM"),
    ("$3 ad revenue per user-year", "$19M"),
];

const BOUNDS_MAX: f32 = 60.0;
const BOUNDS_MARKERS: &[(f32, &str, bool)] = &[
    (4.0, "Pessimistic: $4M", false),
    (19.0, "Central: $19M", true),
    (60.0, "Optimistic: $60M", false),
];

const SENSITIVITY: &[(&str, f32)] = &[
    ("Digital adoption rate", 8.0),
    ("Chatbot preference", 6.0),
    ("Ad revenue", 4.0),
];

const LEVEL_STAGGER: f64 = 0.2;
const LEVEL_DURATION: f64 = 0.6;
const MARKER_STAGGER: f64 = 0.3;
const BAR_STAGGER: f64 = 0.25;

const INK: Color32 = Color32::from_rgb(44, 62, 80);
const MUTED_INK: Color32 = Color32::from_rgb(110, 120, 130);
const ACCENT_BLUE: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
const ACCENT_AMBER: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);

pub(super) struct FermiScene {
    step: Option<String>,
    entered: f64,
}

impl FermiScene {
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
            "search-style" | "structured-query" | "decomposition" | "bounds" => {
                self.step = Some(step.to_owned());
                self.entered = now;
            }
            _ => log::debug!("ignoring unknown market-sizing step {step:?}"),
        }
    }

    pub(super) fn animating(&self, now: f64) -> bool {
        let settle = match self.step.as_deref() {
            Some("decomposition") => {
                (TREE_LEVELS.len() as f64 - 1.0) * LEVEL_STAGGER + LEVEL_DURATION
            }
            Some("bounds") => 3.2,
            Some(_) => 0.6,
            None => 0.0,
        };
        now < self.entered + settle
    }

    pub(super) fn draw(&self, ui: &Ui, rect: Rect, now: f64) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        match self.step.as_deref() {
            Some("decomposition") => self.draw_tree(&painter, rect, now),
            Some("bounds") => self.draw_bounds(&painter, rect, now),
            Some("search-style") => {
                let reveal = Tween::after(self.entered, 0.0, 0.6, Ease::BackOut)
                    .sample(now)
                    .unwrap_or(0.0);
                draw_stage_card(
                    &painter,
                    rect,
                    "Simple query",
                    "Generic market figures with no way to adjust them for your product.",
                    reveal,
                );
            }
            Some("structured-query") => {
                let reveal = Tween::after(self.entered, 0.0, 0.6, Ease::BackOut)
                    .sample(now)
                    .unwrap_or(0.0);
                draw_stage_card(
                    &painter,
                    rect,
                    "Structured query",
                    "Role, context, product and audience shape the estimate before any \
                     numbers appear.",
                    reveal,
                );
            }
            _ => {}
        }
    }

    fn draw_tree(&self, painter: &Painter, rect: Rect, now: f64) {
        let panel = rect.shrink2(vec2(60.0, 40.0));
        painter.rect_filled(panel, 12.0, Color32::WHITE);

        let top = panel.top() + 50.0;
        let spacing = (panel.height() - 100.0) / (TREE_LEVELS.len() as f32 - 1.0);
        let x = panel.center().x;

        for (index, (label, value)) in TREE_LEVELS.iter().enumerate() {
            let reveal = Tween::after(
                self.entered,
                (index as f64) * LEVEL_STAGGER,
                LEVEL_DURATION,
                Ease::CubicOut,
            )
            .sample(now)
            .unwrap_or(0.0);
            if reveal <= 0.002 {
                continue;
            }

            let center = pos2(x, top + (index as f32) * spacing);
            if index > 0 {
                let previous = pos2(x, top + ((index - 1) as f32) * spacing);
                painter.line_segment(
                    [previous + vec2(0.0, 10.0), center - vec2(0.0, 10.0)],
                    Stroke::new(2.0, with_opacity(Color32::from_gray(153), reveal)),
                );
            }

            painter.circle_filled(center, 8.0, with_opacity(ACCENT_BLUE, reveal));
            painter.text(
                center + vec2(18.0, 0.0),
                Align2::LEFT_CENTER,
                format!("{label} \u{2192} {value}"),
                FontId::proportional(13.0),
                with_opacity(INK, reveal),
            );
        }
    }

    fn draw_bounds(&self, painter: &Painter, rect: Rect, now: f64) {
        let panel = rect.shrink2(vec2(60.0, 60.0));
        painter.rect_filled(panel, 12.0, Color32::WHITE);

        let left = panel.left() + 80.0;
        let right = panel.right() - 130.0;
        let scale_x = |value: f32| left + (value / BOUNDS_MAX) * (right - left);
        let line_y = panel.top() + 80.0;

        let growth = Tween::after(self.entered, 0.0, 0.6, Ease::CubicOut)
            .sample(now)
            .unwrap_or(0.0);
        if growth > 0.0 {
            let start = scale_x(BOUNDS_MARKERS[0].0);
            let end = lerp(start, scale_x(BOUNDS_MAX), growth);
            painter.line_segment(
                [pos2(start, line_y), pos2(end, line_y)],
                Stroke::new(4.0, Color32::from_gray(153)),
            );
        }

        for (index, (value, label, central)) in BOUNDS_MARKERS.iter().enumerate() {
            let delay = 0.7 + (index as f64) * MARKER_STAGGER;
            let pop = Tween::after(self.entered, delay, 0.4, Ease::BackOut)
                .sample(now)
                .unwrap_or(0.0);
            if pop <= 0.002 {
                continue;
            }

            let color = if *central { ACCENT_BLUE } else { ACCENT_AMBER };
            let position = pos2(scale_x(*value), line_y);
            painter.circle_filled(position, 8.0 * pop, with_opacity(color, pop));

            let label_reveal = Tween::after(self.entered, delay + 0.2, 0.3, Ease::Linear)
                .sample(now)
                .unwrap_or(0.0);
            painter.text(
                position + vec2(0.0, 30.0),
                Align2::CENTER_CENTER,
                *label,
                FontId::proportional(13.0),
                with_opacity(INK, label_reveal),
            );
        }

        let bars_top = line_y + 100.0;
        let bar_height = 26.0;
        let max_bar = (right - left).max(120.0) * 0.7;
        for (index, (factor, impact)) in SENSITIVITY.iter().enumerate() {
            let y = bars_top + (index as f32) * (bar_height + 14.0);
            let reveal = Tween::after(
                self.entered,
                1.6 + (index as f64) * BAR_STAGGER,
                0.8,
                Ease::CubicOut,
            )
            .sample(now)
            .unwrap_or(0.0);
            if reveal <= 0.002 {
                continue;
            }

            painter.text(
                pos2(left, y + bar_height * 0.5),
                Align2::LEFT_CENTER,
                *factor,
                FontId::proportional(12.0),
                with_opacity(MUTED_INK, reveal),
            );

            let width = (impact / 10.0) * max_bar * reveal;
            let bar = Rect::from_min_size(pos2(left + 170.0, y), vec2(width, bar_height));
            painter.rect_filled(bar, 4.0, with_opacity(ACCENT_BLUE, 0.75));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_entering_the_same_step_keeps_the_original_start() {
        let mut scene = FermiScene::new();
        scene.enter_step("decomposition", 1.0);
        scene.enter_step("decomposition", 5.0);
        assert_eq!(scene.entered, 1.0);
    }

    #[test]
    fn unknown_steps_are_ignored() {
        let mut scene = FermiScene::new();
        scene.enter_step("decomposition", 1.0);
        scene.enter_step("unit-economics-extended", 2.0);
        assert_eq!(scene.step.as_deref(), Some("decomposition"));
    }

    #[test]
    fn animation_settles_after_the_last_reveal() {
        let mut scene = FermiScene::new();
        assert!(!scene.animating(0.0));

        scene.enter_step("bounds", 10.0);
        assert!(scene.animating(10.5));
        assert!(scene.animating(12.9));
        assert!(!scene.animating(13.5));
    }
}
