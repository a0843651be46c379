use eframe::egui::{
    self, Align, Align2, Color32, FontId, Layout, Rect, RichText, Sense, Stroke, StrokeKind, Ui,
    vec2,
};

use super::ViewModel;
use super::deck::{Direction, STEPS, Step};

const ACCENT: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);

impl ViewModel {
    pub(super) fn draw_header(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.label(RichText::new("promptdeck").strong());
            ui.separator();
            ui.label(self.active_section.title());

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("{} concepts", self.config.entity_total()))
                        .color(Color32::from_gray(140)),
                );
                ui.separator();
                if let Some(index) = self.tracker.current() {
                    ui.label(format!("step {} / {}", index + 1, STEPS.len()));
                }
            });
        });
    }

    /// One fixed-height card per narrative step; the returned event is the
    /// tracker's crossing for this frame, if any.
    pub(super) fn draw_narrative(&mut self, ui: &mut Ui) -> Option<(usize, Direction)> {
        let card_height = (ui.available_height() * 0.85).max(340.0);

        let output = egui::ScrollArea::vertical()
            .id_salt("narrative_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = 0.0;
                for (index, step) in STEPS.iter().enumerate() {
                    let (rect, _) = ui.allocate_exact_size(
                        vec2(ui.available_width(), card_height),
                        Sense::hover(),
                    );
                    self.draw_step_card(ui, rect, index, step);
                }
            });

        self.tracker.observe(
            output.state.offset.y,
            output.inner_rect.height(),
            card_height,
            STEPS.len(),
        )
    }

    fn draw_step_card(&self, ui: &Ui, rect: Rect, index: usize, step: &Step) {
        let painter = ui.painter_at(rect);
        let active = self.tracker.current() == Some(index);
        let card = rect.shrink(14.0);

        let fill = if active {
            Color32::from_rgb(40, 47, 58)
        } else {
            Color32::from_rgb(28, 32, 39)
        };
        painter.rect_filled(card, 10.0, fill);
        if active {
            painter.rect_stroke(card, 10.0, Stroke::new(1.5, ACCENT), StrokeKind::Inside);
        }

        let margin = vec2(24.0, 26.0);
        painter.text(
            card.min + margin,
            Align2::LEFT_TOP,
            step.section.title(),
            FontId::proportional(11.0),
            Color32::from_gray(130),
        );
        painter.text(
            card.min + margin + vec2(0.0, 22.0),
            Align2::LEFT_TOP,
            step.title,
            FontId::proportional(21.0),
            if active {
                Color32::from_gray(240)
            } else {
                Color32::from_gray(190)
            },
        );

        let body = painter.layout(
            step.body.to_owned(),
            FontId::proportional(14.0),
            Color32::from_gray(170),
            card.width() - margin.x * 2.0,
        );
        painter.galley(
            card.min + margin + vec2(0.0, 62.0),
            body,
            Color32::from_gray(170),
        );

        painter.text(
            card.max - vec2(18.0, 14.0),
            Align2::RIGHT_BOTTOM,
            format!("{} / {}", index + 1, STEPS.len()),
            FontId::proportional(11.0),
            Color32::from_gray(110),
        );
    }
}
