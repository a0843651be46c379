use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Vec2, vec2};

pub(super) fn lerp(from: f32, to: f32, amount: f32) -> f32 {
    from + (to - from) * amount
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Uniform world-to-stage scale so the layout survives window resizes
/// without touching simulation coordinates.
pub(super) fn fit_scale(rect: Rect) -> f32 {
    (rect.width().min(rect.height()) / 900.0).clamp(0.45, 1.6)
}

pub(super) fn world_to_screen(rect: Rect, scale: f32, world: Vec2) -> Pos2 {
    rect.center() + world * scale
}

/// Centered interstitial card used by the chart scenes for steps whose
/// content lives in the narrative column.
pub(super) fn draw_stage_card(
    painter: &Painter,
    rect: Rect,
    title: &str,
    caption: &str,
    reveal: f32,
) {
    if reveal <= 0.002 {
        return;
    }

    let width = (rect.width() - 120.0).clamp(260.0, 520.0);
    let card = Rect::from_center_size(rect.center(), vec2(width, 150.0));
    painter.rect_filled(card, 12.0, with_opacity(Color32::WHITE, 0.94 * reveal));
    painter.text(
        card.center() - vec2(0.0, 28.0),
        Align2::CENTER_CENTER,
        title,
        FontId::proportional(19.0),
        with_opacity(Color32::from_rgb(44, 62, 80), reveal),
    );

    let body = painter.layout(
        caption.to_owned(),
        FontId::proportional(13.0),
        with_opacity(Color32::from_rgb(90, 100, 110), reveal),
        width - 60.0,
    );
    let offset = vec2(body.size().x * 0.5, -4.0);
    painter.galley(
        card.center() - offset,
        body,
        with_opacity(Color32::from_rgb(90, 100, 110), reveal),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints_return_the_inputs() {
        let a = Color32::from_rgb(10, 20, 30);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(a, b, 0.0), a);
        let full = blend_color(a, b, 1.0);
        assert_eq!((full.r(), full.g(), full.b()), (200, 100, 50));
    }

    #[test]
    fn opacity_scales_alpha_only() {
        let color = with_opacity(Color32::from_rgb(50, 60, 70), 0.5);
        assert_eq!((color.r(), color.g(), color.b()), (50, 60, 70));
        assert_eq!(color.a(), 127);
    }
}
