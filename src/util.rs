use eframe::egui::{Color32, Vec2, vec2};

pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let digits = value.strip_prefix('#')?;

    match digits.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (slot, ch) in channels.iter_mut().zip(digits.chars()) {
                let nibble = ch.to_digit(16)? as u8;
                *slot = (nibble << 4) | nibble;
            }
            Some(Color32::from_rgb(channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        _ => None,
    }
}

pub fn polar(angle: f32, radius: f32) -> Vec2 {
    vec2(angle.cos() * radius, angle.sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(
            parse_hex_color("#3498db"),
            Some(Color32::from_rgb(0x34, 0x98, 0xdb))
        );
    }

    #[test]
    fn parses_three_digit_hex() {
        assert_eq!(
            parse_hex_color("#f90"),
            Some(Color32::from_rgb(0xff, 0x99, 0x00))
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(parse_hex_color("3498db"), None);
        assert_eq!(parse_hex_color("#34"), None);
        assert_eq!(parse_hex_color("#34g8db"), None);
    }
}
