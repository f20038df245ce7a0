//! Widget appearance stream generation.
//!
//! Filled fields get a fresh normal appearance so the value survives flattening;
//! viewers are not asked to regenerate anything.

use lazy_static::lazy_static;
use regex::Regex;

/// Inner padding between the widget border and the text, in points.
const PADDING: f32 = 2.0;
/// Smallest size auto-sized text shrinks to.
const MIN_AUTO_SIZE: f32 = 4.0;
/// Largest size auto-sized text grows to.
const MAX_AUTO_SIZE: f32 = 12.0;

lazy_static! {
    static ref TF_OPERATOR: Regex = Regex::new(r"/([^\s/\[\]()<>]+)\s+(-?\d*\.?\d+)\s+Tf").unwrap();
}

/// Parsed `/DA` default appearance string.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppearance {
    /// Font resource name without the leading slash
    pub font: String,
    /// Font size; `0` means auto
    pub size: f32,
    /// Remaining operators (normally the fill color)
    pub color_ops: String,
}

impl Default for DefaultAppearance {
    fn default() -> Self {
        Self {
            font: "Helv".to_string(),
            size: 0.0,
            color_ops: "0 g".to_string(),
        }
    }
}

impl DefaultAppearance {
    /// Parse a `/DA` string such as `/HeBo 9 Tf 0 g`.
    pub fn parse(da: &str) -> Self {
        let mut parsed = DefaultAppearance::default();
        if let Some(caps) = TF_OPERATOR.captures(da) {
            parsed.font = caps[1].to_string();
            parsed.size = caps[2].parse::<f32>().unwrap_or(0.0).max(0.0);
            let rest = TF_OPERATOR.replace(da, "");
            let rest = rest.trim();
            if !rest.is_empty() {
                parsed.color_ops = rest.to_string();
            }
        }
        parsed
    }
}

/// Layout of a text value inside its widget.
#[derive(Debug, Clone)]
pub struct TextLayout {
    /// Widget width
    pub width: f32,
    /// Widget height
    pub height: f32,
    /// `/Q`: 0 left, 1 centered, 2 right
    pub quadding: i64,
    /// Comb cell count (`/MaxLen` with the comb flag)
    pub comb: Option<usize>,
    /// Render as asterisks
    pub password: bool,
    /// Anchor text at the top of the box
    pub multiline: bool,
}

/// Generate the normal appearance content for a text field.
pub fn text_field_appearance(layout: &TextLayout, text: &str, da: &DefaultAppearance) -> Vec<u8> {
    let text: String = if layout.password {
        "*".repeat(text.chars().count())
    } else {
        text.to_string()
    };

    let mut stream = String::new();
    stream.push_str("/Tx BMC\n");

    if !text.is_empty() {
        let size = font_size(layout, &text, da.size);
        let y = if layout.multiline {
            layout.height - PADDING - size
        } else {
            (layout.height - size * 0.72) / 2.0
        };

        stream.push_str("q\n");
        stream.push_str(&format!(
            "{} {} {} {} re W n\n",
            PADDING / 2.0,
            PADDING / 2.0,
            (layout.width - PADDING).max(0.0),
            (layout.height - PADDING).max(0.0)
        ));
        stream.push_str("BT\n");
        stream.push_str(&format!("{}\n", da.color_ops));
        stream.push_str(&format!("/{} {} Tf\n", da.font, fmt_num(size)));

        match layout.comb {
            Some(cells) if cells > 0 => {
                let cell = layout.width / cells as f32;
                let mut prev_x = 0.0;
                for (i, ch) in text.chars().take(cells).enumerate() {
                    let glyph = ch.to_string();
                    let x = cell * i as f32 + (cell - text_width(&glyph, size)) / 2.0;
                    let dy = if i == 0 { y } else { 0.0 };
                    stream.push_str(&format!("{} {} Td\n", fmt_num(x - prev_x), fmt_num(dy)));
                    stream.push_str(&format!("({}) Tj\n", escape_pdf_string(&glyph)));
                    prev_x = x;
                }
            },
            _ => {
                let tw = text_width(&text, size);
                let x = match layout.quadding {
                    1 => (layout.width - tw) / 2.0,
                    2 => layout.width - PADDING - tw,
                    _ => PADDING,
                };
                stream.push_str(&format!("{} {} Td\n", fmt_num(x.max(PADDING)), fmt_num(y)));
                stream.push_str(&format!("({}) Tj\n", escape_pdf_string(&text)));
            },
        }

        stream.push_str("ET\nQ\n");
    }

    stream.push_str("EMC\n");
    to_win_ansi(&stream)
}

/// Generate the checked appearance for a checkbox without one.
pub fn checkbox_on_appearance(width: f32, height: f32) -> Vec<u8> {
    let margin = width * 0.2;
    let mut stream = String::new();
    stream.push_str("q\n0 g 0 G\n");
    stream.push_str(&format!("{} w\n", fmt_num(width * 0.1)));
    stream.push_str(&format!(
        "{} {} m {} {} l {} {} l S\n",
        fmt_num(margin),
        fmt_num(height * 0.5),
        fmt_num(width * 0.4),
        fmt_num(margin),
        fmt_num(width - margin),
        fmt_num(height - margin)
    ));
    stream.push_str("Q\n");
    stream.into_bytes()
}

fn font_size(layout: &TextLayout, text: &str, requested: f32) -> f32 {
    if requested > 0.0 {
        return requested;
    }

    let mut size = ((layout.height - 2.0 * PADDING) / 1.15).clamp(MIN_AUTO_SIZE, MAX_AUTO_SIZE);
    if layout.comb.is_none() {
        let available = layout.width - 2.0 * PADDING;
        let tw = text_width(text, size);
        if tw > available && available > 0.0 {
            size = (size * available / tw).max(MIN_AUTO_SIZE);
        }
    }
    size
}

/// Approximate Helvetica advance width of `text` at `size`.
fn text_width(text: &str, size: f32) -> f32 {
    let units: f32 = text
        .chars()
        .map(|c| match c {
            ' ' | ',' | '.' | '\'' | 'i' | 'j' | 'l' | '!' | 'I' => 278.0,
            '-' => 333.0,
            '0'..='9' => 556.0,
            'M' | 'W' | 'm' => 833.0,
            'A'..='Z' => 667.0,
            _ => 556.0,
        })
        .sum();
    units * size / 1000.0
}

fn fmt_num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '\r' => result.push_str("\\r"),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Encode for a standard font with WinAnsi-compatible Latin-1 codes.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) < 0x100 { c as u32 as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(width: f32, height: f32) -> TextLayout {
        TextLayout {
            width,
            height,
            quadding: 0,
            comb: None,
            password: false,
            multiline: false,
        }
    }

    #[test]
    fn test_parse_default_appearance() {
        let da = DefaultAppearance::parse("/HeBo 9 Tf 0 g");
        assert_eq!(da.font, "HeBo");
        assert_eq!(da.size, 9.0);
        assert_eq!(da.color_ops, "0 g");

        let da = DefaultAppearance::parse("0 0 1 rg /Helv 0 Tf");
        assert_eq!(da.font, "Helv");
        assert_eq!(da.size, 0.0);
        assert_eq!(da.color_ops, "0 0 1 rg");

        assert_eq!(DefaultAppearance::parse("garbage"), DefaultAppearance::default());
    }

    #[test]
    fn test_text_appearance_contains_value() {
        let da = DefaultAppearance::parse("/Helv 10 Tf 0 g");
        let stream = text_field_appearance(&layout(200.0, 18.0), "JANE (Q)", &da);
        let stream = String::from_utf8(stream).unwrap();
        assert!(stream.starts_with("/Tx BMC"));
        assert!(stream.contains("/Helv 10 Tf"));
        assert!(stream.contains("(JANE \\(Q\\)) Tj"));
        assert!(stream.trim_end().ends_with("EMC"));
    }

    #[test]
    fn test_empty_text_has_no_text_object() {
        let stream = text_field_appearance(&layout(200.0, 18.0), "", &DefaultAppearance::default());
        assert_eq!(stream, b"/Tx BMC\nEMC\n".to_vec());
    }

    #[test]
    fn test_auto_size_shrinks_long_text() {
        let short = font_size(&layout(300.0, 20.0), "AB", 0.0);
        let long = font_size(&layout(60.0, 20.0), "A VERY LONG STREET ADDRESS", 0.0);
        assert!(short <= MAX_AUTO_SIZE);
        assert!(long < short);
        assert!(long >= MIN_AUTO_SIZE);
        assert_eq!(font_size(&layout(60.0, 20.0), "X", 7.5), 7.5);
    }

    #[test]
    fn test_comb_places_each_character() {
        let mut comb = layout(90.0, 18.0);
        comb.comb = Some(9);
        let stream = text_field_appearance(&comb, "123456789", &DefaultAppearance::default());
        let stream = String::from_utf8(stream).unwrap();
        assert_eq!(stream.matches(") Tj").count(), 9);
        assert!(stream.contains("(1) Tj"));
        assert!(stream.contains("(9) Tj"));
    }

    #[test]
    fn test_password_is_masked() {
        let mut masked = layout(100.0, 18.0);
        masked.password = true;
        let stream = text_field_appearance(&masked, "secret", &DefaultAppearance::default());
        let stream = String::from_utf8(stream).unwrap();
        assert!(stream.contains("(******) Tj"));
        assert!(!stream.contains("secret"));
    }

    #[test]
    fn test_non_latin_characters_fall_back() {
        let stream = text_field_appearance(&layout(100.0, 18.0), "ÉŁ", &DefaultAppearance::default());
        assert!(stream.windows(4).any(|w| w == [b'(', 0xC9, b'?', b')']));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(0.126), "0.13");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn test_checkbox_on_appearance() {
        let stream = String::from_utf8(checkbox_on_appearance(10.0, 10.0)).unwrap();
        assert!(stream.contains("2 5 m 4 2 l 8 8 l S"));
    }
}
