use super::Color;

/// Ten-color categorical scheme, assigned to codes in sorted order.
pub const CATEGORY10: [u32; 10] = [
    0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x7F7F7F, 0xBCBD22,
    0x17BECF,
];

/// Color for codes the palette was not built with.
pub const FALLBACK: Color = Color(0xBBBBBB);
pub const HIGHLIGHT: Color = Color(0xFF0000);
pub const BACKGROUND_CELL: Color = Color(0xD3D3D3);

/// Ordinal mapping from annotation code to color.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    codes: Vec<String>,
}

impl Palette {
    /// `codes` is expected sorted, as [`crate::Dataset::annotation_codes`] returns them.
    pub fn new(codes: &[String]) -> Self {
        Self {
            codes: codes.to_vec(),
        }
    }

    pub fn color_of(&self, code: &str) -> Color {
        self.codes
            .iter()
            .position(|candidate| candidate == code)
            .map(|idx| Color(CATEGORY10[idx % CATEGORY10.len()]))
            .unwrap_or(FALLBACK)
    }

    /// `(code, color)` pairs in legend order.
    pub fn legend(&self) -> Vec<(String, Color)> {
        self.codes
            .iter()
            .map(|code| (code.clone(), self.color_of(code)))
            .collect()
    }
}

/// Heatmap cell color: the highlighted code stands out, everything else is muted.
pub fn heatmap_color(code: &str, highlight_code: &str) -> Color {
    if code == highlight_code {
        HIGHLIGHT
    } else {
        BACKGROUND_CELL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_follow_code_order_and_wrap() {
        let codes: Vec<String> = (0..12).map(|i| format!("c{i:02}")).collect();
        let palette = Palette::new(&codes);
        assert_eq!(palette.color_of("c00"), Color(0x1F77B4));
        assert_eq!(palette.color_of("c10"), Color(0x1F77B4));
        assert_eq!(palette.color_of("c03"), Color(0xD62728));
    }

    #[test]
    fn unknown_codes_fall_back() {
        let palette = Palette::new(&["N".to_string()]);
        assert_eq!(palette.color_of("?"), FALLBACK);
        assert_eq!(palette.legend().len(), 1);
    }

    #[test]
    fn heatmap_highlights_single_code() {
        assert_eq!(heatmap_color("V", "V"), HIGHLIGHT);
        assert_eq!(heatmap_color("N", "V"), BACKGROUND_CELL);
    }
}
