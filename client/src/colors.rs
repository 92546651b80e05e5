use gridlot_shared::CellStatus;
use gridlot_shared::colors::{boost_contrast, owner_color};

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Brighten a color by a factor (1.0 = no change, >1.0 = brighter).
pub fn brighten(r: u8, g: u8, b: u8, factor: f64) -> (u8, u8, u8) {
    (
        ((r as f64 * factor).min(255.0)) as u8,
        ((g as f64 * factor).min(255.0)) as u8,
        ((b as f64 * factor).min(255.0)) as u8,
    )
}

/// Status/accent colors shared by every backend so switching backends never
/// changes what a cell means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: (u8, u8, u8),
    pub unsold: (u8, u8, u8),
    pub alive: (u8, u8, u8),
    pub eliminated: (u8, u8, u8),
    pub selection_outline: (u8, u8, u8),
    pub owned_outline: (u8, u8, u8),
    pub label: (u8, u8, u8),
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            background: (12, 14, 23),
            unsold: (52, 58, 76),
            alive: (46, 160, 67),
            eliminated: (122, 44, 52),
            selection_outline: (245, 197, 66),
            owned_outline: (226, 224, 216),
            label: (220, 218, 210),
        }
    }

    /// Touch palette: same hues pushed toward saturation and separated in
    /// lightness, for small sunlit screens.
    pub fn high_contrast() -> Self {
        let base = Self::standard();
        Self {
            background: (8, 9, 16),
            unsold: boost_contrast(base.unsold.0, base.unsold.1, base.unsold.2, 1.4, 0.06),
            alive: boost_contrast(base.alive.0, base.alive.1, base.alive.2, 1.5, 0.08),
            eliminated: boost_contrast(
                base.eliminated.0,
                base.eliminated.1,
                base.eliminated.2,
                1.5,
                0.08,
            ),
            selection_outline: base.selection_outline,
            owned_outline: (255, 255, 255),
            label: (238, 236, 228),
        }
    }
}

/// Fill color for one cell. Alive cells can optionally take their owner's
/// deterministic color instead of the flat alive green; selection and
/// ownership are outlines, not fills, so they stay legible on any status.
pub fn cell_fill(
    status: CellStatus,
    owner: Option<&str>,
    owner_tint: bool,
    palette: &Palette,
) -> (u8, u8, u8) {
    match status {
        CellStatus::Unsold => palette.unsold,
        CellStatus::Alive => match owner {
            Some(owner) if owner_tint => owner_color(owner),
            _ => palette.alive,
        },
        CellStatus::Eliminated => palette.eliminated,
    }
}

#[cfg(test)]
mod tests {
    use super::{Palette, brighten, cell_fill, rgba_css};
    use gridlot_shared::CellStatus;
    use gridlot_shared::colors::rgb_to_hsl;

    #[test]
    fn rgba_css_formats() {
        assert_eq!(rgba_css(12, 14, 23, 0.5), "rgba(12,14,23,0.5)");
    }

    #[test]
    fn brighten_saturates_at_white() {
        assert_eq!(brighten(200, 200, 200, 2.0), (255, 255, 255));
        assert_eq!(brighten(10, 20, 30, 1.0), (10, 20, 30));
    }

    #[test]
    fn status_drives_fill() {
        let palette = Palette::standard();
        assert_eq!(
            cell_fill(CellStatus::Unsold, None, true, &palette),
            palette.unsold
        );
        assert_eq!(
            cell_fill(CellStatus::Alive, Some("p_1"), false, &palette),
            palette.alive
        );
        assert_eq!(
            cell_fill(CellStatus::Eliminated, Some("p_1"), true, &palette),
            palette.eliminated
        );
    }

    #[test]
    fn owner_tint_only_applies_to_alive_cells() {
        let palette = Palette::standard();
        let tinted = cell_fill(CellStatus::Alive, Some("p_1"), true, &palette);
        assert_ne!(tinted, palette.alive);
        // Same owner, same color on every redraw
        assert_eq!(tinted, cell_fill(CellStatus::Alive, Some("p_1"), true, &palette));
    }

    #[test]
    fn high_contrast_raises_saturation() {
        let standard = Palette::standard();
        let contrast = Palette::high_contrast();
        let (_, s_std, _) = rgb_to_hsl(standard.alive.0, standard.alive.1, standard.alive.2);
        let (_, s_hc, _) = rgb_to_hsl(contrast.alive.0, contrast.alive.1, contrast.alive.2);
        assert!(s_hc >= s_std);
    }
}
