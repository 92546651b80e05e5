/// Coarse device classification; detected once at mount, not per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Touch,
}

/// The four rendering backends. All draw the same culled range with the same
/// color table; they differ in how cells become pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// One element per cell of the whole grid. Only viable for small grids.
    PerCellMarkup,
    /// Elements for the culled range only, absolutely positioned.
    VirtualizedMarkup,
    RasterDesktop,
    RasterTouch,
}

/// Largest grid the per-cell markup backend is allowed to materialize.
pub const PER_CELL_MAX_CELLS: u32 = 1_000;
/// Above this, even desktops leave markup for the pixel buffer.
pub const VIRTUALIZED_MAX_CELLS: u32 = 5_000;

/// Pick the backend for a grid size and device class. Pure and stateless:
/// re-evaluated only when either input changes, and switching must not lose
/// camera/selection/reveal state (none of it lives in the backend).
pub fn select_backend(total_cells: u32, device: DeviceClass) -> Backend {
    match device {
        DeviceClass::Desktop => {
            if total_cells <= PER_CELL_MAX_CELLS {
                Backend::PerCellMarkup
            } else if total_cells <= VIRTUALIZED_MAX_CELLS {
                Backend::VirtualizedMarkup
            } else {
                Backend::RasterDesktop
            }
        }
        DeviceClass::Touch => {
            if total_cells <= PER_CELL_MAX_CELLS {
                Backend::PerCellMarkup
            } else {
                Backend::RasterTouch
            }
        }
    }
}

/// Next-safest backend when the current one cannot draw (e.g. no 2D
/// context): rasterized → virtualized → per-cell → give up.
pub fn demote(backend: Backend) -> Option<Backend> {
    match backend {
        Backend::RasterDesktop | Backend::RasterTouch => Some(Backend::VirtualizedMarkup),
        Backend::VirtualizedMarkup => Some(Backend::PerCellMarkup),
        Backend::PerCellMarkup => None,
    }
}

/// Device class from touch capability, with a UA fallback for browsers that
/// report zero touch points on touch hardware.
pub fn detect_device_class() -> DeviceClass {
    let Some(window) = web_sys::window() else {
        return DeviceClass::Desktop;
    };
    let navigator = window.navigator();
    if navigator.max_touch_points() > 0 {
        return DeviceClass::Touch;
    }
    let ua = navigator
        .user_agent()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mobile = ua.contains("android")
        || ua.contains("iphone")
        || ua.contains("ipad")
        || ua.contains("mobile");
    if mobile {
        DeviceClass::Touch
    } else {
        DeviceClass::Desktop
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, DeviceClass, demote, select_backend};

    #[test]
    fn small_grids_use_markup_everywhere() {
        assert_eq!(
            select_backend(1_000, DeviceClass::Desktop),
            Backend::PerCellMarkup
        );
        assert_eq!(
            select_backend(100, DeviceClass::Touch),
            Backend::PerCellMarkup
        );
    }

    #[test]
    fn mid_grids_split_by_device() {
        assert_eq!(
            select_backend(2_500, DeviceClass::Desktop),
            Backend::VirtualizedMarkup
        );
        assert_eq!(
            select_backend(2_500, DeviceClass::Touch),
            Backend::RasterTouch
        );
    }

    #[test]
    fn large_grids_rasterize() {
        assert_eq!(
            select_backend(5_001, DeviceClass::Desktop),
            Backend::RasterDesktop
        );
        // 200k cells on a phone: the raster-touch path, no exceptions.
        assert_eq!(
            select_backend(200_000, DeviceClass::Touch),
            Backend::RasterTouch
        );
    }

    #[test]
    fn demotion_chain_ends_at_per_cell() {
        assert_eq!(
            demote(Backend::RasterDesktop),
            Some(Backend::VirtualizedMarkup)
        );
        assert_eq!(
            demote(Backend::RasterTouch),
            Some(Backend::VirtualizedMarkup)
        );
        assert_eq!(
            demote(Backend::VirtualizedMarkup),
            Some(Backend::PerCellMarkup)
        );
        assert_eq!(demote(Backend::PerCellMarkup), None);
    }
}
