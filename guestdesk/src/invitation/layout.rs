//! Placement of invitation content on an A4 page.

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;

/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Where content lands on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFit {
    /// Left offset
    pub x: f64,
    /// Top offset
    pub y: f64,
    /// Drawn width
    pub width: f64,
    /// Drawn height
    pub height: f64,
}

impl PageFit {
    /// Fit content of the given pixel size onto A4.
    ///
    /// Content is first scaled to the page width. If that makes it taller
    /// than the page it is scaled to the page height instead and centred
    /// horizontally. Degenerate sizes fill the page.
    #[must_use]
    pub fn a4(content_width: f64, content_height: f64) -> Self {
        if content_width <= 0.0 || content_height <= 0.0 {
            return Self {
                x: 0.0,
                y: 0.0,
                width: A4_WIDTH_MM,
                height: A4_HEIGHT_MM,
            };
        }

        let height_at_page_width = content_height * A4_WIDTH_MM / content_width;
        if height_at_page_width > A4_HEIGHT_MM {
            let width = A4_WIDTH_MM * A4_HEIGHT_MM / height_at_page_width;
            Self {
                x: (A4_WIDTH_MM - width) / 2.0,
                y: 0.0,
                width,
                height: A4_HEIGHT_MM,
            }
        } else {
            Self {
                x: 0.0,
                y: 0.0,
                width: A4_WIDTH_MM,
                height: height_at_page_width,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_short_content_fills_width_at_top() {
        let fit = PageFit::a4(400.0, 300.0);
        assert!(close(fit.x, 0.0));
        assert!(close(fit.y, 0.0));
        assert!(close(fit.width, 210.0));
        assert!(close(fit.height, 157.5));
    }

    #[test]
    fn test_tall_content_scaled_to_height_and_centred() {
        // 420 wide, 1188 tall: 594mm at page width, twice the page.
        let fit = PageFit::a4(420.0, 1188.0);
        assert!(close(fit.height, 297.0));
        assert!(close(fit.width, 105.0));
        assert!(close(fit.x, 52.5));
        assert!(close(fit.y, 0.0));
    }

    #[test]
    fn test_exact_a4_ratio_is_full_page() {
        let fit = PageFit::a4(210.0, 297.0);
        assert!(close(fit.width, 210.0));
        assert!(close(fit.height, 297.0));
        assert!(close(fit.x, 0.0));
    }

    #[test]
    fn test_degenerate_size_fills_page() {
        assert_eq!(
            PageFit::a4(0.0, 100.0),
            PageFit {
                x: 0.0,
                y: 0.0,
                width: A4_WIDTH_MM,
                height: A4_HEIGHT_MM
            }
        );
    }
}
