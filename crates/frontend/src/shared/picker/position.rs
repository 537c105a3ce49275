/// Rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Top-left corner of a popup opened under `anchor`.
///
/// Shifted left when it would leave the right edge, flipped above the
/// anchor when it would leave the bottom edge and fits above, never placed
/// at negative coordinates.
pub fn place_below(anchor: Rect, popup: Size, viewport: Size) -> (f64, f64) {
    let mut left = anchor.left;
    if left + popup.width > viewport.width {
        left = viewport.width - popup.width;
    }

    let mut top = anchor.bottom();
    if top + popup.height > viewport.height {
        if anchor.top - popup.height >= 0.0 {
            top = anchor.top - popup.height;
        } else {
            top = viewport.height - popup.height;
        }
    }

    (left.max(0.0), top.max(0.0))
}
