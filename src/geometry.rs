use opencv::core::Rect;
use opencv::core::Size;

pub fn rect_is_nonzero(rect: Rect) -> bool {
    rect.width > 0 && rect.height > 0
}

pub fn rect_within(rect: Rect, bounds: Size) -> bool {
    rect.x >= 0
        && rect.y >= 0
        && rect.x + rect.width < bounds.width
        && rect.y + rect.height < bounds.height
}

/// Intersection of `rect` with `bounds`. May be zero-area.
pub fn clip_rect(rect: Rect, bounds: Size) -> Rect {
    let x0 = rect.x.clamp(0, bounds.width);
    let y0 = rect.y.clamp(0, bounds.height);
    let x1 = (rect.x + rect.width).clamp(0, bounds.width);
    let y1 = (rect.y + rect.height).clamp(0, bounds.height);
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}
