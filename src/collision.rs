//! Axis-aligned rectangles and the bird-vs-world collision check.

/// Rectangle in pixel space; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `w` x `h` centred on (cx, cy).
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Open overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Point test; the right and bottom edges are exclusive.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.left() && px < self.right() && py >= self.top() && py < self.bottom()
    }
}

/// True when `bird` hits any obstacle, the ceiling, or the ground at `sky_h`.
pub fn hits_world<'a>(
    bird: &Rect,
    obstacles: impl IntoIterator<Item = &'a Rect>,
    sky_h: f64,
) -> bool {
    if bird.bottom() >= sky_h || bird.top() <= 0.0 {
        return true;
    }
    obstacles.into_iter().any(|r| bird.intersects(r))
}
