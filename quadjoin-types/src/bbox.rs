use geo::Rect;
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box.
///
/// Represents a rectangular area defined by minimum and maximum coordinates.
/// This is a wrapper around `geo::Rect` with the closed-interval predicates the
/// quadtree and the cell–polygon join rely on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

/// One of the four quadrants of a box, in Morton (Z-order) sequence.
///
/// The discriminant is `(north << 1) | east`, so iterating `Quadrant::ALL`
/// visits children in the same order a Z-order curve would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    SouthWest = 0,
    SouthEast = 1,
    NorthWest = 2,
    NorthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
    ];

    /// Quadrant for the given side flags.
    #[inline]
    pub fn from_sides(east: bool, north: bool) -> Self {
        match (east, north) {
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
            (false, true) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_east(self) -> bool {
        matches!(self, Quadrant::SouthEast | Quadrant::NorthEast)
    }

    #[inline]
    pub fn is_north(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::NorthEast)
    }
}

impl BoundingBox2D {
    /// Create a new bounding box from minimum and maximum coordinates.
    ///
    /// `geo::Rect` normalises swapped corners, so this never fails. Callers that
    /// must reject inverted or non-finite input validate before constructing.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadjoin_types::bbox::BoundingBox2D;
    ///
    /// let bbox = BoundingBox2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert_eq!(bbox.width(), 10.0);
    /// ```
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            ),
        }
    }

    /// Create a bounding box from a `geo::Rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    /// Get the minimum x coordinate.
    #[inline]
    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    /// Get the minimum y coordinate.
    #[inline]
    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    /// Get the maximum x coordinate.
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    /// Get the maximum y coordinate.
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }

    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    /// True when all four coordinates are finite and min ≤ max on both axes.
    pub fn is_valid(&self) -> bool {
        let finite = self.min_x().is_finite()
            && self.min_y().is_finite()
            && self.max_x().is_finite()
            && self.max_y().is_finite();
        finite && self.min_x() <= self.max_x() && self.min_y() <= self.max_y()
    }

    /// Check if a coordinate pair lies within this box (boundary included).
    #[inline]
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }

    /// Check if this bounding box intersects with another.
    ///
    /// Intervals are closed: boxes that only touch along an edge or a corner
    /// intersect.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox2D) -> bool {
        !(self.max_x() < other.min_x()
            || self.min_x() > other.max_x()
            || self.max_y() < other.min_y()
            || self.min_y() > other.max_y())
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox2D) -> Self {
        Self::new(
            self.min_x().min(other.min_x()),
            self.min_y().min(other.min_y()),
            self.max_x().max(other.max_x()),
            self.max_y().max(other.max_y()),
        )
    }

    /// Grow the box in place so it covers `(x, y)`.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        *self = Self::new(
            self.min_x().min(x),
            self.min_y().min(y),
            self.max_x().max(x),
            self.max_y().max(y),
        );
    }

    /// The split point used when subdividing this box.
    ///
    /// Halves are summed rather than the extent halved, so a box spanning
    /// more than `f64::MAX` still splits at a finite point.
    #[inline]
    pub fn midpoint(&self) -> (f64, f64) {
        (
            self.min_x() * 0.5 + self.max_x() * 0.5,
            self.min_y() * 0.5 + self.max_y() * 0.5,
        )
    }

    /// Which quadrant of this box `(x, y)` falls into.
    ///
    /// Points on a splitting line go east / north.
    #[inline]
    pub fn quadrant_of(&self, x: f64, y: f64) -> Quadrant {
        let (mid_x, mid_y) = self.midpoint();
        Quadrant::from_sides(x >= mid_x, y >= mid_y)
    }

    /// The closed sub-box for one quadrant. Neighbouring quadrants share their
    /// splitting line, so the four children cover the parent exactly.
    pub fn quadrant(&self, quadrant: Quadrant) -> Self {
        let (mid_x, mid_y) = self.midpoint();
        let (min_x, max_x) = if quadrant.is_east() {
            (mid_x, self.max_x())
        } else {
            (self.min_x(), mid_x)
        };
        let (min_y, max_y) = if quadrant.is_north() {
            (mid_y, self.max_y())
        } else {
            (self.min_y(), mid_y)
        };
        Self::new(min_x, min_y, max_x, max_y)
    }
}
