//! Layout geometry: constraints, insets and rectangle helpers.
//!
//! Points, sizes and rectangles are the `embedded-graphics` types. This
//! module adds the box constraints that flow down the render tree during
//! layout and a few rectangle operations the draw protocol needs.
//!
//! # Layout Algorithm
//!
//! Layout is a single pass:
//!
//! 1. **Down**: a parent hands each child a [`Constraints`] range.
//! 2. **Up**: the child picks a concrete size inside that range.
//!
//! Either axis of `max` may be [`UNBOUNDED`]; a returned size never is.
//!
//! ## Example
//!
//! ```rust
//! use eink_ui::geometry::{Constraints, Insets, UNBOUNDED};
//! use embedded_graphics::prelude::Size;
//!
//! let screen = Constraints::tight(Size::new(400, 300));
//! let inner = screen.inset(Insets::all(10));
//! assert_eq!(inner.max, Size::new(380, 280));
//!
//! let column = Constraints::new(Size::zero(), Size::new(200, UNBOUNDED));
//! assert!(column.has_bounded_width());
//! assert!(!column.has_bounded_height());
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Sentinel for an axis with no upper bound.
pub const UNBOUNDED: u32 = u32::MAX;

/// Valid range of sizes for a render object.
///
/// # Invariants
///
/// - `min.width <= max.width`
/// - `min.height <= max.height`
/// - `min` is never [`UNBOUNDED`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraints {
    /// Minimum allowed size (inclusive).
    pub min: Size,
    /// Maximum allowed size (inclusive).
    pub max: Size,
}

impl Constraints {
    /// Create constraints with explicit bounds.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if min > max on either axis.
    pub fn new(min: Size, max: Size) -> Self {
        debug_assert!(
            min.width <= max.width,
            "min.width ({}) must be <= max.width ({})",
            min.width,
            max.width
        );
        debug_assert!(
            min.height <= max.height,
            "min.height ({}) must be <= max.height ({})",
            min.height,
            max.height
        );
        Self { min, max }
    }

    /// Exact size (min == max).
    ///
    /// ```rust
    /// use eink_ui::geometry::Constraints;
    /// use embedded_graphics::prelude::Size;
    ///
    /// let c = Constraints::tight(Size::new(100, 50));
    /// assert!(c.is_tight());
    /// ```
    pub const fn tight(size: Size) -> Self {
        Self {
            min: size,
            max: size,
        }
    }

    /// Zero up to `max`.
    pub const fn loose(max: Size) -> Self {
        Self {
            min: Size::zero(),
            max,
        }
    }

    /// Zero up to unbounded on both axes.
    pub const fn unbounded() -> Self {
        Self::loose(Size::new(UNBOUNDED, UNBOUNDED))
    }

    /// Clamp `size` into the range.
    ///
    /// ```rust
    /// use eink_ui::geometry::Constraints;
    /// use embedded_graphics::prelude::Size;
    ///
    /// let c = Constraints::new(Size::new(50, 25), Size::new(200, 100));
    /// assert_eq!(c.constrain(Size::new(10, 10)), Size::new(50, 25));
    /// assert_eq!(c.constrain(Size::new(300, 300)), Size::new(200, 100));
    /// assert_eq!(c.constrain(Size::new(100, 50)), Size::new(100, 50));
    /// ```
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min.width, self.max.width),
            size.height.clamp(self.min.height, self.max.height),
        )
    }

    /// Returns `true` if `size` lies within the range on both axes.
    pub fn contains(&self, size: Size) -> bool {
        (self.min.width..=self.max.width).contains(&size.width)
            && (self.min.height..=self.max.height).contains(&size.height)
    }

    /// Returns `true` if min == max.
    pub fn is_tight(&self) -> bool {
        self.min == self.max
    }

    /// Returns `true` unless the width has no upper bound.
    pub const fn has_bounded_width(&self) -> bool {
        self.max.width != UNBOUNDED
    }

    /// Returns `true` unless the height has no upper bound.
    pub const fn has_bounded_height(&self) -> bool {
        self.max.height != UNBOUNDED
    }

    /// Replace `max` with `size` on every unbounded axis and with `max`
    /// elsewhere. Used by objects that fill the available space but must
    /// report a finite size.
    pub fn max_or(&self, size: Size) -> Size {
        Size::new(
            if self.has_bounded_width() {
                self.max.width
            } else {
                size.width.max(self.min.width)
            },
            if self.has_bounded_height() {
                self.max.height
            } else {
                size.height.max(self.min.height)
            },
        )
    }

    /// Shrink the range by `insets`, keeping unbounded axes unbounded.
    ///
    /// ```rust
    /// use eink_ui::geometry::{Constraints, Insets, UNBOUNDED};
    /// use embedded_graphics::prelude::Size;
    ///
    /// let c = Constraints::new(Size::new(10, 10), Size::new(100, UNBOUNDED));
    /// let inner = c.inset(Insets::all(8));
    /// assert_eq!(inner.min, Size::new(0, 0));
    /// assert_eq!(inner.max, Size::new(84, UNBOUNDED));
    /// ```
    pub fn inset(&self, insets: Insets) -> Self {
        let h = insets.horizontal();
        let v = insets.vertical();
        let shrink = |value: u32, by: u32| {
            if value == UNBOUNDED {
                UNBOUNDED
            } else {
                value.saturating_sub(by)
            }
        };
        Self {
            min: Size::new(
                self.min.width.saturating_sub(h),
                self.min.height.saturating_sub(v),
            ),
            max: Size::new(shrink(self.max.width, h), shrink(self.max.height, v)),
        }
    }

    /// Size of a child grown by `insets`, clamped back into the range.
    pub fn expand(&self, child: Size, insets: Insets) -> Size {
        self.constrain(Size::new(
            child.width.saturating_add(insets.horizontal()),
            child.height.saturating_add(insets.vertical()),
        ))
    }
}

/// Per-edge inset in pixels, used for padding, margins and border widths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    /// Top edge inset in pixels.
    pub top: u32,
    /// Right edge inset in pixels.
    pub right: u32,
    /// Bottom edge inset in pixels.
    pub bottom: u32,
    /// Left edge inset in pixels.
    pub left: u32,
}

impl Insets {
    /// No inset.
    pub const ZERO: Self = Self::all(0);

    /// Same inset on every edge.
    ///
    /// ```
    /// use eink_ui::geometry::Insets;
    ///
    /// let insets = Insets::all(16);
    /// assert_eq!(insets.horizontal(), 32);
    /// ```
    pub const fn all(value: u32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Individual values, clockwise from the top.
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// `horizontal` on left and right, `vertical` on top and bottom.
    pub const fn symmetric(horizontal: u32, vertical: u32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Left plus right.
    pub const fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Top plus bottom.
    pub const fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// Shrink `rect` by the insets. Never produces a negative size.
    pub fn shrink(&self, rect: Rectangle) -> Rectangle {
        let top_left = offset(rect.top_left, self.left, self.top);
        Rectangle::new(
            top_left,
            Size::new(
                rect.size.width.saturating_sub(self.horizontal()),
                rect.size.height.saturating_sub(self.vertical()),
            ),
        )
    }
}

/// `point` moved right by `dx` and down by `dy`, saturating.
pub fn offset(point: Point, dx: u32, dy: u32) -> Point {
    Point::new(
        point.x.saturating_add_unsigned(dx),
        point.y.saturating_add_unsigned(dy),
    )
}

/// Returns `true` if the rectangle covers no pixel.
pub const fn is_empty(rect: &Rectangle) -> bool {
    rect.size.width == 0 || rect.size.height == 0
}

/// Returns `true` if `point` lies inside `rect`.
pub fn contains(rect: &Rectangle, point: Point) -> bool {
    if is_empty(rect) {
        return false;
    }
    let dx = i64::from(point.x) - i64::from(rect.top_left.x);
    let dy = i64::from(point.y) - i64::from(rect.top_left.y);
    (0..i64::from(rect.size.width)).contains(&dx) && (0..i64::from(rect.size.height)).contains(&dy)
}

/// Returns `true` if the rectangles share at least one pixel.
pub fn intersects(a: &Rectangle, b: &Rectangle) -> bool {
    !is_empty(&a.intersection(b))
}

/// Smallest rectangle covering both. An empty operand is ignored.
///
/// ```rust
/// use eink_ui::geometry::union;
/// use embedded_graphics::prelude::{Point, Size};
/// use embedded_graphics::primitives::Rectangle;
///
/// let a = Rectangle::new(Point::new(0, 0), Size::new(10, 10));
/// let b = Rectangle::new(Point::new(20, 5), Size::new(5, 10));
/// assert_eq!(union(&a, &b), Rectangle::new(Point::new(0, 0), Size::new(25, 15)));
/// assert_eq!(union(&a, &Rectangle::zero()), a);
/// ```
pub fn union(a: &Rectangle, b: &Rectangle) -> Rectangle {
    if is_empty(b) {
        return *a;
    }
    if is_empty(a) {
        return *b;
    }
    let left = a.top_left.x.min(b.top_left.x);
    let top = a.top_left.y.min(b.top_left.y);
    let right = far_edge(a.top_left.x, a.size.width).max(far_edge(b.top_left.x, b.size.width));
    let bottom = far_edge(a.top_left.y, a.size.height).max(far_edge(b.top_left.y, b.size.height));
    Rectangle::new(
        Point::new(left, top),
        Size::new(span(left, right), span(top, bottom)),
    )
}

/// Rectangle of `size` centered in `outer`. Oversized content is anchored at
/// the top-left corner.
pub fn center_in(outer: &Rectangle, size: Size) -> Rectangle {
    let dx = outer.size.width.saturating_sub(size.width) / 2;
    let dy = outer.size.height.saturating_sub(size.height) / 2;
    Rectangle::new(offset(outer.top_left, dx, dy), size)
}

fn far_edge(start: i32, len: u32) -> i64 {
    i64::from(start).saturating_add(i64::from(len))
}

fn span(start: i32, end: i64) -> u32 {
    u32::try_from(end.saturating_sub(i64::from(start))).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_tight_and_loose() {
        let tight = Constraints::tight(Size::new(100, 50));
        assert!(tight.is_tight());
        assert!(tight.contains(Size::new(100, 50)));
        assert!(!tight.contains(Size::new(99, 50)));

        let loose = Constraints::loose(Size::new(100, 50));
        assert!(!loose.is_tight());
        assert!(loose.contains(Size::zero()));
    }

    #[test]
    fn test_unbounded_axes() {
        let c = Constraints::unbounded();
        assert!(!c.has_bounded_width());
        assert!(!c.has_bounded_height());
        assert_eq!(c.max_or(Size::new(7, 9)), Size::new(7, 9));

        let half = Constraints::new(Size::new(5, 5), Size::new(40, UNBOUNDED));
        assert_eq!(half.max_or(Size::new(1, 1)), Size::new(40, 5));
    }

    #[test]
    fn test_inset_keeps_unbounded() {
        let c = Constraints::new(Size::zero(), Size::new(UNBOUNDED, 30));
        let inner = c.inset(Insets::new(1, 2, 3, 4));
        assert_eq!(inner.max, Size::new(UNBOUNDED, 26));
    }

    #[test]
    fn test_inset_saturates() {
        let c = Constraints::tight(Size::new(4, 4));
        let inner = c.inset(Insets::all(10));
        assert_eq!(inner.min, Size::zero());
        assert_eq!(inner.max, Size::zero());
    }

    #[test]
    fn test_expand_clamps() {
        let c = Constraints::loose(Size::new(50, 50));
        assert_eq!(c.expand(Size::new(10, 10), Insets::all(5)), Size::new(20, 20));
        assert_eq!(c.expand(Size::new(48, 10), Insets::all(5)), Size::new(50, 20));
    }

    #[test]
    fn test_insets_shrink_rect() {
        let r = Insets::new(1, 2, 3, 4).shrink(rect(10, 10, 20, 20));
        assert_eq!(r, rect(14, 11, 14, 16));
        assert_eq!(Insets::all(50).shrink(rect(0, 0, 20, 20)).size, Size::zero());
        assert_eq!(Insets::symmetric(3, 1), Insets::new(1, 3, 1, 3));
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = rect(5, 5, 10, 10);
        assert_eq!(union(&a, &rect(100, 100, 0, 10)), a);
        assert_eq!(union(&Rectangle::zero(), &a), a);
        assert_eq!(union(&a, &rect(-5, 0, 2, 2)), rect(-5, 0, 20, 15));
    }

    #[test]
    fn test_contains_and_intersects() {
        let r = rect(0, 0, 10, 10);
        assert!(contains(&r, Point::new(0, 0)));
        assert!(contains(&r, Point::new(9, 9)));
        assert!(!contains(&r, Point::new(10, 9)));
        assert!(!contains(&rect(0, 0, 0, 0), Point::zero()));

        assert!(intersects(&r, &rect(9, 9, 5, 5)));
        assert!(!intersects(&r, &rect(10, 0, 5, 5)));
    }

    #[test]
    fn test_center_in() {
        let outer = rect(0, 0, 100, 50);
        assert_eq!(center_in(&outer, Size::new(20, 10)), rect(40, 20, 20, 10));
        assert_eq!(center_in(&outer, Size::new(200, 10)), rect(0, 20, 200, 10));
    }
}
