//! Screen geometry.
//!
//! Coordinates below 1.0 on an axis are fractions of the window on that
//! axis; anything at or above 1.0 is an absolute pixel. Exactly 1.0 is
//! therefore pixel 1, never the far edge.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Finite and non-negative on both axes.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }

    /// True if either axis is a fraction that needs a window size.
    pub fn needs_window_size(&self) -> bool {
        self.x < 1.0 || self.y < 1.0
    }

    /// Scale fractional axes by `size`; absolute axes pass through.
    pub fn to_absolute(&self, size: WindowSize) -> Position {
        Position {
            x: resolve_axis(self.x, size.width),
            y: resolve_axis(self.y, size.height),
        }
    }

    /// Integer pixel pair as the agent expects it.
    pub fn to_pixels(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

fn resolve_axis(value: f32, extent: u32) -> f32 {
    if value < 1.0 {
        value * extent as f32
    } else {
        value
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Accepts `x,y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
        let x = x
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid x '{}': {}", x.trim(), e))?;
        let y = y
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid y '{}': {}", y.trim(), e))?;
        Ok(Position::new(x, y))
    }
}

/// Display extent in pixels, as reported in the agent's `display` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl ElementRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Point inside the rect at fractional offsets; 0.5/0.5 is the centre.
    pub fn point_at(&self, x_offset: f32, y_offset: f32) -> Position {
        Position {
            x: self.left as f32 + self.width() as f32 * x_offset,
            y: self.top as f32 + self.height() as f32 * y_offset,
        }
    }

    pub fn center(&self) -> Position {
        self.point_at(0.5, 0.5)
    }

    /// Gesture endpoint on the edge a swipe in `direction` travels to.
    ///
    /// Bottom and right edges are exclusive, so the point sits one pixel in.
    pub fn edge_point(&self, direction: SwipeDirection) -> Position {
        let center = self.center();
        match direction {
            SwipeDirection::Up => Position::new(center.x, self.top as f32),
            SwipeDirection::Down => Position::new(center.x, (self.bottom - 1) as f32),
            SwipeDirection::Left => Position::new(self.left as f32, center.y),
            SwipeDirection::Right => Position::new((self.right - 1) as f32, center.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

impl FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(SwipeDirection::Up),
            "down" => Ok(SwipeDirection::Down),
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            other => Err(format!(
                "unknown direction '{}' (expected up, down, left or right)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: WindowSize = WindowSize {
        width: 1080,
        height: 1920,
    };

    #[test]
    fn test_fractional_axes_scale() {
        let p = Position::new(0.5, 0.25).to_absolute(SCREEN);
        assert_eq!(p, Position::new(540.0, 480.0));
    }

    #[test]
    fn test_absolute_axes_pass_through() {
        let p = Position::new(300.0, 700.0).to_absolute(SCREEN);
        assert_eq!(p, Position::new(300.0, 700.0));
    }

    #[test]
    fn test_mixed_axes_resolve_independently() {
        let p = Position::new(0.5, 700.0).to_absolute(SCREEN);
        assert_eq!(p, Position::new(540.0, 700.0));
    }

    #[test]
    fn test_exactly_one_is_a_pixel() {
        let p = Position::new(1.0, 1.0);
        assert!(!p.needs_window_size());
        assert_eq!(p.to_absolute(SCREEN), Position::new(1.0, 1.0));
    }

    #[test]
    fn test_zero_is_relative_origin() {
        let p = Position::new(0.0, 0.0);
        assert!(p.needs_window_size());
        assert_eq!(p.to_absolute(SCREEN), Position::new(0.0, 0.0));
    }

    #[test]
    fn test_validity() {
        assert!(!Position::new(-1.0, 5.0).is_valid());
        assert!(!Position::new(5.0, -0.1).is_valid());
        assert!(!Position::new(f32::NAN, 0.5).is_valid());
        assert!(!Position::new(0.5, f32::INFINITY).is_valid());
        assert!(Position::new(0.0, 0.0).is_valid());
        assert!(Position::new(1080.0, 0.5).is_valid());
    }

    #[test]
    fn test_to_pixels_truncates() {
        assert_eq!(Position::new(540.9, 480.2).to_pixels(), (540, 480));
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!(
            "0.5, 0.8".parse::<Position>().unwrap(),
            Position::new(0.5, 0.8)
        );
        assert!("12".parse::<Position>().is_err());
        assert!("a,b".parse::<Position>().is_err());
    }

    #[test]
    fn test_rect_center_and_offsets() {
        let rect = ElementRect {
            top: 100,
            bottom: 300,
            left: 0,
            right: 400,
        };
        assert_eq!(rect.center(), Position::new(200.0, 200.0));
        assert_eq!(rect.point_at(0.0, 0.0), Position::new(0.0, 100.0));
        assert_eq!(rect.point_at(0.25, 1.0), Position::new(100.0, 300.0));
    }

    #[test]
    fn test_edge_points() {
        let rect = ElementRect {
            top: 100,
            bottom: 300,
            left: 0,
            right: 400,
        };
        assert_eq!(
            rect.edge_point(SwipeDirection::Up),
            Position::new(200.0, 100.0)
        );
        assert_eq!(
            rect.edge_point(SwipeDirection::Down),
            Position::new(200.0, 299.0)
        );
        assert_eq!(
            rect.edge_point(SwipeDirection::Left),
            Position::new(0.0, 200.0)
        );
        assert_eq!(
            rect.edge_point(SwipeDirection::Right),
            Position::new(399.0, 200.0)
        );
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("UP".parse::<SwipeDirection>(), Ok(SwipeDirection::Up));
        assert!("diagonal".parse::<SwipeDirection>().is_err());
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn absolute_axes_are_unchanged(
                x in 1.0f32..5000.0,
                y in 1.0f32..5000.0,
                w in 1u32..4000,
                h in 1u32..4000,
            ) {
                let p = Position::new(x, y);
                prop_assert!(!p.needs_window_size());
                prop_assert_eq!(p.to_absolute(WindowSize::new(w, h)), p);
            }

            #[test]
            fn fractional_axes_stay_on_screen(
                x in 0.0f32..1.0,
                y in 0.0f32..1.0,
                w in 1u32..4000,
                h in 1u32..4000,
            ) {
                let abs = Position::new(x, y).to_absolute(WindowSize::new(w, h));
                prop_assert!(abs.x >= 0.0 && abs.x <= w as f32);
                prop_assert!(abs.y >= 0.0 && abs.y <= h as f32);
            }
        }
    }
}
