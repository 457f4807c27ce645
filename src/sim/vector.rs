//! 2D vector helpers on top of `glam::DVec2`
//!
//! glam covers add/scale/dot/length. The few operations the kinematics needs
//! with specific degenerate-case behaviour live here.

use glam::DVec2;

/// Extension methods used by the relativistic engine
pub trait VecExt {
    /// Same direction, new magnitude. The zero vector is returned unchanged.
    fn set_mag(self, mag: f64) -> DVec2;

    /// Unit vector. Unlike `normalize_or_zero`, the zero vector yields NaN
    /// components so callers can detect the degenerate direction.
    fn unit(self) -> DVec2;

    /// Rotate counter-clockwise by `theta` radians
    fn rotated(self, theta: f64) -> DVec2;

    /// Screen heading (radians) from `self` to `target`, measured from "up" (0, -1)
    fn heading_to(self, target: DVec2) -> f64;
}

impl VecExt for DVec2 {
    #[inline]
    fn set_mag(self, mag: f64) -> DVec2 {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        self * (mag / len)
    }

    #[inline]
    fn unit(self) -> DVec2 {
        self * (1.0 / self.length())
    }

    #[inline]
    fn rotated(self, theta: f64) -> DVec2 {
        let (sin, cos) = theta.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn heading_to(self, target: DVec2) -> f64 {
        let angle = DVec2::NEG_Y.dot((target - self).unit()).acos();
        if self.x < target.x { -angle } else { angle }
    }
}
