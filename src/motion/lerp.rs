//! Linear interpolation, the primitive behind every trailing effect.

use std::ops::{Add, Mul, Sub};

/// Move `current` the fraction `t` of the way to `target`.
#[inline]
pub fn lerp(current: f64, target: f64, t: f64) -> f64 {
    current + (target - current) * t
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, target: Vec2, t: f64) -> Vec2 {
        Vec2::new(lerp(self.x, target.x, t), lerp(self.y, target.y, t))
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// A position that lags behind its target, closing `factor` of the gap on
/// every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    position: Vec2,
    factor: f64,
}

impl Trail {
    /// `factor` is clamped into `(0, 1]`; zero would freeze the follower.
    pub fn new(start: Vec2, factor: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor.min(1.0)
        } else {
            1.0
        };
        Self { position: start, factor }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn step(&mut self, target: Vec2) -> Vec2 {
        self.position = self.position.lerp(target, self.factor);
        self.position
    }

    /// Both axes within `epsilon` of `target`.
    pub fn settled(&self, target: Vec2, epsilon: f64) -> bool {
        (self.position.x - target.x).abs() <= epsilon
            && (self.position.y - target.y).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(4.0, 8.0, 0.5), 6.0);
    }

    #[test]
    fn trail_factor_is_sanitised() {
        assert_eq!(Trail::new(Vec2::ZERO, 0.0).factor(), 1.0);
        assert_eq!(Trail::new(Vec2::ZERO, 3.0).factor(), 1.0);
        assert_eq!(Trail::new(Vec2::ZERO, f64::NAN).factor(), 1.0);
        assert_eq!(Trail::new(Vec2::ZERO, 0.12).factor(), 0.12);
    }

    #[test]
    fn trail_settles_on_a_fixed_target() {
        let target = Vec2::new(300.0, -120.0);
        let mut trail = Trail::new(Vec2::new(-200.0, -200.0), 0.12);
        let mut ticks = 0;
        while !trail.settled(target, 0.01) {
            trail.step(target);
            ticks += 1;
            assert!(ticks < 500, "trail never settled");
        }
        assert!(ticks > 10);
    }

    proptest! {
        #[test]
        fn distance_never_grows(
            start in -5000.0f64..5000.0,
            target in -5000.0f64..5000.0,
            t in 0.01f64..0.99,
        ) {
            let mut current = start;
            let mut gap = (target - current).abs();
            for _ in 0..200 {
                current = lerp(current, target, t);
                let next_gap = (target - current).abs();
                prop_assert!(next_gap <= gap);
                if gap > 1e-6 {
                    prop_assert!(next_gap < gap);
                }
                // never overshoots
                prop_assert!((target - current) * (target - start) >= 0.0);
                gap = next_gap;
            }
        }

        #[test]
        fn gap_shrinks_geometrically(
            start in -1000.0f64..1000.0,
            target in -1000.0f64..1000.0,
            t in 0.05f64..0.95,
        ) {
            let gap = (target - start).abs();
            let next = (target - lerp(start, target, t)).abs();
            prop_assert!((next - gap * (1.0 - t)).abs() <= 1e-9 * gap.max(1.0));
        }
    }
}
