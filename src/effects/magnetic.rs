//! Magnetic pull: the element drifts toward the pointer while hovered and
//! eases back to rest when the pointer leaves.

use std::cell::RefCell;
use std::rc::Rc;

use crate::motion::{
    translate, write_style, Effect, Flow, FrameDriver, FrameScheduler, Surface, Trail, Vec2,
};

const SETTLE_EPSILON: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct MagneticPull {
    offset: Trail,
    target: Vec2,
    intensity: f64,
}

impl MagneticPull {
    pub fn new(intensity: f64, factor: f64) -> Self {
        Self {
            offset: Trail::new(Vec2::ZERO, factor),
            target: Vec2::ZERO,
            intensity,
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn offset(&self) -> Vec2 {
        self.offset.position()
    }

    /// Aim at the pointer, scaled by intensity, relative to the element centre.
    pub fn aim(&mut self, pointer: Vec2, centre: Vec2) {
        self.target = (pointer - centre) * self.intensity;
    }

    pub fn release(&mut self) {
        self.target = Vec2::ZERO;
    }

    /// One tick; `true` once the offset has settled on the target.
    pub fn step(&mut self) -> (Vec2, bool) {
        let at = self.offset.step(self.target);
        (at, self.offset.settled(self.target, SETTLE_EPSILON))
    }
}

/// Each new target cancels the running interpolation and starts a fresh one.
/// The loop ends by itself once settled.
pub struct MagneticEffect {
    pull: Rc<RefCell<MagneticPull>>,
    driver: FrameDriver,
}

impl MagneticEffect {
    pub fn new(
        frames: Rc<dyn FrameScheduler>,
        target: Rc<dyn Surface>,
        intensity: f64,
        factor: f64,
    ) -> Self {
        let pull = Rc::new(RefCell::new(MagneticPull::new(intensity, factor)));
        let driver = {
            let pull = Rc::clone(&pull);
            FrameDriver::idle(frames, move |_| {
                if !target.is_attached() {
                    return Flow::Stop;
                }
                let (at, settled) = pull.borrow_mut().step();
                write_style(target.as_ref(), "transform", &translate(at));
                if settled {
                    Flow::Stop
                } else {
                    Flow::Continue
                }
            })
        };
        Self { pull, driver }
    }

    pub fn pointer_move(&self, pointer: Vec2, centre: Vec2) {
        self.pull.borrow_mut().aim(pointer, centre);
        self.driver.restart();
    }

    pub fn pointer_leave(&self) {
        self.pull.borrow_mut().release();
        self.driver.restart();
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_running()
    }

    pub fn offset(&self) -> Vec2 {
        self.pull.borrow().offset()
    }
}

impl Effect for MagneticEffect {
    fn teardown(&mut self) {
        self.driver.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::frame::manual::ManualFrames;
    use crate::motion::surface::recording::RecordingSurface;

    #[test]
    fn aim_scales_by_intensity() {
        let mut pull = MagneticPull::new(0.25, 0.12);
        pull.aim(Vec2::new(140.0, 60.0), Vec2::new(100.0, 100.0));
        assert_eq!(pull.target(), Vec2::new(10.0, -10.0));
        pull.release();
        assert_eq!(pull.target(), Vec2::ZERO);
    }

    #[test]
    fn every_move_leaves_one_live_loop() {
        let frames = ManualFrames::new();
        let surface = RecordingSurface::new();
        let effect = MagneticEffect::new(frames.clone(), surface.clone(), 0.25, 0.12);
        for x in 0..20 {
            effect.pointer_move(Vec2::new(100.0 + x as f64, 100.0), Vec2::new(100.0, 100.0));
            assert_eq!(frames.pending(), 1);
        }
        frames.advance(0.0);
        assert_eq!(surface.writes(), 1);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn loop_stops_when_settled_back_at_rest() {
        let frames = ManualFrames::new();
        let surface = RecordingSurface::new();
        let effect = MagneticEffect::new(frames.clone(), surface.clone(), 0.25, 0.12);
        effect.pointer_move(Vec2::new(180.0, 100.0), Vec2::new(100.0, 100.0));
        for i in 0..20 {
            frames.advance(i as f64 * 16.0);
        }
        assert!(effect.offset().x > 10.0);

        effect.pointer_leave();
        let mut ticks = 0;
        while frames.advance(0.0) > 0 {
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(!effect.is_animating());
        assert!(effect.offset().x.abs() <= 0.01);
    }

    #[test]
    fn detached_target_ends_the_loop_without_writes() {
        let frames = ManualFrames::new();
        let surface = RecordingSurface::new();
        let effect = MagneticEffect::new(frames.clone(), surface.clone(), 0.25, 0.12);
        effect.pointer_move(Vec2::new(150.0, 100.0), Vec2::new(100.0, 100.0));
        surface.detach();
        frames.advance(0.0);
        assert_eq!(surface.writes(), 0);
        assert!(!effect.is_animating());
    }
}
