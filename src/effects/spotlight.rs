//! Soft radial glow that follows the pointer.

use std::rc::Rc;

use crate::motion::signal::{OFFSCREEN_POINTER, OFFSCREEN_SPOTLIGHT};
use crate::motion::{
    translate, write_style, Effect, Flow, FrameDriver, FrameScheduler, PointerSignal, Surface,
    Trail, Vec2,
};

/// Diameter of the glow element.
pub const SPOT_SIZE_PX: f64 = 600.0;

pub struct SpotlightEffect {
    driver: FrameDriver,
}

impl SpotlightEffect {
    pub fn mount(
        frames: Rc<dyn FrameScheduler>,
        pointer: PointerSignal,
        spot: Rc<dyn Surface>,
        factor: f64,
    ) -> Self {
        let half = Vec2::new(SPOT_SIZE_PX / 2.0, SPOT_SIZE_PX / 2.0);
        let aim = move |at: Vec2| {
            let centre = if at == OFFSCREEN_POINTER { OFFSCREEN_SPOTLIGHT } else { at };
            centre - half
        };
        let mut trail = Trail::new(aim(pointer.read()), factor);
        let driver = FrameDriver::start(frames, move |_| {
            let corner = trail.step(aim(pointer.read()));
            write_style(spot.as_ref(), "transform", &translate(corner));
            Flow::Continue
        });
        Self { driver }
    }
}

impl Effect for SpotlightEffect {
    fn teardown(&mut self) {
        self.driver.cancel();
    }
}
