//! Two-part custom cursor: a dot pinned to the pointer and a ring that trails
//! it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::motion::{
    translate, write_style, Effect, Flow, FrameDriver, FrameScheduler, PointerSignal, Surface,
    Trail, Vec2,
};

const DOT_HALF: f64 = 4.0;

/// Selector for elements that expand the ring while hovered.
pub const INTERACTIVE_SELECTOR: &str =
    "a, button, [role=\"button\"], input, select, textarea, label, [tabindex]";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingStyle {
    pub size_px: f64,
    pub border_color: &'static str,
    pub dot_opacity: &'static str,
}

pub const RING_IDLE: RingStyle = RingStyle {
    size_px: 36.0,
    border_color: "rgba(0,255,200,0.35)",
    dot_opacity: "1",
};

pub const RING_HOVER: RingStyle = RingStyle {
    size_px: 52.0,
    border_color: "rgba(0,255,200,0.65)",
    dot_opacity: "0.7",
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFrame {
    /// Top-left of the dot.
    pub dot: Vec2,
    /// Top-left of the ring.
    pub ring: Vec2,
}

#[derive(Debug, Clone)]
pub struct CursorRig {
    ring: Trail,
    style: RingStyle,
}

impl CursorRig {
    pub fn new(start: Vec2, ring_factor: f64) -> Self {
        Self {
            ring: Trail::new(start, ring_factor),
            style: RING_IDLE,
        }
    }

    pub fn hovering(&self) -> bool {
        self.style == RING_HOVER
    }

    /// Switch ring style; `None` when nothing changes.
    pub fn set_hover(&mut self, on: bool) -> Option<RingStyle> {
        if self.hovering() == on {
            return None;
        }
        self.style = if on { RING_HOVER } else { RING_IDLE };
        Some(self.style)
    }

    pub fn frame(&mut self, pointer: Vec2) -> CursorFrame {
        let ring_centre = self.ring.step(pointer);
        let half = self.style.size_px / 2.0;
        CursorFrame {
            dot: pointer - Vec2::new(DOT_HALF, DOT_HALF),
            ring: ring_centre - Vec2::new(half, half),
        }
    }
}

pub struct CursorEffect {
    rig: Rc<RefCell<CursorRig>>,
    dot: Rc<dyn Surface>,
    ring: Rc<dyn Surface>,
    driver: FrameDriver,
}

impl CursorEffect {
    pub fn mount(
        frames: Rc<dyn FrameScheduler>,
        pointer: PointerSignal,
        dot: Rc<dyn Surface>,
        ring: Rc<dyn Surface>,
        ring_factor: f64,
    ) -> Self {
        let rig = Rc::new(RefCell::new(CursorRig::new(pointer.read(), ring_factor)));
        let driver = {
            let rig = Rc::clone(&rig);
            let dot = Rc::clone(&dot);
            let ring = Rc::clone(&ring);
            FrameDriver::start(frames, move |_| {
                let frame = rig.borrow_mut().frame(pointer.read());
                write_style(dot.as_ref(), "transform", &translate(frame.dot));
                write_style(ring.as_ref(), "transform", &translate(frame.ring));
                Flow::Continue
            })
        };
        Self { rig, dot, ring, driver }
    }

    /// Pointer entered or left an interactive element.
    pub fn hover(&self, on: bool) {
        let Some(style) = self.rig.borrow_mut().set_hover(on) else {
            return;
        };
        let size = format!("{}px", style.size_px);
        write_style(self.ring.as_ref(), "width", &size);
        write_style(self.ring.as_ref(), "height", &size);
        write_style(self.ring.as_ref(), "border-color", style.border_color);
        write_style(self.dot.as_ref(), "opacity", style.dot_opacity);
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }
}

impl Effect for CursorEffect {
    fn teardown(&mut self) {
        self.driver.cancel();
    }
}
