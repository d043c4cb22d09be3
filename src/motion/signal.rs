//! Latest-value slots written by input listeners and read by frame drivers.
//!
//! There is no queue: a reader sees only the most recent write, so pointer
//! samples arriving between two frames are coalesced. `Rc<Cell<_>>` keeps the
//! slot on the UI thread.

use std::cell::Cell;
use std::rc::Rc;

use super::lerp::Vec2;

#[derive(Debug)]
pub struct SignalSlot<T: Copy> {
    cell: Rc<Cell<T>>,
}

impl<T: Copy> Clone for SignalSlot<T> {
    fn clone(&self) -> Self {
        Self { cell: Rc::clone(&self.cell) }
    }
}

impl<T: Copy> SignalSlot<T> {
    pub fn new(initial: T) -> Self {
        Self { cell: Rc::new(Cell::new(initial)) }
    }

    pub fn write(&self, value: T) {
        self.cell.set(value);
    }

    pub fn read(&self) -> T {
        self.cell.get()
    }
}

pub type PointerSignal = SignalSlot<Vec2>;

/// Where the cursor rests before the first pointer event arrives.
pub const OFFSCREEN_POINTER: Vec2 = Vec2::new(-200.0, -200.0);

/// Where the spotlight parks until the first pointer sample arrives.
pub const OFFSCREEN_SPOTLIGHT: Vec2 = Vec2::new(-300.0, -300.0);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSample {
    pub offset: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollSample {
    /// Share of the scrollable distance already covered, in percent.
    pub fn percent(&self) -> f64 {
        let scrollable = self.document_height - self.viewport_height;
        if scrollable > 0.0 {
            (self.offset / scrollable * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

pub type ScrollSignal = SignalSlot<ScrollSample>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clones_share_one_slot() {
        let writer = PointerSignal::new(OFFSCREEN_POINTER);
        let reader = writer.clone();
        writer.write(Vec2::new(10.0, 20.0));
        assert_eq!(reader.read(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn scroll_percent_edges() {
        let flat = ScrollSample { offset: 0.0, document_height: 800.0, viewport_height: 900.0 };
        assert_eq!(flat.percent(), 0.0);

        let half = ScrollSample { offset: 500.0, document_height: 1900.0, viewport_height: 900.0 };
        assert_eq!(half.percent(), 50.0);

        // rubber-band overscroll on some platforms
        let over = ScrollSample { offset: 1200.0, document_height: 1900.0, viewport_height: 900.0 };
        assert_eq!(over.percent(), 100.0);
    }

    proptest! {
        #[test]
        fn last_write_wins(
            events in prop::collection::vec((-4000.0f64..4000.0, -4000.0f64..4000.0), 1..64)
        ) {
            let slot = PointerSignal::new(OFFSCREEN_POINTER);
            let reader = slot.clone();
            for &(x, y) in &events {
                slot.write(Vec2::new(x, y));
                prop_assert_eq!(reader.read(), Vec2::new(x, y));
            }
            let (lx, ly) = *events.last().unwrap();
            prop_assert_eq!(reader.read(), Vec2::new(lx, ly));
        }
    }
}
