//! Reading-progress bar across the top of the page.

use std::rc::Rc;

use crate::motion::{
    write_style, Effect, Flow, FrameDriver, FrameScheduler, ScrollSample, ScrollSignal, Surface,
};

/// Scroll events only record the sample and wake the driver; the bar is
/// written at most once per frame however many events arrive.
pub struct ScrollProgress {
    signal: ScrollSignal,
    driver: FrameDriver,
}

impl ScrollProgress {
    pub fn new(frames: Rc<dyn FrameScheduler>, bar: Rc<dyn Surface>) -> Self {
        let signal = ScrollSignal::new(ScrollSample::default());
        let driver = {
            let signal = signal.clone();
            FrameDriver::idle(frames, move |_| {
                let width = format!("{}%", signal.read().percent());
                write_style(bar.as_ref(), "width", &width);
                Flow::Stop
            })
        };
        Self { signal, driver }
    }

    pub fn on_scroll(&self, sample: ScrollSample) {
        self.signal.write(sample);
        self.driver.wake();
    }
}

impl Effect for ScrollProgress {
    fn teardown(&mut self) {
        self.driver.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::frame::manual::ManualFrames;
    use crate::motion::surface::recording::RecordingSurface;

    fn sample(offset: f64) -> ScrollSample {
        ScrollSample { offset, document_height: 3000.0, viewport_height: 1000.0 }
    }

    #[test]
    fn bursts_coalesce_into_one_write() {
        let frames = ManualFrames::new();
        let bar = RecordingSurface::new();
        let progress = ScrollProgress::new(frames.clone(), bar.clone());
        for offset in [100.0, 300.0, 500.0, 1000.0] {
            progress.on_scroll(sample(offset));
        }
        assert_eq!(frames.pending(), 1);
        frames.advance(0.0);
        assert_eq!(bar.values("width"), vec!["50%"]);
        assert_eq!(frames.pending(), 0);

        progress.on_scroll(sample(2000.0));
        frames.advance(16.0);
        assert_eq!(bar.last("width").as_deref(), Some("100%"));
    }

    #[test]
    fn teardown_drops_the_pending_write() {
        let frames = ManualFrames::new();
        let bar = RecordingSurface::new();
        let mut progress = ScrollProgress::new(frames.clone(), bar.clone());
        progress.on_scroll(sample(400.0));
        progress.teardown();
        frames.advance(0.0);
        assert_eq!(bar.writes(), 0);
    }
}
