//! Reveal-on-scroll bookkeeping, independent of `IntersectionObserver`.

use std::rc::Rc;

use super::surface::{write_style, Surface};
use super::timer::{TimerGuard, TimerScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealMode {
    /// Reveal the first time the threshold is crossed, then stop watching.
    #[default]
    Once,
    /// Reveal on every entry, hide again on every exit.
    Repeat,
}

impl RevealMode {
    /// Parse a `data-reveal` attribute value. Anything unknown means `Once`.
    pub fn from_attr(value: &str) -> Self {
        match value.trim() {
            "repeat" => RevealMode::Repeat,
            _ => RevealMode::Once,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealAction {
    Reveal,
    Hide,
    /// Reveal and stop observing this element.
    RevealAndUnobserve,
    None,
}

/// Browsers report the crossing ratio with some float noise.
const RATIO_SLACK: f64 = 1e-3;

/// Per-element reveal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTracker {
    mode: RevealMode,
    threshold: f64,
    /// Largest ratio the element can reach in its root.
    reach: f64,
    revealed: bool,
    finished: bool,
}

impl RevealTracker {
    pub fn new(mode: RevealMode, threshold: f64) -> Self {
        Self {
            mode,
            threshold: threshold.clamp(0.0, 1.0),
            reach: 1.0,
            revealed: false,
            finished: false,
        }
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// Record the element and root heights. An element taller than its
    /// root can never be fully visible, so the threshold is capped at the
    /// share of it that fits.
    pub fn fit(&mut self, target_height: f64, root_height: f64) {
        self.reach = if target_height > 0.0 && root_height > 0.0 {
            (root_height / target_height).min(1.0)
        } else {
            1.0
        };
    }

    /// Feed one intersection report.
    pub fn observe(&mut self, ratio: f64, intersecting: bool) -> RevealAction {
        if self.finished {
            return RevealAction::None;
        }
        let needed = self.threshold.min(self.reach) - RATIO_SLACK;
        let visible = intersecting && ratio >= needed;
        match (self.mode, visible, self.revealed) {
            (RevealMode::Once, true, _) => {
                self.revealed = true;
                self.finished = true;
                RevealAction::RevealAndUnobserve
            }
            (RevealMode::Repeat, true, false) => {
                self.revealed = true;
                RevealAction::Reveal
            }
            (RevealMode::Repeat, false, true) => {
                self.revealed = false;
                RevealAction::Hide
            }
            _ => RevealAction::None,
        }
    }
}

/// One scheduled reveal within a staggered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaggerStep {
    pub index: usize,
    pub delay_ms: u32,
}

/// Delays for the items of a group that have not been revealed yet. Items
/// already shown keep their resting state and do not shift the cascade.
pub fn stagger_plan(revealed: &[bool], delay_ms: u32) -> Vec<StaggerStep> {
    revealed
        .iter()
        .enumerate()
        .filter(|(_, shown)| !**shown)
        .enumerate()
        .map(|(position, (index, _))| StaggerStep {
            index,
            delay_ms: delay_ms.saturating_mul(position as u32),
        })
        .collect()
}

/// Inline styles for the two resting states of a revealable element.
pub mod styles {
    pub const HIDDEN_OPACITY: &str = "0";
    pub const HIDDEN_OFFSET: &str = "translateY(25px)";
    pub const SHOWN_OPACITY: &str = "1";
    pub const SHOWN_OFFSET: &str = "translateY(0)";
    pub const TRANSITION: &str = "opacity 0.55s ease, transform 0.55s ease";
    /// Class toggled by single-element reveals; the keyframes live in the
    /// page stylesheet.
    pub const FADE_IN_CLASS: &str = "animate-fade-in-up";
}

/// Put a single watched element into its hidden resting state.
pub fn conceal(surface: &dyn Surface) {
    write_style(surface, "opacity", styles::HIDDEN_OPACITY);
}

/// Apply a tracker decision to the element it describes.
pub fn apply(surface: &dyn Surface, action: RevealAction) {
    if !surface.is_attached() {
        return;
    }
    match action {
        RevealAction::Reveal | RevealAction::RevealAndUnobserve => {
            surface.toggle_class(styles::FADE_IN_CLASS, true);
            surface.set_style("opacity", styles::SHOWN_OPACITY);
        }
        RevealAction::Hide => {
            surface.toggle_class(styles::FADE_IN_CLASS, false);
            surface.set_style("opacity", styles::HIDDEN_OPACITY);
        }
        RevealAction::None => {}
    }
}

/// A member of a staggered group that remembers whether it was shown.
pub trait RevealTarget: Surface {
    fn is_revealed(&self) -> bool;
    fn mark_revealed(&self);
}

/// The not-yet-revealed members of a group, hidden and waiting for their
/// container to scroll into view.
pub struct StaggerGroup {
    steps: Vec<(Rc<dyn RevealTarget>, u32)>,
    timers: Vec<TimerGuard>,
    triggered: bool,
}

impl StaggerGroup {
    /// Hide the members that still need a reveal. Returns `None` when every
    /// member is already shown, so there is nothing to watch.
    pub fn prepare(items: Vec<Rc<dyn RevealTarget>>, delay_ms: u32) -> Option<Self> {
        let flags: Vec<bool> = items.iter().map(|item| item.is_revealed()).collect();
        let steps: Vec<_> = stagger_plan(&flags, delay_ms)
            .into_iter()
            .map(|step| (Rc::clone(&items[step.index]), step.delay_ms))
            .collect();
        if steps.is_empty() {
            return None;
        }
        for (item, _) in &steps {
            write_style(item.as_ref(), "opacity", styles::HIDDEN_OPACITY);
            write_style(item.as_ref(), "transform", styles::HIDDEN_OFFSET);
        }
        Some(Self {
            steps,
            timers: Vec::new(),
            triggered: false,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// Start the cascade. Later calls do nothing.
    pub fn trigger(&mut self, timers: &Rc<dyn TimerScheduler>) {
        if self.triggered {
            return;
        }
        self.triggered = true;
        for (item, delay) in &self.steps {
            let item = Rc::clone(item);
            self.timers.push(TimerGuard::schedule(Rc::clone(timers), *delay, move || {
                if !item.is_attached() {
                    return;
                }
                item.set_style("transition", styles::TRANSITION);
                item.set_style("opacity", styles::SHOWN_OPACITY);
                item.set_style("transform", styles::SHOWN_OFFSET);
                item.mark_revealed();
            }));
        }
    }
}
