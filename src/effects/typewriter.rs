//! Type / pause / delete cycles for headline text.

use std::cell::RefCell;
use std::rc::Rc;

use crate::motion::{TimerGuard, TimerScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub type_ms: u32,
    pub delete_ms: u32,
    pub pause_ms: u32,
}

/// Rotating role phrases under the hero heading.
pub const PHRASES: Cadence = Cadence { type_ms: 100, delete_ms: 60, pause_ms: 1600 };
/// The name in the hero heading, typed slower and held longer.
pub const NAME: Cadence = Cadence { type_ms: 130, delete_ms: 85, pause_ms: 2000 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Typing,
    Pausing,
    Deleting,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<Vec<char>>,
    cadence: Cadence,
    looping: bool,
    index: usize,
    shown: usize,
    phase: Phase,
}

impl Typewriter {
    pub fn new<I, S>(phrases: I, cadence: Cadence, looping: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<Vec<char>> = phrases
            .into_iter()
            .map(|p| p.as_ref().chars().collect())
            .filter(|p: &Vec<char>| !p.is_empty())
            .collect();
        let phase = if phrases.is_empty() { Phase::Stopped } else { Phase::Typing };
        Self {
            phrases,
            cadence,
            looping,
            index: 0,
            shown: 0,
            phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn text(&self) -> String {
        self.phrases
            .get(self.index)
            .map(|p| p[..self.shown].iter().collect())
            .unwrap_or_default()
    }

    /// Advance one step; returns the text to display and the delay until the
    /// next step, or `None` for the delay once the cycle has stopped.
    pub fn step(&mut self) -> (String, Option<u32>) {
        let len = match self.phrases.get(self.index) {
            Some(p) => p.len(),
            None => return (String::new(), None),
        };
        let delay = match self.phase {
            Phase::Typing => {
                self.shown += 1;
                if self.shown >= len {
                    self.phase = Phase::Pausing;
                    Some(self.cadence.pause_ms)
                } else {
                    Some(self.cadence.type_ms)
                }
            }
            Phase::Pausing | Phase::Deleting => {
                self.phase = Phase::Deleting;
                self.shown = self.shown.saturating_sub(1);
                if self.shown == 0 {
                    self.next_phrase()
                } else {
                    Some(self.cadence.delete_ms)
                }
            }
            Phase::Stopped => None,
        };
        (self.text(), delay)
    }

    fn next_phrase(&mut self) -> Option<u32> {
        let next = (self.index + 1) % self.phrases.len();
        if !self.looping && next == 0 {
            self.phase = Phase::Stopped;
            return None;
        }
        self.index = next;
        self.phase = Phase::Typing;
        Some(self.cadence.type_ms)
    }
}

/// Where typed text is shown.
pub trait TextSink {
    fn set_text(&self, text: &str);
}

/// Drives a [`Typewriter`] with timers; dropping it stops the cycle.
pub struct TypewriterEffect {
    next: Rc<RefCell<Option<TimerGuard>>>,
}

impl TypewriterEffect {
    pub fn start(
        timers: Rc<dyn TimerScheduler>,
        sink: Rc<dyn TextSink>,
        writer: Typewriter,
    ) -> Self {
        let next = Rc::new(RefCell::new(None));
        let first = writer.cadence.type_ms;
        let writer = Rc::new(RefCell::new(writer));
        schedule(&timers, &sink, &writer, &next, first);
        Self { next }
    }

    pub fn stop(&self) {
        self.next.borrow_mut().take();
    }
}

fn schedule(
    timers: &Rc<dyn TimerScheduler>,
    sink: &Rc<dyn TextSink>,
    writer: &Rc<RefCell<Typewriter>>,
    next: &Rc<RefCell<Option<TimerGuard>>>,
    delay: u32,
) {
    let guard = {
        let timers = Rc::clone(timers);
        let sink = Rc::clone(sink);
        let writer = Rc::clone(writer);
        let slot = Rc::downgrade(next);
        TimerGuard::schedule(Rc::clone(&timers), delay, move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let (text, delay) = writer.borrow_mut().step();
            sink.set_text(&text);
            match delay {
                Some(delay) => schedule(&timers, &sink, &writer, &slot, delay),
                None => {
                    slot.borrow_mut().take();
                }
            }
        })
    };
    *next.borrow_mut() = Some(guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::timer::manual::ManualTimers;

    fn run(writer: &mut Typewriter, steps: usize) -> Vec<String> {
        (0..steps).map(|_| writer.step().0).collect()
    }

    #[test]
    fn types_pauses_and_deletes() {
        let mut w = Typewriter::new(["ab"], NAME, true);
        assert_eq!(w.step(), ("a".to_string(), Some(130)));
        assert_eq!(w.step(), ("ab".to_string(), Some(2000)));
        assert_eq!(w.phase(), Phase::Pausing);
        assert_eq!(w.step(), ("a".to_string(), Some(85)));
        assert_eq!(w.step(), ("".to_string(), Some(130)));
        assert_eq!(w.phase(), Phase::Typing);
        assert_eq!(w.step().0, "a");
    }

    #[test]
    fn rotates_phrases() {
        let mut w = Typewriter::new(["hi", "yo"], PHRASES, true);
        let seen = run(&mut w, 8);
        assert_eq!(seen, vec!["h", "hi", "h", "", "y", "yo", "y", ""]);
        assert_eq!(w.step().0, "h");
    }

    #[test]
    fn non_looping_stops_after_last_phrase() {
        let mut w = Typewriter::new(["a", "b"], PHRASES, false);
        assert_eq!(run(&mut w, 3), vec!["a", "", "b"]);
        let (text, delay) = w.step();
        assert_eq!(text, "");
        assert_eq!(delay, None);
        assert_eq!(w.phase(), Phase::Stopped);
    }

    #[test]
    fn multibyte_text_is_split_on_chars() {
        let mut w = Typewriter::new(["héllo"], PHRASES, true);
        assert_eq!(run(&mut w, 2), vec!["h", "hé"]);
    }

    #[test]
    fn empty_input_never_runs() {
        let mut w = Typewriter::new(Vec::<String>::new(), PHRASES, true);
        assert_eq!(w.step(), (String::new(), None));
    }

    struct Captured(RefCell<Vec<String>>);

    impl TextSink for Captured {
        fn set_text(&self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    #[test]
    fn effect_follows_the_cadence_and_stops_on_drop() {
        let timers = ManualTimers::new();
        let sink = Rc::new(Captured(RefCell::new(Vec::new())));
        let writer = Typewriter::new(["abc"], PHRASES, true);
        let effect = TypewriterEffect::start(timers.clone(), sink.clone(), writer);

        timers.advance_to(99);
        assert!(sink.0.borrow().is_empty());
        timers.advance_to(300);
        assert_eq!(*sink.0.borrow(), vec!["a", "ab", "abc"]);

        drop(effect);
        timers.advance_to(10_000);
        assert_eq!(sink.0.borrow().len(), 3);
        assert_eq!(timers.pending(), 0);
    }
}
