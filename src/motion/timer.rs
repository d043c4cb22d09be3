//! One-shot deferred callbacks (`setTimeout` in the browser).

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u32);

pub trait TimerScheduler {
    fn after(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerToken;
    /// Clearing a token that already fired or was cleared does nothing.
    fn clear(&self, token: TimerToken);
}

/// Owns one scheduled callback and clears it when dropped.
pub struct TimerGuard {
    timers: Rc<dyn TimerScheduler>,
    token: Cell<Option<TimerToken>>,
}

impl TimerGuard {
    pub fn schedule<F>(timers: Rc<dyn TimerScheduler>, delay_ms: u32, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let token = timers.after(delay_ms, Box::new(callback));
        Self {
            timers,
            token: Cell::new(Some(token)),
        }
    }

    pub fn clear(&self) {
        if let Some(token) = self.token.take() {
            self.timers.clear(token);
        }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
pub(crate) mod manual {
    use super::*;
    use std::cell::RefCell;

    /// Virtual clock: callbacks fire when `advance_to` passes their deadline.
    #[derive(Default)]
    pub struct ManualTimers {
        now: Cell<u64>,
        next: Cell<u32>,
        queue: RefCell<Vec<(TimerToken, u64, Box<dyn FnOnce()>)>>,
    }

    impl ManualTimers {
        pub fn new() -> Rc<Self> {
            Rc::new(Self::default())
        }

        pub fn now(&self) -> u64 {
            self.now.get()
        }

        /// Fire every callback due at or before `ms`, earliest first.
        pub fn advance_to(&self, ms: u64) {
            loop {
                let due = {
                    let mut queue = self.queue.borrow_mut();
                    let idx = queue
                        .iter()
                        .enumerate()
                        .filter(|(_, (_, at, _))| *at <= ms)
                        .min_by_key(|(i, (_, at, _))| (*at, *i))
                        .map(|(i, _)| i);
                    idx.map(|i| queue.remove(i))
                };
                match due {
                    Some((_, at, callback)) => {
                        self.now.set(at.max(self.now.get()));
                        callback();
                    }
                    None => break,
                }
            }
            self.now.set(ms.max(self.now.get()));
        }

        pub fn advance_by(&self, ms: u64) {
            self.advance_to(self.now.get() + ms);
        }

        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }
    }

    impl TimerScheduler for ManualTimers {
        fn after(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerToken {
            let token = TimerToken(self.next.get());
            self.next.set(self.next.get() + 1);
            let at = self.now.get() + u64::from(delay_ms);
            self.queue.borrow_mut().push((token, at, callback));
            token
        }

        fn clear(&self, token: TimerToken) {
            self.queue.borrow_mut().retain(|(t, _, _)| *t != token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manual::ManualTimers;
    use super::*;

    #[test]
    fn guard_fires_once_at_deadline() {
        let timers = ManualTimers::new();
        let fired = Rc::new(Cell::new(0));
        let hit = Rc::clone(&fired);
        let _guard = TimerGuard::schedule(timers.clone(), 100, move || hit.set(hit.get() + 1));
        timers.advance_to(99);
        assert_eq!(fired.get(), 0);
        timers.advance_to(100);
        timers.advance_to(500);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn dropping_the_guard_clears_it() {
        let timers = ManualTimers::new();
        let fired = Rc::new(Cell::new(false));
        let hit = Rc::clone(&fired);
        let guard = TimerGuard::schedule(timers.clone(), 10, move || hit.set(true));
        guard.clear();
        guard.clear();
        drop(guard);
        timers.advance_to(50);
        assert!(!fired.get());
        assert_eq!(timers.pending(), 0);
    }
}
