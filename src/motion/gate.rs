//! Capability-driven mounting of pointer effects.
//!
//! A gate holds either nothing or one live effect. It is re-applied on every
//! capability change notification and tears the effect down before leaving
//! the active state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `(pointer: fine)` matches.
    pub fine_pointer: bool,
    /// Viewport at least as wide as the configured threshold.
    pub wide_viewport: bool,
}

impl Capabilities {
    pub fn allows_pointer_effects(&self) -> bool {
        self.fine_pointer && self.wide_viewport
    }
}

/// Media queries backing [`Capabilities`].
pub fn media_queries(min_width_px: u32) -> [String; 2] {
    ["(pointer: fine)".to_string(), format!("(min-width: {}px)", min_width_px)]
}

/// Something a gate can mount and must be able to fully release.
pub trait Effect {
    /// Cancel loops, remove listeners, unmount nodes. Called exactly once.
    fn teardown(&mut self);
}

pub enum GateState<E> {
    Disabled,
    Active(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Mounted,
    TornDown,
    Unchanged,
}

pub struct CapabilityGate<E: Effect> {
    state: GateState<E>,
}

impl<E: Effect> Default for CapabilityGate<E> {
    fn default() -> Self {
        Self { state: GateState::Disabled }
    }
}

impl<E: Effect> CapabilityGate<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the state `caps` calls for. `mount` runs only on a
    /// disabled → active edge; a mount that yields `None` (e.g. its nodes
    /// could not be created) leaves the gate disabled.
    pub fn apply<F>(&mut self, caps: Capabilities, mount: F) -> Transition
    where
        F: FnOnce() -> Option<E>,
    {
        let wanted = caps.allows_pointer_effects();
        match (self.is_active(), wanted) {
            (false, true) => match mount() {
                Some(effect) => {
                    self.state = GateState::Active(effect);
                    Transition::Mounted
                }
                None => Transition::Unchanged,
            },
            (true, false) => {
                self.shutdown();
                Transition::TornDown
            }
            _ => Transition::Unchanged,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GateState::Active(_))
    }

    fn shutdown(&mut self) {
        let previous = std::mem::replace(&mut self.state, GateState::Disabled);
        if let GateState::Active(mut effect) = previous {
            effect.teardown();
        }
    }
}

impl<E: Effect> Drop for CapabilityGate<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe {
        torn: Rc<Cell<usize>>,
    }

    impl Effect for Probe {
        fn teardown(&mut self) {
            self.torn.set(self.torn.get() + 1);
        }
    }

    const DESKTOP: Capabilities = Capabilities { fine_pointer: true, wide_viewport: true };
    const NARROW: Capabilities = Capabilities { fine_pointer: true, wide_viewport: false };
    const TOUCH: Capabilities = Capabilities { fine_pointer: false, wide_viewport: true };

    #[test]
    fn mounts_once_and_tears_down_on_any_failed_predicate() {
        let torn = Rc::new(Cell::new(0));
        let mounts = Cell::new(0);
        let mut gate = CapabilityGate::new();
        let mut mount = || {
            mounts.set(mounts.get() + 1);
            Some(Probe { torn: Rc::clone(&torn) })
        };

        assert_eq!(gate.apply(DESKTOP, &mut mount), Transition::Mounted);
        assert_eq!(gate.apply(DESKTOP, &mut mount), Transition::Unchanged);
        assert_eq!(mounts.get(), 1);

        assert_eq!(gate.apply(NARROW, &mut mount), Transition::TornDown);
        assert_eq!(torn.get(), 1);
        assert!(!gate.is_active());

        assert_eq!(gate.apply(DESKTOP, &mut mount), Transition::Mounted);
        assert_eq!(gate.apply(TOUCH, &mut mount), Transition::TornDown);
        assert_eq!(torn.get(), 2);
        assert_eq!(mounts.get(), 2);
    }

    #[test]
    fn disabled_gate_never_mounts() {
        let mut gate: CapabilityGate<Probe> = CapabilityGate::new();
        let t = gate.apply(TOUCH, || panic!("must not mount on touch devices"));
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn failed_mount_stays_disabled() {
        let mut gate: CapabilityGate<Probe> = CapabilityGate::new();
        assert_eq!(gate.apply(DESKTOP, || None), Transition::Unchanged);
        assert!(!gate.is_active());
    }

    #[test]
    fn drop_tears_down() {
        let torn = Rc::new(Cell::new(0));
        {
            let mut gate = CapabilityGate::new();
            gate.apply(DESKTOP, || Some(Probe { torn: Rc::clone(&torn) }));
        }
        assert_eq!(torn.get(), 1);
    }

    #[test]
    fn query_strings() {
        let [pointer, width] = media_queries(1024);
        assert_eq!(pointer, "(pointer: fine)");
        assert_eq!(width, "(min-width: 1024px)");
    }
}
