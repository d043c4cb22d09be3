//! Imperative style writes that bypass any re-render path.

use super::lerp::Vec2;

/// A visual node the animation layer may restyle directly.
pub trait Surface {
    /// `false` once the node has been removed from the document.
    fn is_attached(&self) -> bool;
    fn set_style(&self, property: &str, value: &str);
    fn toggle_class(&self, class: &str, on: bool);
}

/// Write a style property unless the target is gone. Teardown races are
/// expected while effects unmount, so a detached target is skipped silently.
pub fn write_style(surface: &dyn Surface, property: &str, value: &str) -> bool {
    if !surface.is_attached() {
        return false;
    }
    surface.set_style(property, value);
    true
}

pub fn translate(v: Vec2) -> String {
    format!("translate({}px, {}px)", v.x, v.y)
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Captures every style write so tests can assert on DOM traffic.
    #[derive(Default)]
    pub struct RecordingSurface {
        detached: Cell<bool>,
        writes: RefCell<Vec<(String, String)>>,
    }

    impl RecordingSurface {
        pub fn new() -> Rc<Self> {
            Rc::new(Self::default())
        }

        pub fn detach(&self) {
            self.detached.set(true);
        }

        pub fn writes(&self) -> usize {
            self.writes.borrow().len()
        }

        pub fn last(&self, property: &str) -> Option<String> {
            self.writes
                .borrow()
                .iter()
                .rev()
                .find(|(p, _)| p == property)
                .map(|(_, v)| v.clone())
        }

        pub fn values(&self, property: &str) -> Vec<String> {
            self.writes
                .borrow()
                .iter()
                .filter(|(p, _)| p == property)
                .map(|(_, v)| v.clone())
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn is_attached(&self) -> bool {
            !self.detached.get()
        }

        fn set_style(&self, property: &str, value: &str) {
            self.writes
                .borrow_mut()
                .push((property.to_string(), value.to_string()));
        }

        fn toggle_class(&self, class: &str, on: bool) {
            self.writes
                .borrow_mut()
                .push((format!("class:{}", class), if on { "on" } else { "off" }.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::RecordingSurface;
    use super::*;

    #[test]
    fn detached_surface_is_skipped() {
        let surface = RecordingSurface::new();
        assert!(write_style(surface.as_ref(), "opacity", "1"));
        surface.detach();
        assert!(!write_style(surface.as_ref(), "opacity", "0"));
        assert_eq!(surface.writes(), 1);
        assert_eq!(surface.last("opacity").as_deref(), Some("1"));
    }

    #[test]
    fn translate_format() {
        assert_eq!(translate(Vec2::new(12.5, -3.0)), "translate(12.5px, -3px)");
    }
}
