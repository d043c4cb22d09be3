//! Card grids that show a few items until expanded.

use crate::config::GridConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// Below 640px.
    Mobile,
    Tablet,
    /// 1024px and up.
    Desktop,
}

pub const MOBILE_QUERY: &str = "(max-width: 639px)";
pub const DESKTOP_QUERY: &str = "(min-width: 1024px)";

impl Breakpoint {
    pub fn from_matches(mobile: bool, desktop: bool) -> Self {
        match (mobile, desktop) {
            (true, _) => Breakpoint::Mobile,
            (false, true) => Breakpoint::Desktop,
            (false, false) => Breakpoint::Tablet,
        }
    }
}

/// Collapsed grids show a breakpoint-dependent number of cards; tablets and
/// expanded grids show all of them.
pub fn visible_count(
    breakpoint: Breakpoint,
    show_all: bool,
    total: usize,
    limits: &GridConfig,
) -> usize {
    if show_all {
        return total;
    }
    match breakpoint {
        Breakpoint::Mobile => total.min(limits.mobile_visible),
        Breakpoint::Desktop => total.min(limits.desktop_visible),
        Breakpoint::Tablet => total,
    }
}

/// Whether an expand / collapse toggle is worth showing at all.
pub fn has_toggle(breakpoint: Breakpoint, total: usize, limits: &GridConfig) -> bool {
    visible_count(breakpoint, false, total, limits) < total
}

pub fn toggle_label(show_all: bool, hidden: usize, breakpoint: Breakpoint) -> String {
    match (show_all, breakpoint) {
        (true, _) => "Show Less".to_string(),
        (false, Breakpoint::Mobile) => format!("See All ({} more)", hidden),
        (false, _) => "See All".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridState {
    pub breakpoint: Breakpoint,
    pub show_all: bool,
    pub total: usize,
}

impl GridState {
    pub fn visible(&self, limits: &GridConfig) -> usize {
        visible_count(self.breakpoint, self.show_all, self.total, limits)
    }

    pub fn toggle(&mut self) {
        self.show_all = !self.show_all;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_breakpoint() {
        let limits = GridConfig::default();
        assert_eq!(visible_count(Breakpoint::Mobile, false, 10, &limits), 3);
        assert_eq!(visible_count(Breakpoint::Desktop, false, 10, &limits), 6);
        assert_eq!(visible_count(Breakpoint::Tablet, false, 10, &limits), 10);
        assert_eq!(visible_count(Breakpoint::Desktop, true, 10, &limits), 10);
        assert_eq!(visible_count(Breakpoint::Desktop, false, 4, &limits), 4);
    }

    #[test]
    fn toggle_only_when_cards_are_hidden() {
        let limits = GridConfig::default();
        assert!(has_toggle(Breakpoint::Mobile, 5, &limits));
        assert!(!has_toggle(Breakpoint::Desktop, 6, &limits));
        assert!(!has_toggle(Breakpoint::Tablet, 50, &limits));
    }

    #[test]
    fn breakpoint_from_queries() {
        assert_eq!(Breakpoint::from_matches(true, false), Breakpoint::Mobile);
        assert_eq!(Breakpoint::from_matches(false, true), Breakpoint::Desktop);
        assert_eq!(Breakpoint::from_matches(false, false), Breakpoint::Tablet);
    }

    #[test]
    fn labels() {
        assert_eq!(toggle_label(false, 4, Breakpoint::Mobile), "See All (4 more)");
        assert_eq!(toggle_label(false, 4, Breakpoint::Desktop), "See All");
        assert_eq!(toggle_label(true, 0, Breakpoint::Mobile), "Show Less");
    }

    #[test]
    fn state_toggles() {
        let limits = GridConfig::default();
        let mut state = GridState { breakpoint: Breakpoint::Desktop, show_all: false, total: 9 };
        assert_eq!(state.visible(&limits), 6);
        state.toggle();
        assert_eq!(state.visible(&limits), 9);
    }
}
