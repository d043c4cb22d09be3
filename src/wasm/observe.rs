//! `IntersectionObserver` plumbing for reveals and staggered groups.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use super::host::ElementSurface;
use crate::config::RevealSettings;
use crate::error::SiteResult;
use crate::motion::reveal::{
    self, RevealAction, RevealMode, RevealTarget, RevealTracker, StaggerGroup,
};
use crate::motion::TimerScheduler;

type EntryCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// An observer that disconnects when dropped.
pub struct Watch {
    observer: IntersectionObserver,
    _callback: EntryCallback,
}

impl Watch {
    pub fn new<F>(threshold: f64, root_margin: &str, mut on_entry: F) -> SiteResult<Self>
    where
        F: FnMut(&IntersectionObserverEntry, &IntersectionObserver) + 'static,
    {
        let dispatch = move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    on_entry(&entry, &observer);
                }
            }
        };
        let callback: EntryCallback =
            Closure::wrap(Box::new(dispatch) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self { observer, _callback: callback })
    }

    pub fn observe(&self, element: &Element) {
        self.observer.observe(element);
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

const REVEAL_ID: &str = "revealId";

/// Every `[data-reveal]` element, each with its own tracker. The attribute
/// value picks the mode: `repeat` re-hides on exit, anything else reveals
/// once.
pub struct Reveals {
    _watch: Option<Watch>,
}

impl Reveals {
    pub fn mount(document: &Document, settings: &RevealSettings) -> SiteResult<Self> {
        let elements = select_all(document, "[data-reveal]")?;
        if elements.is_empty() {
            return Ok(Self { _watch: None });
        }

        type Tracked = (Rc<ElementSurface>, RevealTracker);
        let trackers: Rc<RefCell<HashMap<String, Tracked>>> = Rc::default();
        let watch = {
            let trackers = Rc::clone(&trackers);
            Watch::new(settings.threshold, &settings.root_margin, move |entry, observer| {
                let target = entry.target();
                let Some(id) = target.get_attribute("data-reveal-id") else {
                    return;
                };
                let mut trackers = trackers.borrow_mut();
                let Some((surface, tracker)) = trackers.get_mut(&id) else {
                    return;
                };
                if let Some(root) = entry.root_bounds() {
                    tracker.fit(entry.bounding_client_rect().height(), root.height());
                }
                let action = tracker.observe(entry.intersection_ratio(), entry.is_intersecting());
                reveal::apply(surface.as_ref(), action);
                if action == RevealAction::RevealAndUnobserve {
                    observer.unobserve(&target);
                }
            })?
        };

        for (i, element) in elements.into_iter().enumerate() {
            let mode = RevealMode::from_attr(&element.dataset().get("reveal").unwrap_or_default());
            let id = i.to_string();
            let _ = element.dataset().set(REVEAL_ID, &id);
            let surface = ElementSurface::new(element.clone());
            reveal::conceal(surface.as_ref());
            trackers
                .borrow_mut()
                .insert(id, (surface, RevealTracker::new(mode, settings.threshold)));
            watch.observe(&element);
        }
        Ok(Self { _watch: Some(watch) })
    }
}

/// A `[data-stagger]` container whose children cascade in together the
/// first time the container scrolls into view.
pub struct Stagger {
    container: HtmlElement,
    group: Rc<RefCell<Option<StaggerGroup>>>,
    seen: Rc<Cell<bool>>,
    timers: Rc<dyn TimerScheduler>,
    delay_ms: u32,
    _watch: Watch,
}

impl Stagger {
    pub fn mount(
        container: HtmlElement,
        settings: &RevealSettings,
        timers: Rc<dyn TimerScheduler>,
    ) -> SiteResult<Self> {
        let group = Rc::new(RefCell::new(StaggerGroup::prepare(
            visible_children(&container),
            settings.stagger_ms,
        )));
        let seen = Rc::new(Cell::new(false));
        let watch = {
            let group = Rc::clone(&group);
            let seen = Rc::clone(&seen);
            let timers = Rc::clone(&timers);
            let on_entry =
                move |entry: &IntersectionObserverEntry, observer: &IntersectionObserver| {
                    if !entry.is_intersecting() {
                        return;
                    }
                    seen.set(true);
                    if let Some(group) = group.borrow_mut().as_mut() {
                        group.trigger(&timers);
                    }
                    observer.unobserve(&entry.target());
                };
            Watch::new(settings.stagger_threshold, &settings.stagger_root_margin, on_entry)?
        };
        watch.observe(&container);
        Ok(Self {
            container,
            group,
            seen,
            timers,
            delay_ms: settings.stagger_ms,
            _watch: watch,
        })
    }

    /// Children were shown or added: re-plan for the ones never revealed.
    /// Once the container has been on screen the new group starts at once;
    /// before that it waits for the first intersection.
    pub fn refresh(&self) {
        let mut next = StaggerGroup::prepare(visible_children(&self.container), self.delay_ms);
        if self.seen.get() {
            if let Some(group) = next.as_mut() {
                group.trigger(&self.timers);
            }
        }
        *self.group.borrow_mut() = next;
    }
}

fn visible_children(container: &HtmlElement) -> Vec<Rc<dyn RevealTarget>> {
    let children = container.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .filter(|el| !el.hidden())
        .map(|el| ElementSurface::new(el) as Rc<dyn RevealTarget>)
        .collect()
}

pub fn select_all(root: &Document, selector: &str) -> SiteResult<Vec<HtmlElement>> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}
