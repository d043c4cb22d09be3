//! Browser implementations of the `motion` host traits.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlElement, MediaQueryList, Window};

use crate::effects::TextSink;
use crate::error::{SiteError, SiteResult};
use crate::motion::gate::{media_queries, Capabilities};
use crate::motion::reveal::RevealTarget;
use crate::motion::{FrameScheduler, FrameToken, Surface, TimerScheduler, TimerToken};

/// Live JS callbacks keyed by id. A callback records itself as fired only
/// after it has returned, and fired entries are dropped lazily on the next
/// call, so a closure is never freed while it is running.
struct CallbackTable<H> {
    live: RefCell<HashMap<i32, H>>,
    running: Cell<Option<i32>>,
    fired: RefCell<Vec<i32>>,
}

impl<H> CallbackTable<H> {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            live: RefCell::new(HashMap::new()),
            running: Cell::new(None),
            fired: RefCell::new(Vec::new()),
        })
    }

    fn purge(&self) {
        let fired: Vec<i32> = self.fired.borrow_mut().drain(..).collect();
        let mut live = self.live.borrow_mut();
        for id in fired {
            live.remove(&id);
        }
    }

    fn enter(&self, id: i32) {
        self.running.set(Some(id));
    }

    fn leave(&self, id: i32) {
        self.running.set(None);
        self.fired.borrow_mut().push(id);
    }

    /// Take a handle out for cancellation, unless it is running or done.
    fn take(&self, id: i32) -> Option<H> {
        if self.running.get() == Some(id) || self.fired.borrow().contains(&id) {
            return None;
        }
        self.live.borrow_mut().remove(&id)
    }
}

/// `requestAnimationFrame`.
pub struct RafScheduler {
    window: Window,
    table: Rc<CallbackTable<Closure<dyn FnMut(f64)>>>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Rc<Self> {
        Rc::new(Self { window, table: CallbackTable::new() })
    }
}

impl FrameScheduler for RafScheduler {
    fn request(&self, callback: Box<dyn FnOnce(f64)>) -> FrameToken {
        self.table.purge();
        let id = Rc::new(Cell::new(0));
        let closure = {
            let id = Rc::clone(&id);
            let table = Rc::downgrade(&self.table);
            let mut callback = Some(callback);
            Closure::wrap(Box::new(move |ts: f64| {
                let Some(table) = table.upgrade() else {
                    return;
                };
                table.enter(id.get());
                if let Some(callback) = callback.take() {
                    callback(ts);
                }
                table.leave(id.get());
            }) as Box<dyn FnMut(f64)>)
        };
        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => {
                id.set(handle);
                self.table.live.borrow_mut().insert(handle, closure);
                FrameToken(handle)
            }
            Err(err) => {
                console_error!("requestAnimationFrame failed: {}", SiteError::from(err));
                FrameToken(-1)
            }
        }
    }

    fn cancel(&self, token: FrameToken) {
        if self.table.take(token.0).is_some() {
            let _ = self.window.cancel_animation_frame(token.0);
        }
    }
}

/// `setTimeout`, through `gloo-timers`. Dropping a `Timeout` clears it.
pub struct WindowTimers {
    next: Cell<i32>,
    table: Rc<CallbackTable<Timeout>>,
}

impl WindowTimers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self { next: Cell::new(1), table: CallbackTable::new() })
    }
}

impl TimerScheduler for WindowTimers {
    fn after(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerToken {
        self.table.purge();
        let id = self.next.get();
        self.next.set(id.wrapping_add(1).max(1));
        let table = Rc::downgrade(&self.table);
        let timeout = Timeout::new(delay_ms, move || {
            let Some(table) = table.upgrade() else {
                return;
            };
            table.enter(id);
            callback();
            table.leave(id);
        });
        self.table.live.borrow_mut().insert(id, timeout);
        TimerToken(id as u32)
    }

    fn clear(&self, token: TimerToken) {
        drop(self.table.take(token.0 as i32));
    }
}

/// A page element driven by effects.
#[derive(Clone)]
pub struct ElementSurface {
    element: HtmlElement,
}

const REVEALED_KEY: &str = "revealed";

impl ElementSurface {
    pub fn new(element: HtmlElement) -> Rc<Self> {
        Rc::new(Self { element })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Surface for ElementSurface {
    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = self.element.style().set_property(property, value);
    }

    fn toggle_class(&self, class: &str, on: bool) {
        let _ = self.element.class_list().toggle_with_force(class, on);
    }
}

impl RevealTarget for ElementSurface {
    fn is_revealed(&self) -> bool {
        self.element.dataset().get(REVEALED_KEY).is_some()
    }

    fn mark_revealed(&self) {
        let _ = self.element.dataset().set(REVEALED_KEY, "true");
    }
}

impl TextSink for ElementSurface {
    fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

/// An event listener that removes itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, callback: F) -> SiteResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        Self::with_passive(target, event, false, callback)
    }

    /// Passive listeners for scroll and pointer tracking.
    pub fn passive<F>(target: &EventTarget, event: &'static str, callback: F) -> SiteResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        Self::with_passive(target, event, true, callback)
    }

    fn with_passive<F>(
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        callback: F,
    ) -> SiteResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// The pointer-effect media queries, re-read on every change.
pub struct CapabilityWatch {
    fine_pointer: MediaQueryList,
    wide_viewport: MediaQueryList,
    _listeners: Vec<Listener>,
}

impl CapabilityWatch {
    pub fn new<F>(window: &Window, min_width_px: u32, on_change: F) -> SiteResult<Self>
    where
        F: Fn(Capabilities) + 'static,
    {
        let [pointer_query, width_query] = media_queries(min_width_px);
        let fine_pointer = query(window, &pointer_query)?;
        let wide_viewport = query(window, &width_query)?;
        Self::from_lists(fine_pointer, wide_viewport, on_change)
    }

    /// Watch already-resolved query lists.
    pub fn from_lists<F>(
        fine_pointer: MediaQueryList,
        wide_viewport: MediaQueryList,
        on_change: F,
    ) -> SiteResult<Self>
    where
        F: Fn(Capabilities) + 'static,
    {
        let on_change = Rc::new(on_change);
        let mut listeners = Vec::with_capacity(2);
        for list in [&fine_pointer, &wide_viewport] {
            let (a, b) = (fine_pointer.clone(), wide_viewport.clone());
            let on_change = Rc::clone(&on_change);
            listeners.push(Listener::new(list, "change", move |_| {
                on_change(Capabilities {
                    fine_pointer: a.matches(),
                    wide_viewport: b.matches(),
                });
            })?);
        }
        Ok(Self {
            fine_pointer,
            wide_viewport,
            _listeners: listeners,
        })
    }

    pub fn current(&self) -> Capabilities {
        Capabilities {
            fine_pointer: self.fine_pointer.matches(),
            wide_viewport: self.wide_viewport.matches(),
        }
    }
}

pub fn query(window: &Window, media: &str) -> SiteResult<MediaQueryList> {
    window
        .match_media(media)?
        .ok_or(SiteError::Unsupported("matchMedia"))
}
