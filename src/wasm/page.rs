//! Start-up wiring: finds the page's hooks and mounts every effect.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlCanvasElement, HtmlElement, HtmlFormElement, MediaQueryList,
    MouseEvent, Window,
};

use super::canvas::OverlayCanvas;
use super::contact::ContactForm;
use super::host::{query, CapabilityWatch, ElementSurface, Listener, RafScheduler, WindowTimers};
use super::observe::{select_all, Reveals, Stagger};
use super::render::HeroRender;
use crate::config::{GridConfig, PointerConfig, SiteConfig};
use crate::effects::cursor::INTERACTIVE_SELECTOR;
use crate::effects::grid::{self, Breakpoint, GridState, DESKTOP_QUERY, MOBILE_QUERY};
use crate::effects::loader::{LoaderTimeline, ParticleCloud};
use crate::effects::typewriter::{self, Typewriter};
use crate::effects::{
    CursorEffect, HeroScene, Loader, LoaderEffect, MagneticEffect, ScrollProgress,
    SpotlightEffect, TypewriterEffect,
};
use crate::error::{SiteError, SiteResult};
use crate::motion::{
    CapabilityGate, Effect, FrameScheduler, PointerSignal, ScrollSample, TimerScheduler, Vec2,
};
use crate::motion::signal::OFFSCREEN_POINTER;

const LOADER_ID: &str = "loader";
const SITE_ID: &str = "site";
const HERO_CANVAS_ID: &str = "hero-canvas";
const SCROLL_BAR_ID: &str = "scroll-progress";
const CONTACT_FORM_ID: &str = "contact-form";
const CUSTOM_CURSOR_CLASS: &str = "has-custom-cursor";

/// Everything mounted on the page. Dropping it unmounts every effect.
pub struct Page {
    _pointer: Listener,
    _loader: Option<LoaderEffect>,
    _scroll: Option<(Rc<ScrollProgress>, Listener)>,
    _pointer_gate: Rc<RefCell<CapabilityGate<PointerEffects>>>,
    _capabilities: CapabilityWatch,
    _magnets: Vec<Magnet>,
    _hero: Option<HeroRender>,
    _typewriters: Vec<TypewriterEffect>,
    _reveals: Reveals,
    _staggers: Vec<Stagger>,
    _grids: Option<Grids>,
    _contact: Option<ContactForm>,
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id).and_then(|el| el.dyn_into::<T>().ok())
}

fn client_point(event: &Event) -> Option<Vec2> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Vec2::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())))
}

/// Fade the site in under the departing loader.
fn show_site(document: &Document) {
    let Some(site) = by_id::<HtmlElement>(document, SITE_ID) else {
        return;
    };
    let style = site.style();
    let _ = style.set_property("opacity", "1");
    let _ = style.set_property("pointer-events", "auto");
    let _ = site.remove_attribute("aria-hidden");
}

fn page_seed() -> u64 {
    js_sys::Date::now() as u64
}

impl Page {
    pub fn boot(window: &Window, document: &Document, config: &SiteConfig) -> SiteResult<Self> {
        let frames: Rc<dyn FrameScheduler> = RafScheduler::new(window.clone());
        let timers: Rc<dyn TimerScheduler> = WindowTimers::new();

        let signal = PointerSignal::new(OFFSCREEN_POINTER);
        let pointer = {
            let signal = signal.clone();
            Listener::passive(window, "mousemove", move |event| {
                if let Some(at) = client_point(&event) {
                    signal.write(at);
                }
            })?
        };

        let loader = mount_loader(document, config, &frames, &timers);
        let scroll = mount_scroll(window, document, &frames)?;

        let pointer_gate: Rc<RefCell<CapabilityGate<PointerEffects>>> =
            Rc::new(RefCell::new(CapabilityGate::new()));
        let mount = {
            let document = document.clone();
            let frames = Rc::clone(&frames);
            let signal = signal.clone();
            let settings = config.pointer.clone();
            move || match PointerEffects::mount(&document, &frames, &signal, &settings) {
                Ok(effects) => Some(effects),
                Err(err) => {
                    console_warn!("pointer effects unavailable: {}", err);
                    None
                }
            }
        };
        let capabilities = {
            let gate = Rc::clone(&pointer_gate);
            let mount = mount.clone();
            CapabilityWatch::new(window, config.pointer.min_width_px, move |caps| {
                gate.borrow_mut().apply(caps, &mount);
            })?
        };
        pointer_gate.borrow_mut().apply(capabilities.current(), &mount);

        let magnets = select_all(document, ".magnetic-btn")?
            .into_iter()
            .map(|el| Magnet::mount(el, &frames, &config.pointer))
            .collect::<SiteResult<Vec<_>>>()?;

        let hero = match by_id::<HtmlCanvasElement>(document, HERO_CANVAS_ID) {
            Some(canvas) => {
                let scene = HeroScene::new(page_seed(), config.pointer.parallax_factor);
                match HeroRender::start(window, canvas, Rc::clone(&frames), signal.clone(), scene) {
                    Ok(hero) => Some(hero),
                    Err(err) => {
                        console_warn!("hero scene disabled: {}", err);
                        None
                    }
                }
            }
            None => None,
        };

        let typewriters: Vec<TypewriterEffect> = select_all(document, "[data-typewriter]")?
            .into_iter()
            .filter_map(|el| mount_typewriter(el, &timers))
            .collect();

        let reveals = Reveals::mount(document, &config.reveal)?;
        let staggers = select_all(document, "[data-stagger]:not([data-grid])")?
            .into_iter()
            .map(|el| Stagger::mount(el, &config.reveal, Rc::clone(&timers)))
            .collect::<SiteResult<Vec<_>>>()?;
        let grids = Grids::mount(window, document, config, &timers)?;

        let contact = match by_id::<HtmlFormElement>(document, CONTACT_FORM_ID) {
            Some(form) => {
                Some(ContactForm::mount(form, config.contact.clone(), Rc::clone(&timers))?)
            }
            None => None,
        };

        console_log!(
            "page ready: {} magnetic, {} typewriter, {} grid(s)",
            magnets.len(),
            typewriters.len(),
            grids.as_ref().map_or(0, Grids::len)
        );

        Ok(Self {
            _pointer: pointer,
            _loader: loader,
            _scroll: scroll,
            _pointer_gate: pointer_gate,
            _capabilities: capabilities,
            _magnets: magnets,
            _hero: hero,
            _typewriters: typewriters,
            _reveals: reveals,
            _staggers: staggers,
            _grids: grids,
            _contact: contact,
        })
    }
}

fn mount_loader(
    document: &Document,
    config: &SiteConfig,
    frames: &Rc<dyn FrameScheduler>,
    timers: &Rc<dyn TimerScheduler>,
) -> Option<LoaderEffect> {
    let canvas = match OverlayCanvas::find(document, LOADER_ID) {
        Ok(canvas) => canvas,
        Err(err) => {
            console_warn!("loader skipped: {}", err);
            show_site(document);
            return None;
        }
    };
    let doc = document.clone();
    let loader = Loader::new(
        LoaderTimeline::from(&config.loader),
        ParticleCloud::new(config.loader.particles, page_seed()),
        move || show_site(&doc),
    );
    Some(LoaderEffect::start(Rc::clone(frames), Rc::clone(timers), Rc::new(canvas), loader))
}

fn mount_scroll(
    window: &Window,
    document: &Document,
    frames: &Rc<dyn FrameScheduler>,
) -> SiteResult<Option<(Rc<ScrollProgress>, Listener)>> {
    let Some(bar) = by_id::<HtmlElement>(document, SCROLL_BAR_ID) else {
        return Ok(None);
    };
    let progress = Rc::new(ScrollProgress::new(Rc::clone(frames), ElementSurface::new(bar)));
    let listener = {
        let progress = Rc::clone(&progress);
        let win = window.clone();
        let doc = document.clone();
        Listener::passive(window, "scroll", move |_| {
            let document_height = doc
                .document_element()
                .map_or(0.0, |root| f64::from(root.scroll_height()));
            let viewport_height = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            progress.on_scroll(ScrollSample {
                offset: win.scroll_y().unwrap_or(0.0),
                document_height,
                viewport_height,
            });
        })?
    };
    Ok(Some((progress, listener)))
}

/// Custom cursor plus spotlight, mounted only for fine pointers on wide
/// viewports.
pub struct PointerEffects {
    cursor: Rc<RefCell<CursorEffect>>,
    spotlight: SpotlightEffect,
    nodes: Vec<HtmlElement>,
    body: HtmlElement,
    hover: Option<Listener>,
}

fn overlay_node(document: &Document, body: &HtmlElement, class: &str) -> SiteResult<HtmlElement> {
    let node: HtmlElement = document
        .create_element("div")?
        .dyn_into()
        .map_err(|_| SiteError::Unsupported("HTMLElement"))?;
    node.set_class_name(class);
    let _ = node.set_attribute("aria-hidden", "true");
    body.append_child(&node)?;
    Ok(node)
}

impl PointerEffects {
    fn mount(
        document: &Document,
        frames: &Rc<dyn FrameScheduler>,
        pointer: &PointerSignal,
        settings: &PointerConfig,
    ) -> SiteResult<Self> {
        let body = document.body().ok_or_else(|| SiteError::MissingElement("body".into()))?;
        let spot = overlay_node(document, &body, "spotlight")?;
        let dot = overlay_node(document, &body, "cursor-dot")?;
        let ring = overlay_node(document, &body, "cursor-ring")?;
        let _ = body.class_list().add_1(CUSTOM_CURSOR_CLASS);

        let cursor = Rc::new(RefCell::new(CursorEffect::mount(
            Rc::clone(frames),
            pointer.clone(),
            ElementSurface::new(dot.clone()),
            ElementSurface::new(ring.clone()),
            settings.ring_factor,
        )));
        let spotlight = SpotlightEffect::mount(
            Rc::clone(frames),
            pointer.clone(),
            ElementSurface::new(spot.clone()),
            settings.spotlight_factor,
        );
        let hover = {
            let cursor = Rc::downgrade(&cursor);
            Listener::passive(document, "mouseover", move |event| {
                let over = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest(INTERACTIVE_SELECTOR).ok().flatten())
                    .is_some();
                if let Some(cursor) = cursor.upgrade() {
                    cursor.borrow().hover(over);
                }
            })?
        };

        Ok(Self {
            cursor,
            spotlight,
            nodes: vec![spot, dot, ring],
            body,
            hover: Some(hover),
        })
    }
}

impl Effect for PointerEffects {
    fn teardown(&mut self) {
        self.hover.take();
        self.cursor.borrow_mut().teardown();
        self.spotlight.teardown();
        for node in self.nodes.drain(..) {
            node.remove();
        }
        let _ = self.body.class_list().remove_1(CUSTOM_CURSOR_CLASS);
    }
}

/// A `.magnetic-btn` and its two listeners.
/// The listeners own the effect; it stops when they are dropped.
struct Magnet {
    _listeners: [Listener; 2],
}

impl Magnet {
    fn mount(
        element: HtmlElement,
        frames: &Rc<dyn FrameScheduler>,
        settings: &PointerConfig,
    ) -> SiteResult<Self> {
        let effect = Rc::new(MagneticEffect::new(
            Rc::clone(frames),
            ElementSurface::new(element.clone()),
            settings.magnetic_intensity,
            settings.magnetic_factor,
        ));
        let moved = {
            let effect = Rc::clone(&effect);
            let el = element.clone();
            Listener::passive(&element, "mousemove", move |event| {
                let Some(at) = client_point(&event) else {
                    return;
                };
                let rect = el.get_bounding_client_rect();
                let centre = Vec2::new(
                    rect.left() + rect.width() / 2.0,
                    rect.top() + rect.height() / 2.0,
                );
                effect.pointer_move(at, centre);
            })?
        };
        let left = {
            let effect = Rc::clone(&effect);
            Listener::passive(&element, "mouseleave", move |_| effect.pointer_leave())?
        };
        Ok(Self { _listeners: [moved, left] })
    }
}

/// `data-typewriter="first|second"`; `data-typewriter-cadence="name"` types
/// slower, `data-typewriter-loop="false"` stops after the last phrase.
fn mount_typewriter(
    element: HtmlElement,
    timers: &Rc<dyn TimerScheduler>,
) -> Option<TypewriterEffect> {
    let data = element.dataset();
    let phrases = data.get("typewriter")?;
    let cadence = match data.get("typewriterCadence").as_deref() {
        Some("name") => typewriter::NAME,
        _ => typewriter::PHRASES,
    };
    let looping = data.get("typewriterLoop").as_deref() != Some("false");
    let writer = Typewriter::new(phrases.split('|').map(str::trim), cadence, looping);
    Some(TypewriterEffect::start(Rc::clone(timers), ElementSurface::new(element), writer))
}

/// One `[data-grid]` container: cards are its children, the toggle is the
/// `[data-grid-toggle]` button next to it.
struct Grid {
    container: HtmlElement,
    toggle: Option<HtmlElement>,
    state: Cell<GridState>,
    stagger: Stagger,
}

impl Grid {
    fn cards(&self) -> Vec<HtmlElement> {
        let children = self.container.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn layout(&self, limits: &GridConfig) {
        let state = self.state.get();
        let visible = state.visible(limits);
        for (i, card) in self.cards().iter().enumerate() {
            card.set_hidden(i >= visible);
        }
        if let Some(toggle) = &self.toggle {
            toggle.set_hidden(!grid::has_toggle(state.breakpoint, state.total, limits));
            let label = grid::toggle_label(state.show_all, state.total - visible, state.breakpoint);
            toggle.set_text_content(Some(label.as_str()));
        }
    }
}

struct Grids {
    grids: Rc<Vec<Grid>>,
    _toggles: Vec<Listener>,
    _breakpoints: Vec<Listener>,
}

fn breakpoint(mobile: &MediaQueryList, desktop: &MediaQueryList) -> Breakpoint {
    Breakpoint::from_matches(mobile.matches(), desktop.matches())
}

impl Grids {
    fn mount(
        window: &Window,
        document: &Document,
        config: &SiteConfig,
        timers: &Rc<dyn TimerScheduler>,
    ) -> SiteResult<Option<Self>> {
        let containers = select_all(document, "[data-grid]")?;
        if containers.is_empty() {
            return Ok(None);
        }
        let mobile = query(window, MOBILE_QUERY)?;
        let desktop = query(window, DESKTOP_QUERY)?;
        let limits = config.grid.clone();

        let mut grids = Vec::with_capacity(containers.len());
        for container in containers {
            let toggle = container
                .parent_element()
                .and_then(|p| p.query_selector("[data-grid-toggle]").ok().flatten())
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            let state = GridState {
                breakpoint: breakpoint(&mobile, &desktop),
                show_all: false,
                total: container.child_element_count() as usize,
            };
            let stagger_container = container.clone();
            let grid = Grid {
                container,
                toggle,
                state: Cell::new(state),
                stagger: Stagger::mount(stagger_container, &config.reveal, Rc::clone(timers))?,
            };
            grid.layout(&limits);
            grid.stagger.refresh();
            grids.push(grid);
        }
        let grids = Rc::new(grids);

        let mut toggles = Vec::new();
        for (i, grid) in grids.iter().enumerate() {
            let Some(toggle) = &grid.toggle else {
                continue;
            };
            let all = Rc::clone(&grids);
            let limits = limits.clone();
            toggles.push(Listener::new(toggle, "click", move |_| {
                let grid = &all[i];
                let mut state = grid.state.get();
                state.toggle();
                grid.state.set(state);
                grid.layout(&limits);
                grid.stagger.refresh();
            })?);
        }

        let mut breakpoints = Vec::new();
        for list in [&mobile, &desktop] {
            let all = Rc::clone(&grids);
            let limits = limits.clone();
            let (m, d) = (mobile.clone(), desktop.clone());
            breakpoints.push(Listener::new(list, "change", move |_| {
                let now = breakpoint(&m, &d);
                for grid in all.iter() {
                    let mut state = grid.state.get();
                    if state.breakpoint != now {
                        state.breakpoint = now;
                        grid.state.set(state);
                        grid.layout(&limits);
                        grid.stagger.refresh();
                    }
                }
            })?);
        }

        Ok(Some(Self {
            grids,
            _toggles: toggles,
            _breakpoints: breakpoints,
        }))
    }

    fn len(&self) -> usize {
        self.grids.len()
    }
}
