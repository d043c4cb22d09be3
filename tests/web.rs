#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use portfolio_motion::motion::{Capabilities, TimerScheduler};
use portfolio_motion::wasm::host::{query, CapabilityWatch, Listener, WindowTimers};
use portfolio_motion::wasm::observe::Stagger;
use portfolio_motion::SiteConfig;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::Event;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn page_without_config_uses_defaults() {
    let cfg = SiteConfig::from_document(&document()).unwrap();
    assert_eq!(cfg, SiteConfig::default());
}

#[wasm_bindgen_test]
fn embedded_config_is_read() {
    let document = document();
    let script = document.create_element("script").unwrap();
    script.set_id("site-config");
    script.set_attribute("type", "application/json").unwrap();
    script.set_text_content(Some(r#"{ "loader": { "duration_ms": 900 } }"#));
    document.body().unwrap().append_child(&script).unwrap();

    let cfg = SiteConfig::from_document(&document).unwrap();
    script.remove();

    assert_eq!(cfg.loader.duration_ms, 900.0);
    assert_eq!(cfg.grid, SiteConfig::default().grid);
}

#[wasm_bindgen_test]
fn malformed_config_is_an_error() {
    let document = document();
    let script = document.create_element("script").unwrap();
    script.set_id("site-config");
    script.set_text_content(Some("{ not json"));
    document.body().unwrap().append_child(&script).unwrap();

    let result = SiteConfig::from_document(&document);
    script.remove();

    assert!(result.is_err());
}

fn on_screen_container(children: usize) -> web_sys::HtmlElement {
    let document = document();
    let container: web_sys::HtmlElement =
        document.create_element("div").unwrap().dyn_into().unwrap();
    container.style().set_property("height", "200px").unwrap();
    for _ in 0..children {
        let child = document.create_element("div").unwrap();
        child.set_text_content(Some("card"));
        container.append_child(&child).unwrap();
    }
    let body = document.body().unwrap();
    body.insert_before(&container, body.first_child().as_ref()).unwrap();
    container
}

fn revealed_children(container: &web_sys::HtmlElement) -> usize {
    let children = container.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter(|el| el.get_attribute("data-revealed").is_some())
        .count()
}

#[wasm_bindgen_test(async)]
async fn stagger_reveals_children_once_on_screen() {
    let container = on_screen_container(3);
    let timers: Rc<dyn TimerScheduler> = WindowTimers::new();
    let stagger = Stagger::mount(container.clone(), &SiteConfig::default().reveal, timers).unwrap();

    TimeoutFuture::new(600).await;
    assert_eq!(revealed_children(&container), 3);

    drop(stagger);
    container.remove();
}

#[wasm_bindgen_test(async)]
async fn dropped_stagger_never_fires() {
    let container = on_screen_container(3);
    let timers: Rc<dyn TimerScheduler> = WindowTimers::new();
    let stagger = Stagger::mount(container.clone(), &SiteConfig::default().reveal, timers).unwrap();
    drop(stagger);

    TimeoutFuture::new(600).await;
    assert_eq!(revealed_children(&container), 0);
    container.remove();
}

#[wasm_bindgen_test]
fn listener_is_removed_on_drop() {
    let target = document().create_element("div").unwrap();
    let hits = Rc::new(Cell::new(0));
    let listener = {
        let hits = Rc::clone(&hits);
        Listener::new(&target, "ping", move |_| hits.set(hits.get() + 1)).unwrap()
    };

    target.dispatch_event(&Event::new("ping").unwrap()).unwrap();
    assert_eq!(hits.get(), 1);

    drop(listener);
    target.dispatch_event(&Event::new("ping").unwrap()).unwrap();
    assert_eq!(hits.get(), 1);
}

#[wasm_bindgen_test]
fn capability_change_reruns_the_gate() {
    let window = web_sys::window().unwrap();
    let fine_pointer = query(&window, "(pointer: fine)").unwrap();
    let wide_viewport = query(&window, "(min-width: 1024px)").unwrap();
    let seen: Rc<RefCell<Vec<Capabilities>>> = Rc::default();

    let watch = {
        let seen = Rc::clone(&seen);
        CapabilityWatch::from_lists(fine_pointer.clone(), wide_viewport.clone(), move |caps| {
            seen.borrow_mut().push(caps)
        })
        .unwrap()
    };

    wide_viewport.dispatch_event(&Event::new("change").unwrap()).unwrap();
    assert_eq!(seen.borrow().as_slice(), &[watch.current()]);

    drop(watch);
    fine_pointer.dispatch_event(&Event::new("change").unwrap()).unwrap();
    assert_eq!(seen.borrow().len(), 1);
}
