//! Browser side of the contact form: EmailJS over `fetch`, and the form
//! markup as a [`ContactView`].

use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Event, Headers, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement,
    Request, RequestInit, RequestMode, Response,
};

use super::host::Listener;
use crate::config::ContactConfig;
use crate::contact::{
    ContactController, ContactError, ContactFields, ContactView, EmailRequest, Field, FieldError,
    Mailer,
};
use crate::error::{describe_js, SiteError, SiteResult};
use crate::motion::TimerScheduler;

const SENDING_LABEL: &str = "Sending...";

fn transport(err: JsValue) -> ContactError {
    ContactError::Transport(describe_js(&err))
}

/// POSTs the request as JSON to the EmailJS REST endpoint.
pub struct FetchMailer;

impl FetchMailer {
    async fn post(endpoint: &str, request: &EmailRequest) -> Result<(), ContactError> {
        let body = request.to_json()?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        let headers = Headers::new().map_err(transport)?;
        headers.append("Content-Type", "application/json").map_err(transport)?;
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(&body));
        let request = Request::new_with_str_and_init(endpoint, &opts).map_err(transport)?;

        let window = web_sys::window()
            .ok_or_else(|| ContactError::Transport(SiteError::NoWindow.to_string()))?;
        let resp: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;
        if resp.ok() {
            return Ok(());
        }

        // EmailJS explains failures in a plain-text body.
        let text = match resp.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        Err(ContactError::Service {
            status: resp.status(),
            text: if text.is_empty() { resp.status_text() } else { text },
        })
    }
}

impl Mailer for FetchMailer {
    fn send<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a EmailRequest,
    ) -> LocalBoxFuture<'a, Result<(), ContactError>> {
        Self::post(endpoint, request).boxed_local()
    }
}

/// `#contact-form` with `[data-error-for=<field>]` messages, a submit
/// button, and a `[data-contact-sent]` confirmation panel.
pub struct FormView {
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
    sent: Option<HtmlElement>,
    label: String,
}

impl FormView {
    pub fn new(form: HtmlFormElement) -> Self {
        let button = form
            .query_selector("button[type=submit]")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok());
        let sent = form
            .parent_element()
            .and_then(|p| p.query_selector("[data-contact-sent]").ok().flatten())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let label = button.as_ref().and_then(|b| b.text_content()).unwrap_or_default();
        Self { form, button, sent, label }
    }

    fn control(&self, field: Field) -> Option<HtmlElement> {
        self.form
            .query_selector(&format!("[name={}]", field.key()))
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn value(&self, field: Field) -> String {
        let Some(el) = self.control(field) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    pub fn fields(&self) -> ContactFields {
        ContactFields {
            name: self.value(Field::Name),
            email: self.value(Field::Email),
            subject: self.value(Field::Subject),
            message: self.value(Field::Message),
        }
    }
}

impl ContactView for FormView {
    fn show_errors(&self, errors: &[FieldError]) {
        for field in Field::ALL {
            let error = errors.iter().find(|e| e.field == field);
            if let Some(control) = self.control(field) {
                let _ = control.class_list().toggle_with_force("error", error.is_some());
            }
            let slot = self
                .form
                .query_selector(&format!("[data-error-for={}]", field.key()))
                .ok()
                .flatten();
            if let Some(slot) = slot {
                slot.set_text_content(error.map(|e| e.message));
            }
        }
    }

    fn set_submitting(&self, on: bool) {
        if let Some(button) = &self.button {
            button.set_disabled(on);
            button.set_text_content(Some(if on { SENDING_LABEL } else { self.label.as_str() }));
        }
    }

    fn show_sent(&self, on: bool) {
        if let Some(sent) = &self.sent {
            sent.set_hidden(!on);
            self.form.set_hidden(on);
        }
    }

    fn clear(&self) {
        self.form.reset();
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

/// Keeps the submit listener alive.
pub struct ContactForm {
    _submit: Listener,
}

impl ContactForm {
    pub fn mount(
        form: HtmlFormElement,
        config: ContactConfig,
        timers: Rc<dyn TimerScheduler>,
    ) -> SiteResult<Self> {
        let view = Rc::new(FormView::new(form.clone()));
        let mailer = Rc::new(FetchMailer);
        let controller = Rc::new(ContactController::new(config, mailer, view.clone(), timers));
        let submit = Listener::new(&form, "submit", move |event: Event| {
            event.prevent_default();
            let controller = Rc::clone(&controller);
            let fields = view.fields();
            spawn_local(async move {
                controller.submit(fields).await;
            });
        })?;
        Ok(Self { _submit: submit })
    }
}
