//! Contact form: validation, the EmailJS request, and the submit flow.
//!
//! The controller talks to the page only through [`ContactView`] and sends
//! mail only through [`Mailer`], so the whole flow runs on the host in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::Serialize;
use thiserror::Error;

use crate::config::ContactConfig;
use crate::motion::{TimerGuard, TimerScheduler};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// The form control's `name` attribute.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
/// with something on either side.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl ContactFields {
    /// Every failing field, in form order. At most one error per field.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let blank = |s: &str| s.trim().is_empty();

        if blank(&self.name) {
            errors.push(FieldError::new(Field::Name, "Name is required"));
        } else if self.name.chars().count() < 2 {
            errors.push(FieldError::new(Field::Name, "Min 2 chars"));
        }

        if blank(&self.email) {
            errors.push(FieldError::new(Field::Email, "Email is required"));
        } else if !is_email(&self.email) {
            errors.push(FieldError::new(Field::Email, "Invalid email"));
        }

        if blank(&self.subject) {
            errors.push(FieldError::new(Field::Subject, "Subject is required"));
        }

        if blank(&self.message) {
            errors.push(FieldError::new(Field::Message, "Message is required"));
        } else if self.message.chars().count() < 10 {
            errors.push(FieldError::new(Field::Message, "Min 10 chars"));
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("EmailJS credentials missing: set EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY")]
    MissingConfig,
    /// The service answered with a non-success status; `text` is its body.
    #[error("{text}")]
    Service { status: u16, text: String },
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub endpoint: String,
}

impl TryFrom<&ContactConfig> for EmailJsConfig {
    type Error = ContactError;

    fn try_from(cfg: &ContactConfig) -> Result<Self, ContactError> {
        let pick = |v: &Option<String>| {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
        };
        match (pick(&cfg.service_id), pick(&cfg.template_id), pick(&cfg.public_key)) {
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(Self {
                service_id,
                template_id,
                public_key,
                endpoint: cfg.endpoint.clone(),
            }),
            _ => Err(ContactError::MissingConfig),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub name: String,
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub message: String,
}

/// Body of the EmailJS `send` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRequest {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
}

impl EmailRequest {
    pub fn new(config: &EmailJsConfig, fields: &ContactFields) -> Self {
        Self {
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            user_id: config.public_key.clone(),
            template_params: TemplateParams {
                name: fields.name.clone(),
                from_name: fields.name.clone(),
                from_email: fields.email.clone(),
                subject: fields.subject.clone(),
                message: fields.message.clone(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, ContactError> {
        serde_json::to_string(self).map_err(|e| ContactError::Transport(e.to_string()))
    }
}

pub trait Mailer {
    fn send<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a EmailRequest,
    ) -> LocalBoxFuture<'a, Result<(), ContactError>>;
}

/// The page side of the form.
pub trait ContactView {
    fn show_errors(&self, errors: &[FieldError]);
    fn set_submitting(&self, on: bool);
    fn show_sent(&self, on: bool);
    /// Clear every field.
    fn clear(&self);
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(Vec<FieldError>),
    /// Carries the alert text shown to the user.
    Failed(String),
    Sent,
    /// Another submission is still in flight.
    Busy,
}

pub fn failure_text(err: &ContactError) -> String {
    format!("Failed to send: {}", err)
}

pub struct ContactController {
    config: ContactConfig,
    mailer: Rc<dyn Mailer>,
    view: Rc<dyn ContactView>,
    timers: Rc<dyn TimerScheduler>,
    in_flight: Cell<bool>,
    reset: Rc<RefCell<Option<TimerGuard>>>,
}

/// Clears the in-flight flag however the submit future ends.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ContactController {
    pub fn new(
        config: ContactConfig,
        mailer: Rc<dyn Mailer>,
        view: Rc<dyn ContactView>,
        timers: Rc<dyn TimerScheduler>,
    ) -> Self {
        Self {
            config,
            mailer,
            view,
            timers,
            in_flight: Cell::new(false),
            reset: Rc::new(RefCell::new(None)),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    pub async fn submit(&self, fields: ContactFields) -> SubmitOutcome {
        if self.in_flight.get() {
            return SubmitOutcome::Busy;
        }
        let errors = fields.validate();
        self.view.show_errors(&errors);
        if !errors.is_empty() {
            return SubmitOutcome::Invalid(errors);
        }

        self.in_flight.set(true);
        let _flight = InFlight(&self.in_flight);
        self.view.set_submitting(true);
        let result = self.send(&fields).await;
        self.view.set_submitting(false);

        match result {
            Ok(()) => {
                self.view.show_sent(true);
                self.schedule_reset();
                SubmitOutcome::Sent
            }
            Err(err) => {
                console_error!("EmailJS error: {}", err);
                let text = failure_text(&err);
                self.view.alert(&text);
                SubmitOutcome::Failed(text)
            }
        }
    }

    async fn send(&self, fields: &ContactFields) -> Result<(), ContactError> {
        let config = EmailJsConfig::try_from(&self.config)?;
        let request = EmailRequest::new(&config, fields);
        self.mailer.send(&config.endpoint, &request).await
    }

    fn schedule_reset(&self) {
        let view = Rc::clone(&self.view);
        let slot = Rc::downgrade(&self.reset);
        let delay = self.config.reset_after_ms;
        let guard = TimerGuard::schedule(Rc::clone(&self.timers), delay, move || {
            view.clear();
            view.show_sent(false);
            if let Some(slot) = slot.upgrade() {
                slot.borrow_mut().take();
            }
        });
        *self.reset.borrow_mut() = Some(guard);
    }
}
