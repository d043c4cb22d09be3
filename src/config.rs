//! Site tuning values.
//!
//! Defaults are compiled in. EmailJS credentials can be injected at build time
//! through `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID` and `EMAILJS_PUBLIC_KEY`,
//! and any field can be overridden at runtime by a JSON document embedded in
//! the page as `<script type="application/json" id="site-config">`.

use serde::Deserialize;

use crate::error::SiteResult;

/// Id of the `<script>` element holding runtime overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub loader: LoaderConfig,
    pub reveal: RevealSettings,
    pub pointer: PointerConfig,
    pub grid: GridConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub duration_ms: f64,
    pub exit_ms: u32,
    /// Slack after the exit transition before completion is signalled.
    pub exit_grace_ms: u32,
    pub particles: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    pub threshold: f64,
    pub root_margin: String,
    pub stagger_ms: u32,
    pub stagger_threshold: f64,
    pub stagger_root_margin: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Effects that follow the pointer need at least this viewport width.
    pub min_width_px: u32,
    pub ring_factor: f64,
    pub spotlight_factor: f64,
    pub magnetic_factor: f64,
    pub magnetic_intensity: f64,
    pub parallax_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub mobile_visible: usize,
    pub desktop_visible: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    pub endpoint: String,
    pub reset_after_ms: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            reveal: RevealSettings::default(),
            pointer: PointerConfig::default(),
            grid: GridConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2200.0,
            exit_ms: 600,
            exit_grace_ms: 50,
            particles: 120,
        }
    }
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -60px 0px".to_string(),
            stagger_ms: 90,
            stagger_threshold: 0.05,
            stagger_root_margin: "0px 0px 60px 0px".to_string(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            min_width_px: 1024,
            ring_factor: 0.12,
            spotlight_factor: 0.18,
            magnetic_factor: 0.12,
            magnetic_intensity: 0.25,
            parallax_factor: 0.04,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            mobile_visible: 3,
            desktop_visible: 6,
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            service_id: build_env(option_env!("EMAILJS_SERVICE_ID")),
            template_id: build_env(option_env!("EMAILJS_TEMPLATE_ID")),
            public_key: build_env(option_env!("EMAILJS_PUBLIC_KEY")),
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            reset_after_ms: 4000,
        }
    }
}

fn build_env(value: Option<&'static str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SiteConfig {
    /// Parse runtime overrides on top of the defaults. Blank input yields the
    /// defaults unchanged.
    pub fn from_json(raw: &str) -> SiteResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Read the embedded config element; a page without one uses defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn from_document(document: &web_sys::Document) -> SiteResult<Self> {
        match document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_is_default() {
        assert_eq!(SiteConfig::from_json("  ").unwrap(), SiteConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = SiteConfig::from_json(
            r#"{ "loader": { "duration_ms": 1500 }, "reveal": { "stagger_ms": 120 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.loader.duration_ms, 1500.0);
        assert_eq!(cfg.loader.exit_ms, 600);
        assert_eq!(cfg.reveal.stagger_ms, 120);
        assert_eq!(cfg.pointer.min_width_px, 1024);
    }

    #[test]
    fn contact_credentials_override() {
        let cfg = SiteConfig::from_json(
            r#"{ "contact": { "service_id": "svc", "template_id": "tpl", "public_key": "pk" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.contact.service_id.as_deref(), Some("svc"));
        assert_eq!(cfg.contact.reset_after_ms, 4000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SiteConfig::from_json("{ loader: }").is_err());
    }

    #[test]
    fn blank_build_env_is_ignored() {
        assert_eq!(build_env(Some("  ")), None);
        assert_eq!(build_env(Some(" abc ")), Some("abc".to_string()));
    }
}
