//! 2D-canvas painter for the intro loader overlay.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::effects::loader::{LoaderFrame, CANVAS_SIZE, TEAL};
use crate::effects::LoaderCanvas;
use crate::error::{SiteError, SiteResult};

const BACKGROUND: &str = "#08080e";
const MONOGRAM: &str = "RG";

pub struct OverlayCanvas {
    overlay: HtmlElement,
    ctx: CanvasRenderingContext2d,
}

impl OverlayCanvas {
    /// `overlay_id` is the fixed full-screen container; the canvas is its
    /// first `<canvas>` child.
    pub fn find(document: &Document, overlay_id: &str) -> SiteResult<Self> {
        let overlay: HtmlElement = document
            .get_element_by_id(overlay_id)
            .ok_or_else(|| SiteError::MissingElement(overlay_id.to_string()))?
            .dyn_into()
            .map_err(|_| SiteError::MissingElement(overlay_id.to_string()))?;
        let canvas: HtmlCanvasElement = overlay
            .query_selector("canvas")?
            .ok_or_else(|| SiteError::MissingElement(format!("#{overlay_id} canvas")))?
            .dyn_into()
            .map_err(|_| SiteError::MissingElement(format!("#{overlay_id} canvas")))?;
        canvas.set_width(CANVAS_SIZE);
        canvas.set_height(CANVAS_SIZE);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(SiteError::Unsupported("canvas 2d"))?
            .dyn_into()?;
        Ok(Self { overlay, ctx })
    }

    fn fill(&self, style: &str) {
        self.ctx.set_fill_style(&JsValue::from_str(style));
    }

    fn glow(&self, x: f64, y: f64, radius: f64, stops: &[(f32, String)]) {
        if radius <= 0.0 {
            return;
        }
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius) else {
            return;
        };
        for (offset, colour) in stops {
            let _ = gradient.add_color_stop(*offset, colour);
        }
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, radius, 0.0, TAU);
        self.ctx.set_fill_style(&gradient);
        self.ctx.fill();
    }
}

impl LoaderCanvas for OverlayCanvas {
    fn paint(&self, frame: &LoaderFrame) {
        let size = f64::from(CANVAS_SIZE);
        let (cx, cy) = (size / 2.0, size / 2.0);
        let ctx = &self.ctx;

        ctx.clear_rect(0.0, 0.0, size, size);
        self.fill(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, size, size);

        if let Ok(halo) = ctx.create_radial_gradient(cx, cy, 20.0, cx, cy, 160.0) {
            let _ = halo.add_color_stop(0.0, &TEAL.rgba(frame.halo_alpha + 0.05));
            let _ = halo.add_color_stop(1.0, "transparent");
            ctx.set_fill_style(&halo);
            ctx.fill_rect(0.0, 0.0, size, size);
        }

        for p in &frame.particles {
            self.glow(
                p.screen.x,
                p.screen.y,
                p.size * 2.5,
                &[(0.0, p.color.rgba(p.alpha)), (1.0, p.color.rgba(0.0))],
            );
        }

        let core = 12.0 * frame.collapse;
        self.glow(
            cx,
            cy,
            core * 4.0,
            &[
                (0.0, TEAL.rgba(0.9 * frame.collapse)),
                (0.3, TEAL.rgba(0.4 * frame.collapse)),
                (1.0, "transparent".to_string()),
            ],
        );

        ctx.save();
        ctx.set_global_alpha(frame.mark_alpha);
        ctx.set_font("bold 52px Inter, sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let mark = ctx.create_linear_gradient(cx - 40.0, cy, cx + 40.0, cy);
        let _ = mark.add_color_stop(0.0, "#00ffc8");
        let _ = mark.add_color_stop(1.0, "#ff4da6");
        ctx.set_fill_style(&mark);
        ctx.set_shadow_color("#00ffc8");
        ctx.set_shadow_blur(20.0);
        let _ = ctx.fill_text(MONOGRAM, cx, cy + 4.0);
        ctx.restore();

        ctx.save();
        ctx.set_global_alpha(frame.label_alpha);
        ctx.set_font("13px JetBrains Mono, monospace");
        ctx.set_text_align("center");
        self.fill("rgba(0,255,200,0.7)");
        let _ = ctx.fill_text("LOADING", cx, size - 56.0);
        let _ = ctx.fill_text(&".".repeat(frame.dots), cx + 46.0, size - 56.0);
        ctx.restore();
    }

    fn begin_exit(&self, transition: &str) {
        let style = self.overlay.style();
        let _ = style.set_property("transition", transition);
        let _ = style.set_property("opacity", "0");
        let _ = style.set_property("transform", "scale(1.04)");
    }

    fn remove(&self) {
        self.overlay.remove();
    }
}
