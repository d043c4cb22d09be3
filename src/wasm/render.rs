use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlVertexArrayObject, Window,
};

use super::host::Listener;
use crate::effects::hero::{pack_vertices, HeroScene, Projection, FLOATS_PER_VERTEX, FOV_DEGREES};
use crate::error::{SiteError, SiteResult};
use crate::motion::{Effect, Flow, FrameDriver, FrameScheduler, PointerSignal, Vec2};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec4 a_pos;
layout(location = 1) in vec4 a_color;
out vec4 v_color;
void main() {
    gl_Position = vec4(a_pos.xyz, 1.0);
    gl_PointSize = a_pos.w;
    v_color = a_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec4 v_color;
out vec4 outColor;
void main() {
    vec2 d = gl_PointCoord - vec2(0.5);
    float r = dot(d, d) * 4.0;
    if (r > 1.0) discard;
    outColor = vec4(v_color.rgb, v_color.a * (1.0 - r));
}
"#;

fn compile(gl: &GL, kind: u32, source: &str) -> SiteResult<WebGlShader> {
    let shader = gl.create_shader(kind).ok_or(SiteError::Unsupported("WebGL2 shaders"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(SiteError::Js(gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}

fn link(gl: &GL) -> SiteResult<WebGlProgram> {
    let vs = compile(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
    let program = gl.create_program().ok_or(SiteError::Unsupported("WebGL2 programs"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(SiteError::Js(gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    projection: Projection,
    pixel_ratio: f64,
    scratch: Vec<f32>,
}

impl Renderer {
    fn new(canvas: HtmlCanvasElement) -> SiteResult<Self> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or(SiteError::Unsupported("WebGL2"))?
            .dyn_into()?;
        let program = link(&gl)?;
        let vao = gl.create_vertex_array().ok_or(SiteError::Unsupported("vertex arrays"))?;
        let buffer = gl.create_buffer().ok_or(SiteError::Unsupported("WebGL2 buffers"))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let stride = (FLOATS_PER_VERTEX * 4) as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 4, GL::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 4, GL::FLOAT, false, stride, 16);
        gl.bind_vertex_array(None);

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);

        Ok(Self {
            gl,
            canvas,
            program,
            vao,
            buffer,
            projection: Projection::new(1.0, 1.0, FOV_DEGREES),
            pixel_ratio: 1.0,
            scratch: Vec::new(),
        })
    }

    /// Match the drawing buffer to the canvas' CSS size, capped at 1.5x DPR.
    fn resize(&mut self, window: &Window) {
        let css_w = f64::from(self.canvas.client_width().max(1));
        let css_h = f64::from(self.canvas.client_height().max(1));
        self.pixel_ratio = window.device_pixel_ratio().clamp(1.0, 1.5);
        let w = (css_w * self.pixel_ratio) as u32;
        let h = (css_h * self.pixel_ratio) as u32;
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.gl.viewport(0, 0, w as i32, h as i32);
        self.projection.resize(css_w, css_h);
    }

    fn draw(&mut self, scene: &mut HeroScene, seconds: f64, pointer: Vec2) {
        let vertices = scene.frame(seconds, pointer);
        let count = pack_vertices(&vertices, &self.projection, self.pixel_ratio, &mut self.scratch);

        let gl = &self.gl;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffer));
        let data = js_sys::Float32Array::from(self.scratch.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::DYNAMIC_DRAW);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::POINTS, 0, count as i32);
        gl.bind_vertex_array(None);
    }
}

/// The hero backdrop. Runs every frame while mounted; dropping it stops the
/// loop and the resize listener.
pub struct HeroRender {
    driver: FrameDriver,
    _resize: Listener,
}

impl HeroRender {
    pub fn start(
        window: &Window,
        canvas: HtmlCanvasElement,
        frames: Rc<dyn FrameScheduler>,
        pointer: PointerSignal,
        scene: HeroScene,
    ) -> SiteResult<Self> {
        let renderer = Rc::new(RefCell::new(Renderer::new(canvas)?));
        renderer.borrow_mut().resize(window);

        let resize = {
            let renderer = Rc::clone(&renderer);
            let win = window.clone();
            Listener::passive(window, "resize", move |_| renderer.borrow_mut().resize(&win))?
        };

        let viewport = {
            let window = window.clone();
            move || {
                let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                (w.max(1.0), h.max(1.0))
            }
        };

        let mut scene = scene;
        let mut origin: Option<f64> = None;
        let driver = FrameDriver::start(frames, move |ts| {
            let start = *origin.get_or_insert(ts);
            let (w, h) = viewport();
            let p = pointer.read();
            // page pixels to normalised device coordinates, +y up
            let ndc = Vec2::new(
                (p.x / w * 2.0 - 1.0).clamp(-1.0, 1.0),
                (1.0 - p.y / h * 2.0).clamp(-1.0, 1.0),
            );
            renderer.borrow_mut().draw(&mut scene, (ts - start) / 1000.0, ndc);
            Flow::Continue
        });
        Ok(Self { driver, _resize: resize })
    }
}

impl Effect for HeroRender {
    fn teardown(&mut self) {
        self.driver.cancel();
    }
}
