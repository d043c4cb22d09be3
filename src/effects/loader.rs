//! Intro loader: a rotating particle sphere that collapses into its core,
//! followed by a fade of the overlay and a single completion signal.
//!
//! Progress is elapsed time since the first painted frame over a fixed
//! duration, so a slow device sees the same pacing with fewer frames.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::LoaderConfig;
use crate::motion::{Flow, FrameDriver, FrameScheduler, TimerGuard, TimerScheduler, Vec2};

/// Radians per millisecond (0.006 rad per 60 Hz frame).
const ANGULAR_VELOCITY: f64 = 0.006 * 60.0 / 1000.0;
const COLLAPSE_START: f64 = 0.75;
const DOT_PERIOD_MS: f64 = 400.0;

pub const CANVAS_SIZE: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderTimeline {
    pub duration_ms: f64,
    pub exit_ms: u32,
    pub exit_grace_ms: u32,
}

impl From<&LoaderConfig> for LoaderTimeline {
    fn from(cfg: &LoaderConfig) -> Self {
        Self {
            duration_ms: cfg.duration_ms,
            exit_ms: cfg.exit_ms,
            exit_grace_ms: cfg.exit_grace_ms,
        }
    }
}

impl LoaderTimeline {
    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Delay between the last frame and the completion callback. Always
    /// longer than the exit transition itself.
    pub fn completion_delay_ms(&self) -> u32 {
        self.exit_ms.saturating_add(self.exit_grace_ms.max(1))
    }

    /// CSS `transition` value for the overlay fade, timed to `exit_ms`.
    pub fn exit_transition(&self) -> String {
        let secs = f64::from(self.exit_ms) / 1000.0;
        format!("opacity {secs}s ease, transform {secs}s ease")
    }
}

/// Outer glow; peaks at the midpoint.
pub fn halo_alpha(progress: f64) -> f64 {
    (progress * PI).sin() * 0.15
}

/// Sphere radius multiplier: 1 until the final quarter, then linear to 0.
pub fn collapse_factor(progress: f64) -> f64 {
    if progress > COLLAPSE_START {
        (1.0 - (progress - COLLAPSE_START) / (1.0 - COLLAPSE_START)).max(0.0)
    } else {
        1.0
    }
}

/// Monogram opacity: in over the first fifth, out over the final third.
pub fn mark_alpha(progress: f64) -> f64 {
    if progress < 0.2 {
        progress / 0.2
    } else if progress > 0.7 {
        (1.0 - (progress - 0.7) / 0.3).max(0.0)
    } else {
        1.0
    }
}

/// "LOADING" caption opacity.
pub fn label_alpha(progress: f64) -> f64 {
    let alpha = if progress < 0.8 {
        (progress * 3.0).min(1.0)
    } else {
        (1.0 - progress) / 0.2
    };
    alpha.max(0.0)
}

pub fn dot_count(elapsed_ms: f64) -> usize {
    ((elapsed_ms.max(0.0) / DOT_PERIOD_MS).floor() as usize) % 4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const TEAL: Rgb = Rgb(0, 255, 200);
pub const PINK: Rgb = Rgb(255, 77, 166);

impl Rgb {
    /// CSS `rgba()` with the alpha clamped into `0..=1`.
    pub fn rgba(self, alpha: f64) -> String {
        format!("rgba({},{},{},{:.3})", self.0, self.1, self.2, alpha.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Unit-sphere position.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    pub size: f64,
    pub phase: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedParticle {
    pub screen: Vec2,
    /// -1 (far) ..= 1 (near).
    pub depth: f64,
    pub size: f64,
    pub alpha: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone)]
pub struct ParticleCloud {
    particles: Vec<Particle>,
}

impl ParticleCloud {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let particles = (0..count)
            .map(|_| {
                let theta = (2.0 * rng.gen::<f64>() - 1.0).acos();
                let phi = rng.gen::<f64>() * PI * 2.0;
                Particle {
                    x: theta.sin() * phi.cos(),
                    y: theta.sin() * phi.sin(),
                    z: theta.cos(),
                    radius: 90.0 + rng.gen::<f64>() * 30.0,
                    size: 1.0 + rng.gen::<f64>() * 2.0,
                    phase: rng.gen::<f64>() * PI * 2.0,
                    color: if rng.gen_bool(0.5) { TEAL } else { PINK },
                }
            })
            .collect();
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Rotate about the vertical axis, scale by radius and collapse, and
    /// sort far-to-near so nearer points are painted last.
    pub fn project(&self, angle: f64, progress: f64, centre: Vec2) -> Vec<ProjectedParticle> {
        let collapse = collapse_factor(progress);
        let mut out: Vec<ProjectedParticle> = self
            .particles
            .iter()
            .map(|p| {
                let a = angle + p.phase;
                let (sin, cos) = a.sin_cos();
                let x3 = p.x * cos - p.z * sin;
                let z3 = p.x * sin + p.z * cos;
                let r = p.radius * collapse;
                let depth_norm = (z3 + 1.0) / 2.0;
                ProjectedParticle {
                    screen: Vec2::new(centre.x + x3 * r, centre.y + p.y * r),
                    depth: z3,
                    size: p.size * (0.5 + depth_norm * 0.5) * collapse,
                    alpha: (0.3 + depth_norm * 0.7) * (1.0 - progress * 0.6),
                    color: p.color,
                }
            })
            .collect();
        out.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        out
    }
}

/// Everything needed to paint one loader frame.
#[derive(Debug, Clone)]
pub struct LoaderFrame {
    pub elapsed_ms: f64,
    pub progress: f64,
    pub halo_alpha: f64,
    pub collapse: f64,
    pub mark_alpha: f64,
    pub label_alpha: f64,
    pub dots: usize,
    pub particles: Vec<ProjectedParticle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoaderPhase {
    Waiting,
    Running { started_at: f64 },
    Exiting,
    Done,
}

#[derive(Debug, Clone)]
pub enum LoaderStep {
    Draw(LoaderFrame),
    /// Final frame; the exit transition starts now.
    Finish(LoaderFrame),
}

pub struct Loader {
    timeline: LoaderTimeline,
    cloud: ParticleCloud,
    centre: Vec2,
    phase: LoaderPhase,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Loader {
    pub fn new<F>(timeline: LoaderTimeline, cloud: ParticleCloud, on_complete: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let half = f64::from(CANVAS_SIZE) / 2.0;
        Self {
            timeline,
            cloud,
            centre: Vec2::new(half, half),
            phase: LoaderPhase::Waiting,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn phase(&self) -> LoaderPhase {
        self.phase
    }

    pub fn timeline(&self) -> LoaderTimeline {
        self.timeline
    }

    /// Advance to the frame at `ts`. Returns `None` once exiting.
    pub fn frame(&mut self, ts: f64) -> Option<LoaderStep> {
        let started_at = match self.phase {
            LoaderPhase::Waiting => {
                self.phase = LoaderPhase::Running { started_at: ts };
                ts
            }
            LoaderPhase::Running { started_at } => started_at,
            LoaderPhase::Exiting | LoaderPhase::Done => return None,
        };
        let elapsed = (ts - started_at).max(0.0);
        let progress = self.timeline.progress(elapsed);
        let frame = LoaderFrame {
            elapsed_ms: elapsed,
            progress,
            halo_alpha: halo_alpha(progress),
            collapse: collapse_factor(progress),
            mark_alpha: mark_alpha(progress),
            label_alpha: label_alpha(progress),
            dots: dot_count(elapsed),
            particles: self.cloud.project(elapsed * ANGULAR_VELOCITY, progress, self.centre),
        };
        if progress >= 1.0 {
            self.phase = LoaderPhase::Exiting;
            Some(LoaderStep::Finish(frame))
        } else {
            Some(LoaderStep::Draw(frame))
        }
    }

    /// Fire the completion callback. Only the first call after the exit has
    /// begun does anything.
    pub fn complete(&mut self) -> bool {
        if self.phase != LoaderPhase::Exiting {
            return false;
        }
        self.phase = LoaderPhase::Done;
        match self.on_complete.take() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

/// The drawing side of the loader.
pub trait LoaderCanvas {
    fn paint(&self, frame: &LoaderFrame);
    /// Start the overlay's exit transition with the given CSS `transition`.
    fn begin_exit(&self, transition: &str);
    /// Take the overlay out of the page.
    fn remove(&self);
}

/// Runs a [`Loader`] against a canvas until it has completed.
pub struct LoaderEffect {
    driver: FrameDriver,
    exit: Rc<RefCell<Option<TimerGuard>>>,
    loader: Rc<RefCell<Loader>>,
}

impl LoaderEffect {
    pub fn start(
        frames: Rc<dyn FrameScheduler>,
        timers: Rc<dyn TimerScheduler>,
        canvas: Rc<dyn LoaderCanvas>,
        loader: Loader,
    ) -> Self {
        let loader = Rc::new(RefCell::new(loader));
        let exit: Rc<RefCell<Option<TimerGuard>>> = Rc::new(RefCell::new(None));
        let driver = {
            let loader = Rc::clone(&loader);
            let exit = Rc::clone(&exit);
            FrameDriver::start(frames, move |ts| {
                let step = loader.borrow_mut().frame(ts);
                match step {
                    Some(LoaderStep::Draw(frame)) => {
                        canvas.paint(&frame);
                        Flow::Continue
                    }
                    Some(LoaderStep::Finish(frame)) => {
                        canvas.paint(&frame);
                        let timeline = loader.borrow().timeline();
                        canvas.begin_exit(&timeline.exit_transition());
                        let delay = timeline.completion_delay_ms();
                        let loader = Rc::clone(&loader);
                        let canvas = Rc::clone(&canvas);
                        let guard = TimerGuard::schedule(Rc::clone(&timers), delay, move || {
                            canvas.remove();
                            loader.borrow_mut().complete();
                        });
                        *exit.borrow_mut() = Some(guard);
                        Flow::Stop
                    }
                    None => Flow::Stop,
                }
            })
        };
        Self { driver, exit, loader }
    }

    pub fn phase(&self) -> LoaderPhase {
        self.loader.borrow().phase()
    }

    /// Abandon the loader (page unload); the completion callback never fires.
    pub fn cancel(&self) {
        self.driver.cancel();
        if let Some(guard) = self.exit.borrow_mut().take() {
            guard.clear();
        }
    }
}
