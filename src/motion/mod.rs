//! The animation-timing layer: interpolation, input sampling, frame and timer
//! scheduling, capability gating and reveal bookkeeping. Nothing in here
//! touches the DOM directly; browser implementations of the host traits live
//! in `crate::wasm`.

pub mod frame;
pub mod gate;
pub mod lerp;
pub mod reveal;
pub mod signal;
pub mod surface;
pub mod timer;

pub use frame::{Flow, FrameDriver, FrameScheduler, FrameToken};
pub use gate::{Capabilities, CapabilityGate, Effect};
pub use lerp::{lerp, Trail, Vec2};
pub use signal::{PointerSignal, ScrollSample, ScrollSignal, SignalSlot};
pub use surface::{translate, write_style, Surface};
pub use timer::{TimerGuard, TimerScheduler, TimerToken};
