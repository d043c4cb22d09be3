//! Page effects built on the `motion` primitives. Each one is host-agnostic;
//! the browser bindings live in `wasm`.

pub mod cursor;
pub mod grid;
pub mod hero;
pub mod loader;
pub mod magnetic;
pub mod scroll;
pub mod spotlight;
pub mod typewriter;

pub use cursor::CursorEffect;
pub use hero::HeroScene;
pub use loader::{Loader, LoaderCanvas, LoaderEffect};
pub use magnetic::MagneticEffect;
pub use scroll::ScrollProgress;
pub use spotlight::SpotlightEffect;
pub use typewriter::{TextSink, Typewriter, TypewriterEffect};
