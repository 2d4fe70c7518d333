//! Extended ("rich") event payloads
//!
//! An event may carry an opaque payload tagged with an [`EventType`]. The
//! registry maps the type to a renderer that turns the bytes into text when
//! a buffer is dumped.

pub mod builtin;
pub mod registry;
pub mod renderer;
pub mod types;

pub use registry::{RendererEntry, RendererRegistry};
pub use renderer::{RenderFn, Renderer, RendererRef};
pub use types::EventType;
