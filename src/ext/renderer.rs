//! Renderer contract for extended payloads

use std::{fmt, io::Write, sync::Arc};

use super::builtin;

/// Plain function renderer
///
/// Receives the output sink and the payload bytes. The payload is only valid
/// for the duration of the call.
pub type RenderFn = fn(&mut dyn Write, &[u8]) -> std::io::Result<()>;

/// Stateful renderer stored in the registry
pub trait Renderer: Send + Sync {
    /// Write a human readable form of `payload` to `out`
    fn render(&self, out: &mut dyn Write, payload: &[u8]) -> std::io::Result<()>;

    /// Short name shown in registry listings
    fn name(&self) -> &str {
        "custom"
    }
}

/// Cached reference to a renderer
///
/// Cloning is cheap (a copy or a refcount bump), so every populated slot can
/// keep its own reference without touching the registry lock on the read path.
#[derive(Clone)]
pub enum RendererRef {
    /// Built-in hex dump
    HexDump,
    /// Built-in backtrace text
    Backtrace,
    /// Registered plain function, identified by its name
    Function {
        /// Registration key
        name: &'static str,
        /// Render callback
        render: RenderFn,
    },
    /// Registered trait object
    Shared(Arc<dyn Renderer>),
}

impl RendererRef {
    /// Render `payload` into `out`
    pub fn render(&self, out: &mut dyn Write, payload: &[u8]) -> std::io::Result<()> {
        match self {
            Self::HexDump => builtin::render_hex_dump(out, payload),
            Self::Backtrace => builtin::render_backtrace(out, payload),
            Self::Function { render, .. } => render(out, payload),
            Self::Shared(renderer) => renderer.render(out, payload),
        }
    }

    /// Named function renderer
    pub fn function(name: &'static str, render: RenderFn) -> Self {
        Self::Function { name, render }
    }

    /// Identity comparison used for idempotent registration
    ///
    /// Function renderers compare by name; their addresses are not unique,
    /// since identical bodies may be merged into one function.
    pub fn same_as(&self, other: &RendererRef) -> bool {
        match (self, other) {
            (Self::HexDump, Self::HexDump) | (Self::Backtrace, Self::Backtrace) => true,
            (Self::Function { name: a, .. }, Self::Function { name: b, .. }) => a == b,
            (Self::Shared(a), Self::Shared(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Self::HexDump => "hexdump",
            Self::Backtrace => "backtrace",
            Self::Function { name, .. } => *name,
            Self::Shared(renderer) => renderer.name(),
        }
    }
}

impl fmt::Debug for RendererRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function { name, .. } => write!(f, "RendererRef::Function({})", name),
            Self::Shared(renderer) => write!(f, "RendererRef::Shared({})", renderer.name()),
            other => write!(f, "RendererRef::{}", other.name()),
        }
    }
}

impl From<Arc<dyn Renderer>> for RendererRef {
    fn from(renderer: Arc<dyn Renderer>) -> Self {
        Self::Shared(renderer)
    }
}
