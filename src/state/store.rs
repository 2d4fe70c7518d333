//! Buffer registry and global logging state

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, RwLockReadGuard,
        RwLockWriteGuard,
    },
    thread::{self, ThreadId},
};

use crate::{
    context,
    error::{RingLogError, Result},
    event::Event,
    ext::{builtin, EventType, RenderFn, Renderer, RendererRegistry},
    ringbuf::{BufferSnapshot, BufferStatus, RingBuffer},
    sync::SpinLock,
    BufferId,
};

use super::{
    config::StoreConfig,
    lock::{AtomicLockState, GlobalLockGuard, LockState},
};

/// Buffer an event is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// The current default buffer
    #[default]
    Default,
    /// A specific buffer
    Buffer(BufferId),
}

impl From<BufferId> for Target {
    fn from(id: BufferId) -> Self {
        Self::Buffer(id)
    }
}

#[derive(Debug)]
struct BufferTable {
    slots: Vec<Option<Arc<RingBuffer>>>,
    default: Option<BufferId>,
}

impl BufferTable {
    fn get(&self, id: BufferId) -> Option<&Arc<RingBuffer>> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    fn present(&self) -> impl Iterator<Item = (BufferId, &Arc<RingBuffer>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|buffer| (id, buffer)))
    }
}

/// Set of ring buffers plus the state shared by every writer
///
/// A store starts uninitialized; [`init`](Self::init) makes it accept
/// events and [`cleanup`](Self::cleanup) returns it to the initial state.
/// Structural changes go through the global lock, writers only take the
/// lock of the buffer they write to.
#[derive(Debug)]
pub struct LogStore {
    config: StoreConfig,
    state: AtomicLockState,
    enabled: AtomicBool,
    global: SpinLock,
    owner: Mutex<Option<ThreadId>>,
    table: RwLock<BufferTable>,
    renderers: RendererRegistry,
}

impl LogStore {
    /// Create an uninitialized store with the default configuration
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// Create an uninitialized store with a custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        let renderers = RendererRegistry::new(config.renderer_capacity);
        let slots = vec![None; config.max_buffers];
        Self {
            config,
            state: AtomicLockState::new(LockState::Uninitialized),
            enabled: AtomicBool::new(false),
            global: SpinLock::new(),
            owner: Mutex::new(None),
            table: RwLock::new(BufferTable {
                slots,
                default: None,
            }),
            renderers,
        }
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Size of the buffer table
    pub fn max_buffers(&self) -> usize {
        self.config.max_buffers
    }

    /// Renderer registry
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    fn table(&self) -> RwLockReadGuard<'_, BufferTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn table_mut(&self) -> RwLockWriteGuard<'_, BufferTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn owner(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- lifecycle -------------------------------------------------------

    /// Initialize the store
    ///
    /// Installs the built-in renderers, creates the default buffer when
    /// `default_capacity` is non-zero (clamped to the per-buffer bound) and
    /// enables logging.
    pub fn init(&self, default_capacity: usize) -> Result<()> {
        if self.is_initialized() {
            return Err(RingLogError::AlreadyInitialized);
        }
        let _global = self.global.guard();
        if self.is_initialized() {
            return Err(RingLogError::AlreadyInitialized);
        }

        self.renderers.install_builtins();

        if default_capacity > 0 {
            let capacity = self.config.clamp_capacity(default_capacity);
            let buffer = RingBuffer::new(capacity)?;
            let mut table = self.table_mut();
            table.slots[0] = Some(Arc::new(buffer));
            table.default = Some(0);
        }

        self.enabled.store(true, Ordering::SeqCst);
        self.state.store(LockState::Unlocked);
        log::debug!(
            "Log store initialized (default capacity {}, {} buffer slots)",
            default_capacity,
            self.config.max_buffers
        );
        Ok(())
    }

    /// Whether [`init`](Self::init) has run and no cleanup followed
    pub fn is_initialized(&self) -> bool {
        self.state.load().is_initialized()
    }

    /// Current lock state
    pub fn lock_state(&self) -> LockState {
        self.state.load()
    }

    /// Take the global lock
    ///
    /// A full lock also disables logging and holds every buffer lock until
    /// the guard drops. Meanwhile the holding thread can still snapshot and
    /// reset buffers through the store, which works on the locks it holds.
    /// Taking the lock again on the thread that already holds it fails.
    pub fn lock_global(&self, full: bool) -> Result<GlobalLockGuard<'_>> {
        let me = thread::current().id();
        if *self.owner() == Some(me) {
            return Err(RingLogError::concurrency(
                "Global lock is already held by this thread",
            ));
        }
        if !self.is_initialized() {
            return Err(RingLogError::NotInitialized);
        }

        let global = self.global.guard();
        if !self.is_initialized() {
            return Err(RingLogError::NotInitialized);
        }
        *self.owner() = Some(me);

        let (held, restore_enabled) = if full {
            let was_enabled = self.enabled.swap(false, Ordering::SeqCst);
            let held: Vec<Arc<RingBuffer>> =
                self.table().present().map(|(_, b)| Arc::clone(b)).collect();
            for buffer in &held {
                buffer.lock_raw();
            }
            self.state.store(LockState::FullyLocked);
            (held, Some(was_enabled))
        } else {
            self.state.store(LockState::SimpleLocked);
            (Vec::new(), None)
        };

        Ok(GlobalLockGuard {
            store: self,
            held,
            restore_enabled,
            retired: false,
            _global: global,
        })
    }

    pub(super) fn release_global(&self, restore_enabled: Option<bool>, retired: bool) {
        if let Some(enabled) = restore_enabled {
            self.enabled.store(enabled, Ordering::SeqCst);
        }
        self.state.store(if retired {
            LockState::Uninitialized
        } else {
            LockState::Unlocked
        });
        *self.owner() = None;
    }

    /// Drop every buffer and return to the uninitialized state
    ///
    /// Registered renderers survive, so custom type ids are never reissued.
    pub fn cleanup(&self) -> Result<()> {
        let mut guard = self.lock_global(false)?;
        self.enabled.store(false, Ordering::SeqCst);
        {
            let mut table = self.table_mut();
            table.slots.iter_mut().for_each(|slot| *slot = None);
            table.default = None;
        }
        guard.retire();
        log::debug!("Log store cleaned up");
        Ok(())
    }

    // ---- buffer management -----------------------------------------------

    /// Create a buffer in the first free table entry
    ///
    /// A capacity of 0, or one above the per-buffer bound, means the bound.
    /// The new buffer becomes the default when there is none.
    pub fn create_buffer(&self, capacity: usize) -> Result<BufferId> {
        let _guard = self.lock_global(false)?;
        let mut table = self.table_mut();
        let id = table
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(RingLogError::NoFreeBuffer {
                max: self.config.max_buffers,
            })?;

        let capacity = self.config.clamp_capacity(capacity);
        table.slots[id] = Some(Arc::new(RingBuffer::new(capacity)?));
        if table.default.is_none() {
            table.default = Some(id);
        }
        log::debug!("Created buffer {} with {} slots", id, capacity);
        Ok(id)
    }

    /// Remove a buffer
    ///
    /// When the default buffer is removed, the lowest remaining buffer
    /// becomes the default.
    pub fn delete_buffer(&self, id: BufferId) -> Result<()> {
        let _guard = self.lock_global(true)?;
        let mut table = self.table_mut();
        if table.get(id).is_none() {
            return Err(RingLogError::invalid_buffer(id));
        }
        table.slots[id] = None;
        if table.default == Some(id) {
            let lowest = table.present().map(|(id, _)| id).next();
            table.default = lowest;
        }
        log::debug!("Deleted buffer {}", id);
        Ok(())
    }

    /// Reset every buffer under the global lock
    ///
    /// A thread that already holds the global lock resets through it.
    pub fn reset_all(&self) -> Result<()> {
        if self.holds_global() {
            self.reset_present();
            return Ok(());
        }
        let _guard = self.lock_global(false)?;
        self.reset_present();
        Ok(())
    }

    fn reset_present(&self) {
        let buffer_locked = self.holds_buffer_locks();
        for (_, buffer) in self.present_buffers() {
            if buffer_locked {
                buffer.reset_locked();
            } else {
                buffer.reset();
            }
        }
    }

    /// Reset one buffer
    pub fn reset_buffer(&self, id: BufferId) -> Result<()> {
        let buffer = self.require_buffer(id)?;
        if self.holds_buffer_locks() {
            buffer.reset_locked();
        } else {
            buffer.reset();
        }
        Ok(())
    }

    fn present_buffers(&self) -> Vec<(BufferId, Arc<RingBuffer>)> {
        self.table()
            .present()
            .map(|(id, b)| (id, Arc::clone(b)))
            .collect()
    }

    /// Whether the calling thread holds the global lock
    fn holds_global(&self) -> bool {
        *self.owner() == Some(thread::current().id())
    }

    /// Whether the calling thread holds a full lock, and with it every
    /// buffer lock
    fn holds_buffer_locks(&self) -> bool {
        self.state.load() == LockState::FullyLocked && self.holds_global()
    }

    /// Buffer by id
    pub fn buffer(&self, id: BufferId) -> Option<Arc<RingBuffer>> {
        self.table().get(id).cloned()
    }

    fn require_buffer(&self, id: BufferId) -> Result<Arc<RingBuffer>> {
        if !self.is_initialized() {
            return Err(RingLogError::NotInitialized);
        }
        self.buffer(id).ok_or_else(|| RingLogError::invalid_buffer(id))
    }

    /// Id of the default buffer
    pub fn default_buffer_id(&self) -> Option<BufferId> {
        self.table().default
    }

    /// Ids of every present buffer, ascending
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.table().present().map(|(id, _)| id).collect()
    }

    /// Status of every present buffer
    pub fn buffer_statuses(&self) -> Vec<(BufferId, BufferStatus)> {
        let buffer_locked = self.holds_buffer_locks();
        self.present_buffers()
            .into_iter()
            .map(|(id, buffer)| {
                let status = if buffer_locked {
                    buffer.status_locked()
                } else {
                    buffer.status()
                };
                (id, status)
            })
            .collect()
    }

    /// Copy the events of one buffer
    pub fn snapshot(&self, id: BufferId) -> Result<BufferSnapshot> {
        let buffer = self.require_buffer(id)?;
        Ok(if self.holds_buffer_locks() {
            buffer.snapshot_locked()
        } else {
            buffer.snapshot()
        })
    }

    // ---- enable flag -----------------------------------------------------

    /// Accept events
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Reject events with `Disabled`
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Flip the enable flag, returning the new value
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::SeqCst)
    }

    /// Whether events are accepted
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    // ---- extended types --------------------------------------------------

    /// Register a shared renderer, returning its event type
    pub fn register_renderer(&self, renderer: Arc<dyn Renderer>) -> Result<EventType> {
        self.renderers.register_renderer(renderer)
    }

    /// Register a plain render function under `name`, returning its event type
    pub fn register_fn(&self, name: &'static str, renderer: RenderFn) -> Result<EventType> {
        self.renderers.register_fn(name, renderer)
    }

    // ---- writing ---------------------------------------------------------

    /// Write a message to the default buffer
    pub fn log(&self, message: &str) -> Result<()> {
        self.log_event(Target::Default, Event::new(message))
    }

    /// Write a message to buffer `id`
    pub fn log_to(&self, id: BufferId, message: &str) -> Result<()> {
        self.log_event(Target::Buffer(id), Event::new(message))
    }

    /// Write a message with a hex dump of `data`
    pub fn log_hex(&self, target: Target, message: &str, data: &[u8]) -> Result<()> {
        self.log_event(target, Event::new(message).with_payload(EventType::HEXDUMP, data))
    }

    /// Write a message with the calling thread's backtrace
    pub fn log_backtrace(&self, target: Target, message: &str) -> Result<()> {
        let trace = builtin::capture_backtrace();
        self.log_event(
            target,
            Event::new(message).with_payload(EventType::BACKTRACE, trace.as_bytes()),
        )
    }

    /// Write an event
    ///
    /// The thread's registered name and call depth fill in the thread and
    /// indentation when the event leaves them out.
    pub fn log_event(&self, target: Target, event: Event<'_>) -> Result<()> {
        if !self.is_initialized() {
            return Err(RingLogError::NotInitialized);
        }
        if !self.is_enabled() {
            return Err(RingLogError::Disabled);
        }

        let buffer = {
            let table = self.table();
            let id = match target {
                Target::Default => table.default.ok_or(RingLogError::NoDefaultBuffer)?,
                Target::Buffer(id) => id,
            };
            table
                .get(id)
                .cloned()
                .ok_or_else(|| RingLogError::invalid_buffer(id))?
        };

        if let Some(payload) = event.payload {
            if !payload.event_type.is_none() && !self.renderers.is_valid(payload.event_type) {
                return Err(RingLogError::InvalidEventType {
                    event_type: payload.event_type.id(),
                });
            }
        }

        let event = Event {
            indent: event.indent.or_else(|| Some(context::call_depth())),
            ..event
        };
        match event.thread {
            Some(_) => buffer.append(&event, &self.renderers),
            None => context::with_thread_name(|thread| {
                let event = Event {
                    message: event.message,
                    thread,
                    function: event.function,
                    line: event.line,
                    indent: event.indent,
                    payload: event.payload,
                };
                buffer.append(&event, &self.renderers)
            }),
        }
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<LogStore> for LogStore {
    fn as_ref(&self) -> &LogStore {
        self
    }
}

/// Process-wide store, created uninitialized on first use
pub fn global() -> &'static LogStore {
    static GLOBAL: OnceLock<LogStore> = OnceLock::new();
    GLOBAL.get_or_init(LogStore::new)
}
