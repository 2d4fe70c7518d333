//! Tests for the log store state machine

#[cfg(test)]
mod tests {
    use std::{
        io,
        io::Write,
        sync::{mpsc, Arc},
        thread,
        time::Duration,
    };

    use crate::{
        context,
        error::RingLogError,
        event::Event,
        ext::EventType,
        state::{LockState, LogStore, StoreConfig, Target},
    };

    fn noop_renderer(_out: &mut dyn Write, _payload: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn other_renderer(out: &mut dyn Write, payload: &[u8]) -> io::Result<()> {
        write!(out, "{} bytes", payload.len())
    }

    #[test]
    fn test_append_before_init_fails() {
        let store = LogStore::new();
        assert_eq!(store.lock_state(), LockState::Uninitialized);
        assert!(matches!(store.log("early"), Err(RingLogError::NotInitialized)));
        assert!(matches!(
            store.create_buffer(4),
            Err(RingLogError::NotInitialized)
        ));
    }

    #[test]
    fn test_init_twice_fails() {
        let store = LogStore::new();
        store.init(4).unwrap();
        let err = store.init(4).unwrap_err();
        assert!(matches!(err, RingLogError::AlreadyInitialized));
        assert_eq!(err.code(), crate::error::status::ALREADY_INITIALIZED);
    }

    #[test]
    fn test_init_without_default_buffer() {
        let store = LogStore::new();
        store.init(0).unwrap();
        assert!(store.buffer_ids().is_empty());
        assert!(matches!(store.log("x"), Err(RingLogError::NoDefaultBuffer)));

        let id = store.create_buffer(0).unwrap();
        assert_eq!(store.default_buffer_id(), Some(id));
        assert_eq!(store.buffer(id).unwrap().capacity(), 128);
    }

    #[test]
    fn test_init_clamps_capacity() {
        let store = LogStore::with_config(StoreConfig::new().with_max_events(8)).unwrap();
        store.init(1000).unwrap();
        assert_eq!(store.buffer(0).unwrap().capacity(), 8);
    }

    #[test]
    fn test_create_until_full() {
        let store = LogStore::new();
        store.init(4).unwrap();
        for expected in 1..5 {
            assert_eq!(store.create_buffer(4).unwrap(), expected);
        }
        assert!(matches!(
            store.create_buffer(4),
            Err(RingLogError::NoFreeBuffer { max: 5 })
        ));
        assert_eq!(store.default_buffer_id(), Some(0));
    }

    #[test]
    fn test_cleanup_rejects_further_appends() {
        let store = LogStore::new();
        store.init(4).unwrap();
        store.log("before").unwrap();
        store.cleanup().unwrap();

        assert!(!store.is_initialized());
        assert!(!store.is_enabled());
        assert!(store.buffer_ids().is_empty());
        assert_eq!(store.default_buffer_id(), None);
        assert!(matches!(store.log("after"), Err(RingLogError::NotInitialized)));
        assert!(matches!(store.cleanup(), Err(RingLogError::NotInitialized)));

        store.init(4).unwrap();
        assert!(store.snapshot(0).unwrap().is_empty());
    }

    #[test]
    fn test_disabled_store_rejects_events() {
        let store = LogStore::new();
        store.init(4).unwrap();
        store.disable();
        assert!(matches!(store.log("x"), Err(RingLogError::Disabled)));
        assert!(store.toggle());
        store.log("x").unwrap();
        assert!(!store.toggle());
        assert!(!store.is_enabled());
        store.enable();
        assert!(store.is_enabled());
    }

    #[test]
    fn test_invalid_buffer_and_event_type() {
        let store = LogStore::new();
        store.init(4).unwrap();
        assert!(matches!(
            store.log_to(3, "x"),
            Err(RingLogError::InvalidBufferId { id: 3 })
        ));
        assert!(matches!(
            store.log_to(99, "x"),
            Err(RingLogError::InvalidBufferId { id: 99 })
        ));

        let event = Event::new("x").with_payload(EventType::from_raw(7), b"data");
        assert!(matches!(
            store.log_event(Target::Default, event),
            Err(RingLogError::InvalidEventType { event_type: 7 })
        ));
    }

    #[test]
    fn test_full_lock_disables_and_restores() {
        let store = LogStore::new();
        store.init(4).unwrap();
        {
            let guard = store.lock_global(true).unwrap();
            assert!(guard.is_full());
            assert_eq!(store.lock_state(), LockState::FullyLocked);
            assert!(store.buffer(0).unwrap().is_locked());
            assert!(matches!(store.log("x"), Err(RingLogError::Disabled)));
        }
        assert_eq!(store.lock_state(), LockState::Unlocked);
        assert!(!store.buffer(0).unwrap().is_locked());
        store.log("x").unwrap();
    }

    #[test]
    fn test_full_lock_keeps_disabled_store_disabled() {
        let store = LogStore::new();
        store.init(4).unwrap();
        store.disable();
        drop(store.lock_global(true).unwrap());
        assert!(!store.is_enabled());
    }

    #[test]
    fn test_full_lock_holder_reads_and_resets() {
        let store = Arc::new(LogStore::new());
        store.init(4).unwrap();
        let other = store.create_buffer(4).unwrap();
        store.log("zero").unwrap();
        store.log_to(other, "one").unwrap();

        let (done, outcome) = mpsc::channel();
        let holder = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let guard = store.lock_global(true).unwrap();
                let before = store.snapshot(0).unwrap().len();
                let statuses = store.buffer_statuses();
                store.reset_buffer(0).unwrap();
                let after_one = store.snapshot(0).unwrap().len();
                store.reset_all().unwrap();
                let after_all = store.snapshot(other).unwrap().len();
                drop(guard);
                let _ = done.send((before, statuses.len(), after_one, after_all));
            })
        };

        let result = outcome.recv_timeout(Duration::from_secs(5));
        assert_eq!(result, Ok((1, 2, 0, 0)));
        holder.join().unwrap();
        assert_eq!(store.lock_state(), LockState::Unlocked);
        assert!(!store.buffer(0).unwrap().is_locked());
        store.log("after").unwrap();
    }

    #[test]
    fn test_simple_lock_holder_resets_all() {
        let store = LogStore::new();
        store.init(4).unwrap();
        store.log("zero").unwrap();
        let _guard = store.lock_global(false).unwrap();
        store.reset_all().unwrap();
        assert!(store.snapshot(0).unwrap().is_empty());
    }

    #[test]
    fn test_nested_global_lock_rejected() {
        let store = LogStore::new();
        store.init(4).unwrap();
        let _guard = store.lock_global(false).unwrap();
        assert_eq!(store.lock_state(), LockState::SimpleLocked);
        assert!(matches!(
            store.lock_global(false),
            Err(RingLogError::Concurrency { .. })
        ));
        assert!(matches!(
            store.create_buffer(4),
            Err(RingLogError::Concurrency { .. })
        ));
    }

    #[test]
    fn test_global_lock_waits_for_other_thread() {
        let store = Arc::new(LogStore::new());
        store.init(4).unwrap();
        let guard = store.lock_global(false).unwrap();

        let contender = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create_buffer(4))
        };
        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(store.buffer_ids(), vec![0]);
        drop(guard);

        assert_eq!(contender.join().unwrap().unwrap(), 1);
    }

    #[test]
    fn test_delete_default_moves_to_lowest() {
        let store = LogStore::new();
        store.init(4).unwrap();
        let one = store.create_buffer(4).unwrap();
        let two = store.create_buffer(4).unwrap();

        store.delete_buffer(0).unwrap();
        assert_eq!(store.default_buffer_id(), Some(one));
        store.delete_buffer(two).unwrap();
        assert_eq!(store.default_buffer_id(), Some(one));
        store.delete_buffer(one).unwrap();
        assert_eq!(store.default_buffer_id(), None);
        assert!(matches!(
            store.delete_buffer(one),
            Err(RingLogError::InvalidBufferId { .. })
        ));

        assert_eq!(store.create_buffer(4).unwrap(), 0);
        assert_eq!(store.default_buffer_id(), Some(0));
    }

    #[test]
    fn test_reset_buffer_and_reset_all() {
        let store = LogStore::new();
        store.init(4).unwrap();
        let other = store.create_buffer(4).unwrap();
        for i in 0..6 {
            store.log(&format!("a{}", i)).unwrap();
            store.log_to(other, &format!("b{}", i)).unwrap();
        }

        store.reset_buffer(0).unwrap();
        let snapshot = store.snapshot(0).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.status.wrap_count, 0);
        assert_eq!(store.snapshot(other).unwrap().len(), 4);

        store.reset_all().unwrap();
        assert!(store
            .buffer_statuses()
            .iter()
            .all(|(_, status)| status.used == 0 && status.wrap_count == 0));
        assert!(matches!(
            store.reset_buffer(4),
            Err(RingLogError::InvalidBufferId { id: 4 })
        ));
    }

    #[test]
    fn test_thread_context_fills_event() {
        let store = LogStore::new();
        store.init(4).unwrap();
        context::set_thread_name("ctx-thread");
        {
            let _scope = context::enter_scope();
            store.log("inside").unwrap();
        }
        store
            .log_event(Target::Default, Event::new("explicit").with_thread("other"))
            .unwrap();
        context::clear_thread_name();

        let events = store.snapshot(0).unwrap().events;
        assert_eq!(events[0].thread.as_deref(), Some("ctx-thread"));
        assert_eq!(events[0].indent, 1);
        assert_eq!(events[1].thread.as_deref(), Some("other"));
        assert_eq!(events[1].indent, 0);
    }

    #[test]
    fn test_register_renderer_idempotent() {
        let store = LogStore::new();
        assert!(matches!(
            store.register_fn("noop", noop_renderer),
            Err(RingLogError::NotInitialized)
        ));
        store.init(4).unwrap();

        let first = store.register_fn("noop", noop_renderer).unwrap();
        let again = store.register_fn("noop", noop_renderer).unwrap();
        let second = store.register_fn("other", other_renderer).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, second);
        assert!(first.is_dynamic() && second.is_dynamic());

        store.cleanup().unwrap();
        store.init(4).unwrap();
        assert_eq!(store.register_fn("noop", noop_renderer).unwrap(), first);
    }

    #[test]
    fn test_log_hex_and_backtrace() {
        let store = LogStore::new();
        store.init(4).unwrap();
        store.log_hex(Target::Default, "packet", &[1, 2, 3]).unwrap();
        store.log_backtrace(Target::Buffer(0), "trace").unwrap();

        let events = store.snapshot(0).unwrap().events;
        let hex = events[0].payload.as_ref().unwrap();
        assert_eq!(hex.event_type, EventType::HEXDUMP);
        assert_eq!(hex.data, vec![1, 2, 3]);
        let trace = events[1].payload.as_ref().unwrap();
        assert_eq!(trace.event_type, EventType::BACKTRACE);
        assert!(!trace.data.is_empty());
    }
}
