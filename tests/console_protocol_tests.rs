//! Console protocol tests over real TCP connections
//! Each test binds an ephemeral port and drives the menu like an operator

use std::{
    io::{Read, Write},
    net::{Shutdown, TcpStream},
    sync::Arc,
};

use ringlog::{
    console::{self, ConsoleConfig, ConsoleHandle},
    display, Event, EventType, LogStore, Target,
};

const RULE: &str = "================================================================================";

fn start_console(store: &Arc<LogStore>) -> ConsoleHandle {
    let config = ConsoleConfig::new().with_port(0).with_banner("test console\n");
    console::start(Arc::clone(store), config).unwrap()
}

fn converse(handle: &ConsoleHandle, input: &str) -> String {
    let mut stream = TcpStream::connect(handle.local_addr()).unwrap();
    stream.write_all(input.as_bytes()).unwrap();
    let mut output = String::new();
    stream.read_to_string(&mut output).unwrap();
    output
}

fn section<'a>(output: &'a str, title: &str) -> &'a str {
    let open = format!("\n{}\n{}\n{}\n", RULE, title, RULE);
    let start = output.find(&open).expect("section header") + open.len();
    let end = output[start..].find(&format!("{}\n\n", RULE)).expect("section footer");
    &output[start..start + end]
}

#[cfg(test)]
mod console_protocol_tests {
    use super::*;

    /// Test: select buffer 0 then dump it
    #[test]
    fn test_select_and_dump_over_tcp() {
        let store = Arc::new(LogStore::new());
        store.init(8).unwrap();
        store.create_buffer(8).unwrap();
        store.log("first").unwrap();
        store.log_hex(Target::Default, "bytes", b"0123456789abcdef").unwrap();
        store.log_to(1, "elsewhere").unwrap();

        let handle = start_console(&store);
        let output = converse(&handle, "2\n0\n3\nq\n");

        assert!(output.starts_with("test console\n[1] List log buffers\n"));
        assert!(output.contains("Buffer id: The active buffer now is 0\n"));

        let mut expected = Vec::new();
        display::write_buffer(&mut expected, &store, 0).unwrap();
        let expected = String::from_utf8(expected).unwrap();
        let dumped = section(&output, "Show logs from buffer");
        assert_eq!(dumped, format!("Active buffer: 0\n\n{}", expected));
        assert!(dumped.contains(": first\n"));
        assert!(dumped.contains("\tHexdump of 16 bytes:\n"));
        assert!(!dumped.contains("elsewhere"));

        handle.shutdown().unwrap();
    }

    /// Test: list, dump all and reset through the menu
    #[test]
    fn test_list_dump_all_and_reset() {
        let store = Arc::new(LogStore::new());
        store.init(4).unwrap();
        for i in 0..6 {
            store.log(&format!("m{}", i)).unwrap();
        }

        let handle = start_console(&store);
        let output = converse(&handle, "1\n4\n5\n7\n");

        let list = section(&output, "List log buffers");
        assert!(list.starts_with("Active buffer: 0\n\nLog buffer #0: initialized (default)\n"));

        let all = section(&output, "Show logs from all buffers");
        assert!(all.contains("  Buffer wrapped      : 1\n"));
        assert!(all.contains(": m5\n"));
        assert!(!all.contains(": m1\n"));

        let reset = section(&output, "Reset the active buffer");
        assert_eq!(reset, "Active buffer: 0\n\nReset has been completed.\n");
        assert!(store.snapshot(0).unwrap().is_empty());

        handle.shutdown().unwrap();
    }

    /// Test: sessions are served one after another
    #[test]
    fn test_sessions_are_serialized() {
        let store = Arc::new(LogStore::new());
        store.init(4).unwrap();
        store
            .log_event(Target::Default, Event::new("shared").with_payload(EventType::HEXDUMP, b"x"))
            .unwrap();

        let handle = start_console(&store);
        let mut first = TcpStream::connect(handle.local_addr()).unwrap();
        let mut second = TcpStream::connect(handle.local_addr()).unwrap();
        second.write_all(b"2 3\n3\nq\n").unwrap();

        first.write_all(b"3\n").unwrap();
        first.shutdown(Shutdown::Write).unwrap();
        let mut first_output = String::new();
        first.read_to_string(&mut first_output).unwrap();
        assert!(first_output.contains(": shared\n"));

        let mut second_output = String::new();
        second.read_to_string(&mut second_output).unwrap();
        assert!(second_output.contains("The active buffer now is 3\n"));
        assert!(second_output.contains("Buffer 3 is not initialized.\n"));

        handle.shutdown().unwrap();
    }

    /// Test: shutdown stops an idle server
    #[test]
    fn test_shutdown_idle_server() {
        let store = Arc::new(LogStore::new());
        let handle = start_console(&store);
        assert_ne!(handle.local_addr().port(), 0);
        handle.shutdown().unwrap();
    }

    /// Test: a store that is not initialized still answers
    #[test]
    fn test_uninitialized_store_over_tcp() {
        let store = Arc::new(LogStore::new());
        let handle = start_console(&store);
        let output = converse(&handle, "1\n3\n6\nq\n");

        assert!(section(&output, "List log buffers").contains("The log store has not been initialized\n"));
        assert!(section(&output, "Show logs from buffer").contains("Buffer 0 is not initialized.\n"));
        assert!(section(&output, "Reset all log buffers").starts_with("Reset failed: "));

        handle.shutdown().unwrap();
    }
}
