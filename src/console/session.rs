//! One console session
//!
//! A session writes the menu and prompt, reads one line, runs the command
//! and repeats until the peer closes the connection or asks to quit. The
//! active buffer belongs to the session.

use std::io::{self, BufRead, Read, Write};

use crate::{config::MAX_COMMAND_LINE, display, state::LogStore, BufferId};

use super::command::{parse_buffer_id, Command, MENU, PROMPT};

const RULE: &str = "================================================================================";

/// Console protocol over any line reader and writer
pub struct Session<'a, R, W> {
    store: &'a LogStore,
    reader: R,
    writer: W,
    active: BufferId,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Start a session whose active buffer is the store's default
    pub fn new(store: &'a LogStore, reader: R, writer: W) -> Self {
        Self {
            store,
            reader,
            writer,
            active: store.default_buffer_id().unwrap_or(0),
        }
    }

    /// Buffer the dump and reset commands act on
    pub fn active_buffer(&self) -> BufferId {
        self.active
    }

    /// Serve commands until end of input or a close command
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.write_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            match Command::parse(&line) {
                Command::Close => break,
                command => self.dispatch(command)?,
            }
        }
        self.writer.flush()
    }

    fn dispatch(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::ListBuffers => {
                self.header("List log buffers")?;
                writeln!(self.writer, "Active buffer: {}\n", self.active)?;
                display::write_buffer_list(&mut self.writer, self.store)?;
                self.footer()
            }
            Command::SelectBuffer(argument) => {
                self.header("Set the active buffer")?;
                let answer = match argument {
                    Some(argument) => Some(argument),
                    None => {
                        write!(self.writer, "Buffer id: ")?;
                        self.writer.flush()?;
                        self.read_line()?
                    }
                };
                if let Some(answer) = answer {
                    self.select(&answer)?;
                }
                self.footer()
            }
            Command::DumpActive => {
                self.header("Show logs from buffer")?;
                writeln!(self.writer, "Active buffer: {}\n", self.active)?;
                display::write_buffer(&mut self.writer, self.store, self.active)?;
                self.footer()
            }
            Command::DumpAll => {
                self.header("Show logs from all buffers")?;
                display::write_all_buffers(&mut self.writer, self.store, true, true)?;
                self.footer()
            }
            Command::ResetActive => {
                self.header("Reset the active buffer")?;
                writeln!(self.writer, "Active buffer: {}\n", self.active)?;
                let result = self.store.reset_buffer(self.active);
                self.report_reset(result)?;
                self.footer()
            }
            Command::ResetAll => {
                self.header("Reset all log buffers")?;
                let result = self.store.reset_all();
                self.report_reset(result)?;
                self.footer()
            }
            Command::Close | Command::Unknown => Ok(()),
        }
    }

    fn select(&mut self, answer: &str) -> io::Result<()> {
        match parse_buffer_id(answer) {
            Some(id) => {
                self.active = id;
                writeln!(self.writer, "The active buffer now is {}", id)
            }
            None => {
                self.active = self.store.default_buffer_id().unwrap_or(0);
                writeln!(self.writer, "Error. Fallback to the default buffer.")
            }
        }
    }

    fn report_reset(&mut self, result: crate::error::Result<()>) -> io::Result<()> {
        match result {
            Ok(()) => writeln!(self.writer, "Reset has been completed."),
            Err(err) => {
                log::warn!("Console reset failed: {}", err);
                writeln!(self.writer, "Reset failed: {}", err)
            }
        }
    }

    fn write_menu(&mut self) -> io::Result<()> {
        for item in MENU {
            writeln!(self.writer, "{}", item)?;
        }
        write!(self.writer, "{}", PROMPT)?;
        self.writer.flush()
    }

    fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.writer, "\n{}\n{}\n{}", RULE, title, RULE)
    }

    fn footer(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}\n", RULE)?;
        self.writer.flush()
    }

    /// Read one line, `None` at end of input
    ///
    /// Bytes past the command line limit are discarded up to the newline.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_COMMAND_LINE as u64)
            .read_until(b'\n', &mut line)?;
        if read == 0 {
            return Ok(None);
        }
        if line.last() != Some(&b'\n') {
            self.discard_line()?;
        }
        Ok(Some(String::from_utf8_lossy(&line).trim_end().to_string()))
    }

    fn discard_line(&mut self) -> io::Result<()> {
        loop {
            let buffer = self.reader.fill_buf()?;
            if buffer.is_empty() {
                return Ok(());
            }
            match buffer.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.reader.consume(end + 1);
                    return Ok(());
                }
                None => {
                    let len = buffer.len();
                    self.reader.consume(len);
                }
            }
        }
    }
}
