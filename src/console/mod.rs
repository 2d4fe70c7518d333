//! Remote console for live buffer inspection
//!
//! A line-oriented TCP protocol: the server shows a numbered menu, the
//! operator answers with one line per command.
//!
//! | Input        | Action                                   |
//! |--------------|------------------------------------------|
//! | `1`          | list buffers and the active buffer       |
//! | `2 [id]`     | select the active buffer                 |
//! | `3`          | dump the active buffer                   |
//! | `4`          | status and contents of every buffer      |
//! | `5`          | reset the active buffer                  |
//! | `6`          | reset every buffer                       |
//! | `7` or `q`   | close the session                        |

pub mod command;
pub mod config;
pub mod server;
pub mod session;

pub use command::{parse_buffer_id, Command};
pub use config::ConsoleConfig;
pub use server::{serve_connection, start, ConsoleHandle};
pub use session::Session;
