//! Built-in payload renderers: hex dump and backtrace text

use std::io::{self, Write};

const ROW_BYTES: usize = 16;
const HEX_COLUMN: usize = 8;
const ASCII_COLUMN: usize = 58;
const ROW_WIDTH: usize = ASCII_COLUMN + ROW_BYTES;

/// Render `data` as offset / hex / ASCII rows of 16 bytes
///
/// ```text
///         +0          +4          +8          +c            0   4   8   c
///         ------------------------------------------------  ----------------
/// +0000   48 65 6c 6c 6f                                    Hello
/// ```
pub fn render_hex_dump(out: &mut dyn Write, data: &[u8]) -> io::Result<()> {
    writeln!(out, "\tHexdump of {} bytes:", data.len())?;
    writeln!(
        out,
        "\t        +0          +4          +8          +c            0   4   8   c   "
    )?;
    writeln!(
        out,
        "\t        ------------------------------------------------  ----------------"
    )?;

    for (row, chunk) in data.chunks(ROW_BYTES).enumerate() {
        let mut line = [b' '; ROW_WIDTH];
        let offset = format!("+{:04x}", row * ROW_BYTES);
        line[..offset.len()].copy_from_slice(offset.as_bytes());

        for (column, &byte) in chunk.iter().enumerate() {
            let hex = format!("{:02x}", byte);
            let at = HEX_COLUMN + column * 3;
            line[at..at + 2].copy_from_slice(hex.as_bytes());
            line[ASCII_COLUMN + column] = if (32..127).contains(&byte) { byte } else { b'.' };
        }

        out.write_all(b"\t")?;
        out.write_all(&line)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Render a captured backtrace, one tab-indented frame line per line
pub fn render_backtrace(out: &mut dyn Write, data: &[u8]) -> io::Result<()> {
    let text = String::from_utf8_lossy(data);
    writeln!(out, "\tBacktrace:")?;
    for line in text.trim_end_matches('\0').lines() {
        writeln!(out, "\t{}", line)?;
    }
    Ok(())
}

/// Capture the calling thread's backtrace as text
pub fn capture_backtrace() -> String {
    std::backtrace::Backtrace::force_capture().to_string()
}
