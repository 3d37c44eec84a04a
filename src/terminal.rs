use anyhow::Context;
use crossterm::{cursor, queue, terminal};
use std::io::{stdout, BufWriter, Stdout, Write};

/// Smallest grid that still fits one visual row above one HUD row.
pub const MIN_COLS: u16 = 4;
pub const MIN_ROWS: u16 = 2;

/// Raw-mode, alternate-screen session that owns the buffered frame writer.
/// Drop undoes only the steps `enter` got through.
pub struct TerminalSession {
    out: BufWriter<Stdout>,
    alt_screen: bool,
}

impl TerminalSession {
    pub fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        let mut session = Self {
            out: BufWriter::new(stdout()),
            alt_screen: false,
        };

        queue!(session.out, terminal::EnterAlternateScreen).context("enter alternate screen")?;
        session.alt_screen = true;
        queue!(
            session.out,
            terminal::SetTitle("morph-cloud"),
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )
        .context("prepare screen")?;
        session.out.flush().context("flush terminal setup")?;
        Ok(session)
    }

    /// Where renderers write their frames.
    pub fn writer(&mut self) -> &mut BufWriter<Stdout> {
        &mut self.out
    }

    pub fn size() -> anyhow::Result<(u16, u16)> {
        let (cols, rows) = terminal::size().context("get terminal size")?;
        check_size(cols, rows)
    }
}

pub fn check_size(cols: u16, rows: u16) -> anyhow::Result<(u16, u16)> {
    if cols < MIN_COLS || rows < MIN_ROWS {
        anyhow::bail!(
            "terminal too small (need at least {MIN_COLS}x{MIN_ROWS}, got {cols}x{rows})"
        );
    }
    Ok((cols, rows))
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Sync output, autowrap and colors may be left mid-frame.
        let _ = self.out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        if self.alt_screen {
            let _ = queue!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        }
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}
