mod braille;
mod halfblock;

pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;

use crate::config::RendererMode;
use std::io::Write;

/// One painted terminal frame: the particle pixels plus the HUD text below them.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    }
}

/// Tracks the last emitted SGR colors so unchanged runs cost nothing.
#[derive(Default)]
pub(crate) struct SgrCache {
    fg: Option<[u8; 3]>,
    bg: Option<[u8; 3]>,
}

impl SgrCache {
    pub(crate) fn reset(&mut self) {
        self.fg = None;
        self.bg = None;
    }

    pub(crate) fn fg(&mut self, out: &mut dyn Write, c: [u8; 3]) -> std::io::Result<()> {
        if self.fg != Some(c) {
            write!(out, "\x1b[38;2;{};{};{}m", c[0], c[1], c[2])?;
            self.fg = Some(c);
        }
        Ok(())
    }

    pub(crate) fn bg(&mut self, out: &mut dyn Write, c: [u8; 3]) -> std::io::Result<()> {
        if self.bg != Some(c) {
            write!(out, "\x1b[48;2;{};{};{}m", c[0], c[1], c[2])?;
            self.bg = Some(c);
        }
        Ok(())
    }
}

/// Validates the frame geometry for a renderer packing `cell_w x cell_h`
/// pixels per cell and starts the frame. Returns `(cols, visual_rows)`, or
/// `None` when there is nothing to paint.
pub(crate) fn begin_frame(
    frame: &Frame<'_>,
    cell_w: usize,
    cell_h: usize,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize)>> {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;
    let (w, h) = (frame.pixel_width, frame.pixel_height);

    if cols == 0 || rows == 0 || w == 0 || h == 0 {
        return Ok(None);
    }
    if w != cols * cell_w || h != rows * cell_h {
        // Surface and terminal disagree mid-resize; the next frame catches up.
        return Ok(None);
    }

    let need = w * h * 4;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    if frame.pixels_rgba.len() < need {
        out.write_all(b"\x1b[H\x1b[0m\x1b[2J")?;
        write!(
            out,
            "pixel buffer too small (need {need}, got {})",
            frame.pixels_rgba.len()
        )?;
        end_sync(frame, out)?;
        return Ok(None);
    }

    // Home and reset; autowrap off while full-width rows are painted.
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    Ok(Some((cols, rows)))
}

/// Writes the HUD rows, restores autowrap and flushes.
pub(crate) fn end_frame(frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let mut lines = frame.hud.lines();
    for i in 0..frame.hud_rows as usize {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", frame.visual_rows as usize + i + 1)?;
        if let Some(line) = lines.next() {
            let clipped: String = line.chars().take(cols).collect();
            out.write_all(clipped.as_bytes())?;
        }
    }
    out.write_all(b"\x1b[?7h")?;
    end_sync(frame, out)
}

fn end_sync(frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

#[inline]
pub(crate) fn pixel(frame: &Frame<'_>, x: usize, y: usize) -> [u8; 3] {
    let i = (y * frame.pixel_width + x) * 4;
    [frame.pixels_rgba[i], frame.pixels_rgba[i + 1], frame.pixels_rgba[i + 2]]
}

#[inline]
pub(crate) fn luma(c: [u8; 3]) -> u16 {
    // Rec.709 weights in 8-bit fixed point.
    ((c[0] as u32 * 54 + c[1] as u32 * 183 + c[2] as u32 * 19) >> 8) as u16
}
