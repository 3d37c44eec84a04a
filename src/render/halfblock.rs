use crate::render::{begin_frame, end_frame, pixel, Frame, Renderer, SgrCache};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Two vertical pixels per cell: foreground paints the top, background the bottom.
pub struct HalfBlockRenderer {
    sgr: SgrCache,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            sgr: SgrCache::default(),
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, 1, 2, out)? else {
            return Ok(());
        };
        self.sgr.reset();

        for row in 0..rows {
            for x in 0..cols {
                let top = pixel(frame, x, row * 2);
                let bottom = pixel(frame, x, row * 2 + 1);
                if top == [0, 0, 0] && bottom == [0, 0, 0] {
                    // Empty space: a blank on black is cheaper than a glyph.
                    self.sgr.bg(out, [0, 0, 0])?;
                    out.write_all(b" ")?;
                    continue;
                }
                self.sgr.fg(out, top)?;
                self.sgr.bg(out, bottom)?;
                write!(out, "{UPPER_HALF}")?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, out)
    }
}
