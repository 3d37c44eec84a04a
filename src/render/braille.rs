use crate::render::{begin_frame, end_frame, luma, pixel, Frame, Renderer, SgrCache};
use std::io::Write;

/// Dot bit for each (dx, dy) in a 2x4 cell, row-major.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// Below this luma a pixel never lights a dot.
const DOT_FLOOR: u16 = 10;

/// 2x4 pixels per cell as braille dots; lit dots share the mean lit color.
pub struct BrailleRenderer {
    sgr: SgrCache,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            sgr: SgrCache::default(),
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, rows)) = begin_frame(frame, 2, 4, out)? else {
            return Ok(());
        };
        self.sgr.reset();
        self.sgr.bg(out, [0, 0, 0])?;

        for row in 0..rows {
            for col in 0..cols {
                let (bits, fg) = encode_cell(frame, col * 2, row * 4);
                if bits == 0 {
                    out.write_all(b" ")?;
                    continue;
                }
                self.sgr.fg(out, fg)?;
                let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        end_frame(frame, out)
    }
}

fn encode_cell(frame: &Frame<'_>, x0: usize, y0: usize) -> (u8, [u8; 3]) {
    let mut rgb = [[0u8; 3]; 8];
    let mut lum = [0u16; 8];
    let mut max_l = 0u16;
    for (i, (c, l)) in rgb.iter_mut().zip(lum.iter_mut()).enumerate() {
        *c = pixel(frame, x0 + i % 2, y0 + i / 2);
        *l = luma(*c);
        max_l = max_l.max(*l);
    }

    // Particles are points on black, so half the brightest pixel separates
    // lit dots from glow.
    let thr = (max_l / 2).max(DOT_FLOOR);
    let mut bits = 0u8;
    let mut acc = [0u32; 3];
    let mut n = 0u32;
    for i in 0..8 {
        if lum[i] >= thr {
            bits |= DOT_BITS[i];
            for ch in 0..3 {
                acc[ch] += rgb[i][ch] as u32;
            }
            n += 1;
        }
    }
    if n == 0 {
        return (0, [0, 0, 0]);
    }
    // Brighten the mean so a single lit dot still reads as a star.
    let scale = |v: u32| ((v / n) * 3 / 2).min(255) as u8;
    (bits, [scale(acc[0]), scale(acc[1]), scale(acc[2])])
}
