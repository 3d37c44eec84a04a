use morph_cloud::config::RendererMode;
use morph_cloud::render::{make_renderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};

fn rgba(w: usize, h: usize, lit: &[(usize, usize, [u8; 3])]) -> Vec<u8> {
    let mut px = vec![0u8; w * h * 4];
    for &(x, y, c) in lit {
        let i = (y * w + x) * 4;
        px[i..i + 3].copy_from_slice(&c);
        px[i + 3] = 255;
    }
    px
}

fn frame<'a>(cols: u16, rows: u16, w: usize, h: usize, px: &'a [u8], hud: &'a str) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: rows + 1,
        visual_rows: rows,
        pixel_width: w,
        pixel_height: h,
        pixels_rgba: px,
        hud,
        hud_rows: 1,
        sync_updates: true,
    }
}

fn render(r: &mut dyn Renderer, f: &Frame<'_>) -> String {
    let mut out = Vec::new();
    r.render(f, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn halfblock_paints_top_and_bottom_colors() {
    let px = rgba(2, 2, &[(0, 0, [255, 0, 0]), (0, 1, [0, 0, 255])]);
    let out = render(&mut HalfBlockRenderer::new(), &frame(2, 1, 2, 2, &px, "Shape: HEART"));

    assert!(out.starts_with("\x1b[?2026h\x1b[H\x1b[0m\x1b[?7l"));
    assert!(out.contains("\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}"));
    // The second cell is empty space.
    assert!(out.contains("\u{2580}\x1b[48;2;0;0;0m \r\n"));
    assert!(out.contains("\x1b[2;1H\x1b[0m\x1b[2KShape: HEART"));
    assert!(out.ends_with("\x1b[?7h\x1b[?2026l"));
}

#[test]
fn halfblock_reuses_unchanged_colors() {
    let c = [10, 200, 30];
    let px = rgba(3, 2, &[(0, 0, c), (0, 1, c), (1, 0, c), (1, 1, c), (2, 0, c), (2, 1, c)]);
    let out = render(&mut HalfBlockRenderer::new(), &frame(3, 1, 3, 2, &px, ""));
    assert_eq!(out.matches("\x1b[38;2;10;200;30m").count(), 1);
    assert_eq!(out.matches('\u{2580}').count(), 3);
}

#[test]
fn braille_lights_single_dot() {
    let px = rgba(2, 4, &[(0, 0, [255, 255, 255])]);
    let out = render(&mut BrailleRenderer::new(), &frame(1, 1, 2, 4, &px, "hud"));
    assert!(out.contains("\x1b[38;2;255;255;255m\u{2801}"));
    assert!(out.contains("hud"));
}

#[test]
fn braille_encodes_dot_positions() {
    // Right column, bottom row is dot 8.
    let px = rgba(2, 4, &[(1, 3, [0, 255, 0])]);
    let out = render(&mut BrailleRenderer::new(), &frame(1, 1, 2, 4, &px, ""));
    assert!(out.contains('\u{2880}'));

    let dark = rgba(2, 4, &[(1, 1, [3, 3, 3])]);
    let out = render(&mut BrailleRenderer::new(), &frame(1, 1, 2, 4, &dark, ""));
    assert!(!out.contains('\u{2810}'));
}

#[test]
fn degenerate_frames_write_nothing() {
    let px = rgba(2, 2, &[]);
    let mut half = HalfBlockRenderer::new();
    let mut braille = BrailleRenderer::new();
    let renderers: [&mut dyn Renderer; 2] = [&mut half, &mut braille];
    for r in renderers {
        assert!(render(r, &frame(0, 1, 0, 0, &[], "")).is_empty());
        // Surface size disagrees with the terminal grid.
        assert!(render(r, &frame(5, 3, 2, 2, &px, "")).is_empty());
    }
}

#[test]
fn short_pixel_buffer_is_reported() {
    let px = vec![0u8; 7];
    let out = render(&mut HalfBlockRenderer::new(), &frame(2, 1, 2, 2, &px, ""));
    assert!(out.contains("pixel buffer too small (need 16, got 7)"));
    assert!(out.ends_with("\x1b[?2026l"));
}

#[test]
fn renderers_are_chosen_by_mode() {
    assert_eq!(make_renderer(RendererMode::HalfBlock).name(), "halfblock");
    assert_eq!(make_renderer(RendererMode::Braille).name(), "braille");
    assert_eq!(RendererMode::Braille.cell_pixels(), (2, 4));
}
