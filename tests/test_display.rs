use led_invaders::assets::Background;
use led_invaders::display::{Canvas, TerminalCanvas, TextStyle};
use led_invaders::entities::{Rect, Rgb};
use led_invaders::tuning::CanvasTuning;

/// 80×24 terminal showing the default 1000×600 logical canvas.
fn canvas() -> TerminalCanvas<Vec<u8>> {
    TerminalCanvas::new(Vec::new(), 80, 24, CanvasTuning::default())
}

fn output(canvas: TerminalCanvas<Vec<u8>>) -> String {
    String::from_utf8(canvas.into_inner()).unwrap()
}

#[test]
fn zero_sized_terminal_is_clamped() {
    let mut c = TerminalCanvas::new(Vec::new(), 0, 0, CanvasTuning::default());
    assert_eq!(c.size(), (1, 1));
    c.resize(120, 0);
    assert_eq!(c.size(), (120, 1));
}

#[test]
fn centered_text_is_printed() {
    let mut c = canvas();
    c.fill_text("Hello", 500.0, 300.0, TextStyle::centered(16, Rgb::WHITE))
        .unwrap();
    let out = output(c);
    // Row 12, column 38 (one-based in the escape sequence).
    assert!(out.contains("\x1b[13;39HHello"), "{out:?}");
}

#[test]
fn text_off_screen_is_clipped() {
    let mut c = canvas();
    c.fill_text("Hidden", -500.0, 300.0, TextStyle::left(16, Rgb::WHITE))
        .unwrap();
    c.fill_text("Below", 500.0, 900.0, TextStyle::left(16, Rgb::WHITE))
        .unwrap();
    let out = output(c);
    assert!(!out.contains("Hidden"));
    assert!(!out.contains("Below"));
}

#[test]
fn text_overhanging_the_right_edge_is_cut() {
    let mut c = canvas();
    // Column 78 leaves room for two characters.
    c.fill_text("ABCDEF", 980.0, 0.0, TextStyle::left(16, Rgb::WHITE))
        .unwrap();
    let out = output(c);
    assert!(out.contains("AB"));
    assert!(!out.contains("ABC"));
}

#[test]
fn large_text_is_bold() {
    let mut c = canvas();
    c.fill_text("Game Over", 500.0, 250.0, TextStyle::centered(70, Rgb::WHITE))
        .unwrap();
    assert!(output(c).contains("\x1b[1m"));

    let mut c = canvas();
    c.fill_text("Press start.", 500.0, 300.0, TextStyle::centered(16, Rgb::WHITE))
        .unwrap();
    assert!(!output(c).contains("\x1b[1m"));
}

#[test]
fn thin_rect_still_covers_a_cell() {
    let mut c = canvas();
    c.fill_rect(Rect::new(500.0, 300.0, 5.0, 20.0), Rgb::WHITE)
        .unwrap();
    let out = output(c);
    assert_eq!(out.matches('█').count(), 1);
    assert!(out.contains("38;2;255;255;255"));
}

#[test]
fn offset_shifts_drawing_until_reset() {
    let mut c = canvas();
    c.set_offset(125.0, 75.0);
    c.fill_text("X", 0.0, 0.0, TextStyle::left(16, Rgb::WHITE))
        .unwrap();
    c.reset_transform();
    c.fill_text("Y", 0.0, 0.0, TextStyle::left(16, Rgb::WHITE))
        .unwrap();
    let out = output(c);
    assert!(out.contains("\x1b[4;11HX"), "{out:?}");
    assert!(out.contains("\x1b[1;1HY"), "{out:?}");
}

#[test]
fn background_lines_are_drawn_top_down() {
    let mut c = canvas();
    c.draw_background(&Background::from_text("top\nbottom"))
        .unwrap();
    let out = output(c);
    assert!(out.contains("\x1b[1;1Htop"));
    assert!(out.contains("\x1b[2;1Hbottom"));
}

#[test]
fn present_flushes_and_bell_rings() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.bell().unwrap();
    c.present().unwrap();
    let out = output(c);
    assert!(out.contains('\x07'));
    assert!(out.contains("\x1b[2J"));
}
