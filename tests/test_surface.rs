use perspective_arcade::entities::Color;
use perspective_arcade::surface::{Canvas, Surface};

fn canvas() -> Canvas {
    let mut c = Canvas::new(20, 10);
    c.set_color(Color::BLACK);
    c.clear();
    c.set_color(Color::WHITE);
    c
}

fn lit(c: &Canvas, x: i32, y: i32) -> bool {
    c.pixel(x, y) == Some(Color::WHITE)
}

#[test]
fn clear_fills_with_pen() {
    let mut c = Canvas::new(4, 3);
    c.set_color(Color::CYAN);
    c.clear();
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(c.pixel(x, y), Some(Color::CYAN));
        }
    }
    assert_eq!(c.size(), (4, 3));
}

#[test]
fn pixels_outside_are_none() {
    let c = canvas();
    assert_eq!(c.pixel(-1, 0), None);
    assert_eq!(c.pixel(20, 0), None);
    assert_eq!(c.pixel(0, 10), None);
}

#[test]
fn rectangle_covers_its_extent() {
    let mut c = canvas();
    c.rectangle(2, 3, 4, 2);
    assert!(lit(&c, 2, 3));
    assert!(lit(&c, 5, 4));
    assert!(!lit(&c, 6, 4));
    assert!(!lit(&c, 2, 5));
}

#[test]
fn negative_rectangle_grows_backwards() {
    let mut c = canvas();
    c.rectangle(6, 6, -3, -2);
    assert!(lit(&c, 3, 4));
    assert!(lit(&c, 5, 5));
    assert!(!lit(&c, 6, 6));
}

#[test]
fn line_includes_both_endpoints() {
    let mut c = canvas();
    c.line(1, 1, 8, 5);
    assert!(lit(&c, 1, 1));
    assert!(lit(&c, 8, 5));
}

#[test]
fn circle_is_filled_and_clipped() {
    let mut c = canvas();
    c.circle(10, 5, 3);
    assert!(lit(&c, 10, 5));
    assert!(lit(&c, 13, 5));
    assert!(!lit(&c, 14, 5));

    // Huge or off-canvas circles must not panic.
    c.circle(-50, -50, 10);
    c.circle(0, 0, 100_000);
    assert!(lit(&c, 19, 9));
}

#[test]
fn triangle_fills_interior_either_winding() {
    let mut c = canvas();
    c.triangle((2, 8), (10, 8), (6, 1));
    assert!(lit(&c, 6, 6));
    assert!(!lit(&c, 15, 2));

    let mut c = canvas();
    c.triangle((6, 1), (10, 8), (2, 8));
    assert!(lit(&c, 6, 6));
}

#[test]
fn text_is_kept_as_overlay() {
    let mut c = canvas();
    c.set_color(Color::YELLOW);
    c.text("Score: 10", 1, 2, 2);
    let runs = c.texts();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "Score: 10");
    assert_eq!(runs[0].color, Color::YELLOW);
    assert_eq!((runs[0].x, runs[0].y, runs[0].scale), (1, 2, 2));

    c.clear();
    assert!(c.texts().is_empty());
}
