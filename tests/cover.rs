mod common;

use common::{Op, RecordingSurface, StubResolver, approx, doc, parse, renderer, renderer_with, write_png};
use mdtree_pdf::{Cover, Point, RenderOptions, Rgb, Typeface};

fn cover() -> Cover {
    Cover {
        title: "Guide".into(),
        author: "Ann".into(),
        author_link: "https://example.com/ann".into(),
        link: "https://example.com/guide".into(),
        source: "repo".into(),
        source_link: "https://example.com/repo".into(),
        ..Cover::default()
    }
}

fn title_top(options: &RenderOptions) -> f32 {
    options.page.height / 2.0 - options.margin - 128.0
}

#[test]
fn cover_takes_one_page_and_leaves_cursor_at_origin() {
    let mut r = renderer(RenderOptions::default(), Some(cover()));
    r.render_cover().unwrap();
    assert_eq!(r.surface().pages(), 2);
    assert_eq!(r.page_count(), 2);
    assert_eq!(r.state().cursor, Point::new(45.0, 45.0));
    assert_eq!(r.state().last_emitted, Some('\n'));
    // The cover page carries no footer.
    let footer_labels = r
        .surface()
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Text { face, .. } if face.size == 8.0))
        .count();
    assert_eq!(footer_labels, 0);
}

#[test]
fn no_cover_renders_nothing() {
    let mut r = renderer(RenderOptions::default(), None);
    r.render_cover().unwrap();
    assert_eq!(r.surface().pages(), 0);
    assert_eq!(r.page_count(), 0);
}

#[test]
fn title_is_centered_and_metadata_rows_follow() {
    let options = RenderOptions::default();
    let top = title_top(&options);
    let mut r = renderer(options.clone(), Some(cover()));
    r.render_cover().unwrap();
    let s = r.surface();

    match s.text_op("Guide") {
        Some(Op::Text { at, face, .. }) => {
            assert_eq!(*face, Typeface::regular(28.0));
            assert!(approx(at.x, options.page.width / 2.0 - 12.5));
            assert!(approx(at.y, top));
        }
        other => panic!("{other:?}"),
    }

    let rows_top = top + 30.0 + 45.0;
    for (i, label) in ["Author: ", "Link: ", "Source: ", "License: "].iter().enumerate() {
        match s.text_op(label) {
            Some(Op::Text { at, color, .. }) => {
                assert!(approx(at.x, 45.0), "{label}");
                assert!(approx(at.y, rows_top + 22.0 * i as f32), "{label}");
                assert_eq!(*color, Rgb::BLACK);
            }
            other => panic!("{label}: {other:?}"),
        }
    }
    match s.text_op("Ann") {
        Some(Op::Text { at, color, .. }) => {
            assert!(approx(at.x, 45.0 + 8.0 * 5.0));
            assert_eq!(*color, Rgb(66, 133, 244));
        }
        other => panic!("{other:?}"),
    }

    // Rows with empty values still get their label and link.
    let urls: Vec<String> = s.external_links().into_iter().map(|(u, _)| u).collect();
    assert_eq!(
        urls,
        [
            "https://example.com/ann",
            "https://example.com/guide",
            "https://example.com/repo",
            "",
        ]
    );
}

#[test]
fn long_title_wraps_onto_centered_lines() {
    let options = RenderOptions::default();
    let top = title_top(&options);
    let title = "t".repeat(120);
    let mut r = renderer(
        options.clone(),
        Some(Cover {
            title: title.clone(),
            ..Cover::default()
        }),
    );
    r.render_cover().unwrap();
    let lines: Vec<(String, Point)> = r
        .surface()
        .texts()
        .into_iter()
        .filter(|(t, _)| t.starts_with('t'))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0.len(), 101);
    assert_eq!(format!("{}{}", lines[0].0, lines[1].0), title);
    assert!(approx(lines[0].1.y, top));
    assert!(approx(lines[1].1.y, top + 30.0));
    assert!(approx(lines[1].1.x, options.page.width / 2.0 - 19.0 * 5.0 / 2.0));
}

#[test]
fn logo_sits_above_the_title() {
    let dir = tempfile::tempdir().unwrap();
    let logo = write_png(dir.path(), "logo.png", 256, 256);
    let options = RenderOptions::default();
    let top = title_top(&options);
    let cover = Cover {
        logo_link: "https://example.com/logo.png".into(),
        logo_title: "Brand".into(),
        logo_title_link: "https://example.com".into(),
        ..cover()
    };
    let resolver = StubResolver::default().with("https://example.com/logo.png", &logo);
    let mut r = renderer_with(RecordingSurface::new(5.0), options.clone(), Some(cover), resolver);
    r.render_cover().unwrap();
    let s = r.surface();

    let area = s
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Image { area, .. } => Some(*area),
            _ => None,
        })
        .expect("logo drawn");
    assert!(approx(area.x, options.page.width / 2.0 - 72.0));
    assert!(approx(area.y, top));
    assert!(approx(area.width, 144.0));

    match s.text_op("Brand") {
        Some(Op::Text { at, face, .. }) => {
            assert_eq!(*face, Typeface::regular(20.0));
            assert!(approx(at.y, top + 144.0 + 10.0));
        }
        other => panic!("{other:?}"),
    }
    assert_eq!(s.external_links()[0].0, "https://example.com");
    let (_, title) = s.texts().into_iter().find(|(t, _)| t == "Guide").unwrap();
    assert!(approx(title.y, top + 144.0 + 10.0 + 48.0));
}

#[test]
fn unreadable_logo_is_skipped() {
    let options = RenderOptions::default();
    let top = title_top(&options);
    let cover = Cover {
        logo_link: "nope.png".into(),
        logo_title: "Brand".into(),
        ..cover()
    };
    let mut r = renderer(options, Some(cover));
    r.render_cover().unwrap();
    let s = r.surface();
    assert!(!s.ops.iter().any(|op| matches!(op, Op::Image { .. })));
    assert!(s.text_op("Brand").is_none());
    let (_, title) = s.texts().into_iter().find(|(t, _)| t == "Guide").unwrap();
    assert!(approx(title.y, top));
    assert_eq!(r.page_count(), 2);
}

#[test]
fn body_starts_on_the_page_after_the_cover() {
    let tree = parse(&doc("<paragraph><text>body</text></paragraph>"));
    let mut r = renderer(RenderOptions::default(), Some(cover()));
    r.render_cover().unwrap();
    r.render(&tree).unwrap();
    let s = r.surface();
    assert_eq!(s.pages(), 2);
    match s.text_op("body") {
        Some(Op::Text { at, .. }) => assert_eq!(*at, Point::new(45.0, 51.0)),
        other => panic!("{other:?}"),
    }
    // Document end closes the body page with the footer.
    let footer = s
        .ops
        .iter()
        .rposition(|op| matches!(op, Op::Text { text, face, .. } if text == "Guide" && face.size == 8.0));
    assert!(footer.is_some());
}
