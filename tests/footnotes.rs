mod common;

use common::{Op, RecordingSurface, StubResolver, approx, doc, parse, render, renderer, renderer_with};
use mdtree_pdf::{Cover, RenderOptions, Rgb, Typeface};

fn def(label: &str, body: &str) -> String {
    format!(
        r#"<footnote_definition label="{label}"><paragraph><text>{body}</text></paragraph></footnote_definition>"#
    )
}

fn three_notes() -> String {
    format!(
        r#"<paragraph>
            <text>see</text><footnote_reference label="a"/>
            <text>and</text><footnote_reference label="b"/>
            <text>again</text><footnote_reference label="a"/>
            <text>last</text><footnote_reference label="c"/>
        </paragraph>{}{}{}"#,
        def("a", "Alpha"),
        def("b", "Beta"),
        def("c", "Gamma"),
    )
}

#[test]
fn references_are_numbered_by_definition_order() {
    let r = render(&three_notes());
    let texts = r.surface().texts();
    let numbers: Vec<&str> = texts
        .iter()
        .map(|(t, _)| t.as_str())
        .filter(|t| matches!(*t, "1" | "2" | "3"))
        .collect();
    assert_eq!(numbers, ["1", "2", "1", "3"]);

    match r.surface().text_op("2") {
        Some(Op::Text { face, color, .. }) => {
            assert_eq!(*face, Typeface::regular(6.0));
            assert_eq!(*color, Rgb(66, 133, 244));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn footnote_section_lists_each_definition_once_in_order() {
    let r = render(&three_notes());
    let s = r.surface();
    let labels: Vec<usize> = ["1. ", "2. ", "3. "]
        .iter()
        .map(|l| s.position_of(l).unwrap_or_else(|| panic!("missing {l:?}")))
        .collect();
    assert!(labels.windows(2).all(|w| w[0] < w[1]));
    for label in ["1. ", "2. ", "3. "] {
        assert_eq!(s.texts().iter().filter(|(t, _)| t == label).count(), 1);
    }

    // Definitions are not laid out in the body: every body text precedes the
    // section's page.
    let second_page = s
        .ops
        .iter()
        .enumerate()
        .filter(|(_, op)| **op == Op::AddPage)
        .nth(1)
        .map(|(i, _)| i)
        .expect("footnote page");
    for body in ["Alpha", "Beta", "Gamma"] {
        assert!(s.position_of(body).unwrap() > second_page);
    }
    assert_eq!(r.page_count(), 2);
}

#[test]
fn footnote_body_continues_the_number_line() {
    let r = render(&three_notes());
    let texts = r.surface().texts();
    let (_, number) = texts.iter().find(|(t, _)| t == "1. ").unwrap();
    let (_, body) = texts.iter().find(|(t, _)| t == "Alpha").unwrap();
    assert!(approx(body.y, number.y));
    assert!(approx(body.x, number.x + 15.0));
}

#[test]
fn footnote_section_opens_with_a_rule() {
    let r = render(&three_notes());
    let s = r.surface();
    let g = r.geometry();
    let rule = s
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .expect("separator");
    assert!(approx(rule.0.x, g.content_left()));
    assert!(approx(rule.1.x, g.content_right()));
    assert!(approx(rule.0.y, g.content_top()));

    let (_, first) = s.texts().into_iter().find(|(t, _)| t == "1. ").unwrap();
    assert!(approx(first.y, g.content_top() + 12.0));
}

#[test]
fn references_and_definitions_link_to_each_other() {
    let r = render(&three_notes());
    let anchors = r.surface().anchors();
    for label in ["a", "b", "c"] {
        assert!(anchors.contains(&format!("footnote-ref-{label}")));
        assert!(anchors.contains(&format!("footnote-def-{label}")));
    }
    let links = r.surface().internal_links();
    assert_eq!(links.iter().filter(|l| *l == "footnote-def-a").count(), 2);
    assert_eq!(links.iter().filter(|l| *l == "footnote-ref-c").count(), 1);
}

#[test]
fn duplicate_definitions_render_once() {
    let r = render(&format!(
        r#"<paragraph><text>x</text><footnote_reference label="a"/></paragraph>{}{}"#,
        def("a", "First"),
        def("a", "Second"),
    ));
    let s = r.surface();
    assert!(s.text_op("1. ").is_some());
    assert!(s.text_op("2. ").is_none());
    assert!(s.text_op("First").is_some());
    assert!(s.text_op("Second").is_none());
}

#[test]
fn unknown_reference_is_written_literally() {
    let r = render(r#"<paragraph><text>x</text><footnote_reference label="zz"/></paragraph>"#);
    assert!(r.surface().text_op("[^zz]").is_some());
    assert_eq!(r.page_count(), 1);
}

#[test]
fn failing_definition_ends_the_section() {
    let tree = parse(&doc(&three_notes()));
    let mut r = renderer_with(
        RecordingSurface::new(5.0).failing_on("Beta"),
        RenderOptions::default(),
        None,
        StubResolver::default(),
    );
    r.render(&tree).expect("footnote failures are not fatal");
    let s = r.surface();
    assert!(s.text_op("1. ").is_some());
    assert!(s.text_op("Alpha").is_some());
    assert!(s.text_op("2. ").is_some());
    assert!(s.text_op("3. ").is_none());
    assert!(s.text_op("Gamma").is_none());
    assert_eq!(r.state().typeface_depth(), 1);
    assert_eq!(r.state().color_depth(), 1);
}

#[test]
fn footer_closes_body_and_footnote_pages() {
    let cover = Cover {
        title: "Guide".into(),
        ..Cover::default()
    };
    let tree = parse(&doc(&three_notes()));
    let mut r = renderer(RenderOptions::default(), Some(cover));
    r.render(&tree).unwrap();
    let s = r.surface();
    assert_eq!(s.texts().iter().filter(|(t, _)| t == "Guide").count(), 2);
    let last_footer = s
        .ops
        .iter()
        .rposition(|op| matches!(op, Op::Text { text, .. } if text == "Guide"))
        .unwrap();
    assert!(last_footer > s.position_of("Gamma").unwrap());
}

#[test]
fn reference_anchor_follows_the_number_onto_a_new_page() {
    let tree = parse(&doc(&format!(
        r#"<paragraph><text>x</text><softbreak/><footnote_reference label="a"/></paragraph>{}"#,
        def("a", "note")
    )));
    let mut r = renderer(RenderOptions::default(), None);
    r.page_break().unwrap();
    let bottom = r.geometry().content_bottom();
    r.state_mut().cursor.y = bottom - 30.0;
    r.render(&tree).unwrap();

    let ops = &r.surface().ops;
    let second_page = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| **op == Op::AddPage)
        .map(|(i, _)| i)
        .nth(1)
        .expect("reference moved to a new page");
    let (anchor_at, anchor) = ops
        .iter()
        .enumerate()
        .find_map(|(i, op)| match op {
            Op::Anchor { id, at } if id == "footnote-ref-a" => Some((i, *at)),
            _ => None,
        })
        .expect("reference anchor");
    assert!(anchor_at > second_page);
    assert!(approx(anchor.y, 45.0));
    let number = r.surface().position_of("1").expect("reference number");
    assert!(number > second_page);
}
