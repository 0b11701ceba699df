mod common;

use common::{Op, approx, doc, parse, renderer};
use mdtree_pdf::{FontVariant, NodeKind, RenderOptions};

const TABLE: &str = r#"<table>
  <table_header>
    <table_cell align="left"><text>a</text></table_cell>
    <table_cell align="center"><text>bbbbbbbbbb</text></table_cell>
    <table_cell align="right"><text>cc</text></table_cell>
  </table_header>
  <table_row>
    <table_cell><text>d</text></table_cell>
    <table_cell><text>ee</text></table_cell>
    <table_cell><text>fffffff</text></table_cell>
  </table_row>
</table>"#;

#[test]
fn cells_start_on_equal_column_boundaries() {
    let tree = parse(&doc(TABLE));
    let mut r = renderer(RenderOptions::default(), None);
    r.render(&tree).unwrap();

    let g = r.geometry();
    let column = g.content_width() / 3.0;
    let texts = r.surface().texts();
    for row in [["a", "bbbbbbbbbb", "cc"], ["d", "ee", "fffffff"]] {
        for (i, cell) in row.iter().enumerate() {
            let (_, at) = texts.iter().find(|(t, _)| t == cell).unwrap();
            let expected = g.content_left() + i as f32 * column + 4.0;
            assert!(approx(at.x, expected), "{cell}: {} != {expected}", at.x);
        }
    }

    let header_y = texts.iter().find(|(t, _)| t == "a").unwrap().1.y;
    let body_y = texts.iter().find(|(t, _)| t == "d").unwrap().1.y;
    assert!(approx(body_y - header_y, 18.0));
    assert!(approx(header_y, 45.0 + 6.0 + 4.0));
}

#[test]
fn header_row_is_bold() {
    let tree = parse(&doc(TABLE));
    let mut r = renderer(RenderOptions::default(), None);
    r.render(&tree).unwrap();
    for (cell, variant) in [
        ("a", FontVariant::Bold),
        ("cc", FontVariant::Bold),
        ("d", FontVariant::Regular),
        ("fffffff", FontVariant::Regular),
    ] {
        match r.surface().text_op(cell) {
            Some(Op::Text { face, .. }) => assert_eq!(face.variant, variant, "{cell}"),
            other => panic!("{cell}: {other:?}"),
        }
    }
    assert_eq!(r.state().typeface_depth(), 1);
    assert_eq!(r.state().x_mark_depth(), 0);
}

#[test]
fn column_width_divides_content_width() {
    let tree = parse(&doc(TABLE));
    let r = renderer(RenderOptions::default(), None);
    let cells: Vec<_> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&id| matches!(tree.kind(id), NodeKind::TableCell { .. }))
        .collect();
    assert_eq!(cells.len(), 6);
    let expected = r.geometry().content_width() / 3.0;
    for cell in cells {
        assert!(approx(r.column_width(&tree, cell), expected));
    }
}

#[test]
fn text_after_table_starts_at_left_margin() {
    let tree = parse(&doc(&format!(
        "{TABLE}<paragraph><text>after</text></paragraph>"
    )));
    let mut r = renderer(RenderOptions::default(), None);
    r.render(&tree).unwrap();
    let texts = r.surface().texts();
    let (_, last_cell) = texts.iter().find(|(t, _)| t == "fffffff").unwrap();
    let (_, after) = texts.iter().find(|(t, _)| t == "after").unwrap();
    assert!(approx(after.x, 45.0));
    assert!(after.y > last_cell.y);
}

#[test]
fn empty_row_does_not_shift_later_rows() {
    let tree = parse(&doc(
        r#"<table>
          <table_header>
            <table_cell><text>a</text></table_cell>
            <table_cell><text>b</text></table_cell>
          </table_header>
          <table_row><table_cell/><table_cell/></table_row>
          <table_row>
            <table_cell><text>c</text></table_cell>
            <table_cell><text>d</text></table_cell>
          </table_row>
        </table>"#,
    ));
    let mut r = renderer(RenderOptions::default(), None);
    r.render(&tree).unwrap();

    let column = r.geometry().content_width() / 2.0;
    let texts = r.surface().texts();
    let at = |cell: &str| texts.iter().find(|(t, _)| t == cell).unwrap().1;
    assert!(approx(at("a").x, 49.0));
    assert!(approx(at("c").x, at("a").x), "{:?}", at("c"));
    assert!(approx(at("d").x, at("b").x), "{:?}", at("d"));
    assert!(approx(at("b").x, 49.0 + column));
    assert!(at("c").y > at("a").y);
    assert_eq!(r.state().x_mark_depth(), 0);
}
