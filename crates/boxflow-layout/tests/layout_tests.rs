//! Integration tests for block, inline, float and positioned layout.

use boxflow_layout::layout::{BoxKind, FloatEntry, FloatList, FloatSide, FontSpec, TextMeasure};
use boxflow_layout::style::{CssLengthDecoder, SharedStyle, StyleDeclaration};
use boxflow_layout::{BoxId, LayoutConfig, LayoutContext, LayoutError, LayoutTree};
use quickcheck_macros::quickcheck;

fn style(decl: &str) -> SharedStyle {
    decl.parse::<StyleDeclaration>().unwrap().shared()
}

/// A 400 × 300 viewport.
fn viewport() -> LayoutTree {
    LayoutTree::new(400.0, 300.0)
}

fn layout(tree: &mut LayoutTree) {
    tree.layout(&LayoutContext::default()).unwrap();
}

fn text_of(tree: &LayoutTree, id: BoxId) -> String {
    match &tree.get(id).unwrap().kind {
        BoxKind::Text(t) => t.shown_text().trim_end().to_string(),
        _ => panic!("{id} is not a text box"),
    }
}

#[test]
fn test_auto_margins_center_block() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 200px; margin: 0 auto"))
        .unwrap();
    layout(&mut tree);

    let div = tree.get(div).unwrap();
    assert_eq!(div.dimensions.margin.left, 100.0);
    assert_eq!(div.dimensions.margin.right, 100.0);
    assert_eq!(div.content_box().x, 100.0);
    assert_eq!(div.bounds.width, 400.0);
}

#[test]
fn test_auto_margins_odd_leftover() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 199px; margin: 0 auto"))
        .unwrap();
    layout(&mut tree);

    let div = tree.get(div).unwrap();
    assert_eq!(div.dimensions.margin.left, 101.0);
    assert_eq!(div.dimensions.margin.right, 100.0);
}

#[test]
fn test_float_shrinks_to_content_but_not_below_min_width() {
    let mut tree = viewport();
    let narrow = tree.append_element(tree.root(), style("float: left")).unwrap();
    let _ = tree.append_replaced(narrow, style(""), 50.0, 10.0).unwrap();
    let limited = tree.append_element(tree.root(), style("float: left; min-width: 80px")).unwrap();
    let _ = tree.append_replaced(limited, style(""), 50.0, 10.0).unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(narrow).unwrap().dimensions.content.width, 50.0);
    assert_eq!(tree.get(limited).unwrap().dimensions.content.width, 80.0);
}

#[test]
fn test_max_and_min_constraints() {
    let mut tree = viewport();
    let div = tree
        .append_element(
            tree.root(),
            style("display: block; width: 500px; max-width: 300px; height: 10px; min-height: 40px"),
        )
        .unwrap();
    layout(&mut tree);

    let div = tree.get(div).unwrap();
    assert_eq!(div.dimensions.content.width, 300.0);
    assert_eq!(div.dimensions.content.height, 40.0);
}

#[test]
fn test_outer_size_is_sum_of_edges() {
    let mut tree = viewport();
    let float = tree
        .append_element(
            tree.root(),
            style(
                "float: left; width: 100px; height: 50px; padding: 5px; \
                 border-width: 2px; border-style: solid; margin: 10px",
            ),
        )
        .unwrap();
    layout(&mut tree);

    let float = tree.get(float).unwrap();
    assert_eq!(float.bounds.width, 134.0);
    assert_eq!(float.bounds.height, 84.0);
    assert_eq!(float.border_box().width, 114.0);
    assert_eq!(float.padding_box().height, 60.0);
}

#[test]
fn test_floats_narrow_the_line() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 400px")).unwrap();
    let left = tree
        .append_element(div, style("float: left; width: 100px; height: 50px"))
        .unwrap();
    let right = tree
        .append_element(div, style("float: right; width: 50px; height: 50px"))
        .unwrap();
    let img = tree.append_replaced(div, style(""), 30.0, 20.0).unwrap();
    layout(&mut tree);

    let lines = &tree.get(div).unwrap().block().unwrap().lines;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].limit, 250.0);
    assert_eq!(tree.get(img).unwrap().bounds.x, 100.0);
    assert_eq!(tree.get(left).unwrap().bounds.x, 0.0);
    assert_eq!(tree.get(right).unwrap().bounds.x, 350.0);
    assert_eq!(tree.get(div).unwrap().dimensions.content.height, 20.0);
}

#[test]
fn test_second_float_moves_down_when_line_is_full() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 300px")).unwrap();
    let _ = tree
        .append_element(div, style("float: left; width: 200px; height: 30px"))
        .unwrap();
    let second = tree
        .append_element(div, style("float: right; width: 150px; height: 10px"))
        .unwrap();
    layout(&mut tree);

    let second = tree.get(second).unwrap();
    assert_eq!(second.bounds.y, 30.0);
    assert_eq!(second.bounds.x, 150.0);
}

#[test]
fn test_line_breaking_between_replaced_boxes() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 300px")).unwrap();
    let a = tree.append_replaced(div, style(""), 100.0, 20.0).unwrap();
    let b = tree.append_replaced(div, style(""), 150.0, 20.0).unwrap();
    let c = tree.append_replaced(div, style(""), 200.0, 20.0).unwrap();
    layout(&mut tree);

    assert_eq!((tree.get(a).unwrap().bounds.x, tree.get(a).unwrap().bounds.y), (0.0, 0.0));
    assert_eq!((tree.get(b).unwrap().bounds.x, tree.get(b).unwrap().bounds.y), (100.0, 0.0));
    assert_eq!((tree.get(c).unwrap().bounds.x, tree.get(c).unwrap().bounds.y), (0.0, 20.0));
    let div = tree.get(div).unwrap();
    assert_eq!(div.block().unwrap().lines.len(), 2);
    assert_eq!(div.dimensions.content.height, 40.0);
}

#[test]
fn test_inline_block_that_does_not_fit_moves_to_next_line() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 100px")).unwrap();
    let _ = tree.append_replaced(div, style(""), 80.0, 10.0).unwrap();
    let ib = tree
        .append_element(div, style("display: inline-block; width: 50px; height: 10px"))
        .unwrap();
    layout(&mut tree);

    let ib = tree.get(ib).unwrap();
    assert_eq!(ib.bounds.x, 0.0);
    assert_eq!(ib.bounds.y, 16.0_f32 * 1.2);
}

#[test]
fn test_text_wraps_at_word_boundaries() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 100px; font-size: 10px"))
        .unwrap();
    let text = tree.append_text(div, "aaaa bbbb\n cccc   dddd").unwrap();
    layout(&mut tree);

    let node = tree.get(div).unwrap();
    assert_eq!(node.block().unwrap().lines.len(), 2);
    assert_eq!(node.dimensions.content.height, 24.0);
    assert_eq!(node.laid_out.len(), 2);
    assert_eq!(text_of(&tree, text), "aaaa bbbb cccc");
    let rest = node.laid_out[1];
    assert_eq!(text_of(&tree, rest), "dddd");
    assert!(tree.get(rest).unwrap().splitted);
    assert_eq!(tree.get(rest).unwrap().bounds.y, 12.0);
}

#[test]
fn test_inline_box_is_fragmented_across_lines() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 100px; font-size: 10px"))
        .unwrap();
    let span = tree.append_element(div, style("display: inline")).unwrap();
    let _ = tree.append_text(span, "aaaa bbbb cccc dddd").unwrap();
    layout(&mut tree);

    let node = tree.get(div).unwrap();
    assert_eq!(node.laid_out, vec![span, node.laid_out[1]]);
    let fragment = tree.get(node.laid_out[1]).unwrap();
    assert!(fragment.splitted);
    assert!(matches!(fragment.kind, BoxKind::Inline(_)));
    assert_eq!(text_of(&tree, fragment.laid_out[0]), "dddd");
    assert_eq!(fragment.bounds.y, 12.0);
    assert_eq!(tree.get(span).unwrap().dimensions.content.width, 84.0);
}

#[test]
fn test_text_align_center() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 100px; text-align: center"))
        .unwrap();
    let img = tree.append_replaced(div, style(""), 40.0, 10.0).unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(img).unwrap().bounds.x, 30.0);
}

#[test]
fn test_text_align_right() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 100px; text-align: right"))
        .unwrap();
    let img = tree.append_replaced(div, style(""), 40.0, 10.0).unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(img).unwrap().bounds.x, 60.0);
}

#[test]
fn test_right_aligned_content_stays_inside_shrunk_float() {
    let mut tree = viewport();
    let float = tree
        .append_element(tree.root(), style("float: left; text-align: right"))
        .unwrap();
    let img = tree.append_replaced(float, style(""), 40.0, 10.0).unwrap();
    layout(&mut tree);

    let float = tree.get(float).unwrap();
    let img = tree.get(img).unwrap();
    assert_eq!(float.dimensions.content.width, 40.0);
    assert_eq!(img.bounds.x, 0.0);
    assert!(img.bounds.right() <= float.dimensions.content.width);
}

#[test]
fn test_centered_content_uses_the_shrunk_width() {
    let mut tree = viewport();
    let float = tree
        .append_element(tree.root(), style("float: left; min-width: 100px; text-align: center"))
        .unwrap();
    let img = tree.append_replaced(float, style(""), 40.0, 10.0).unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(float).unwrap().dimensions.content.width, 100.0);
    assert_eq!(tree.get(img).unwrap().bounds.x, 30.0);
}

#[test]
fn test_leading_space_does_not_open_an_empty_line() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 50px; font-size: 10px"))
        .unwrap();
    let _ = tree.append_text(div, " aaaaaaaaaa").unwrap();
    layout(&mut tree);

    let div = tree.get(div).unwrap();
    assert_eq!(div.block().unwrap().lines.len(), 1);
    assert_eq!(div.dimensions.content.height, 12.0);
}

/// Left float 80px tall, right float 60px tall, then a 10px block with
/// `clear`. Returns the block's y.
fn cleared_y(clear: &str) -> f32 {
    let mut tree = viewport();
    let _ = tree
        .append_element(tree.root(), style("float: left; width: 100px; height: 80px"))
        .unwrap();
    let _ = tree
        .append_element(tree.root(), style("float: right; width: 100px; height: 60px"))
        .unwrap();
    let div = tree
        .append_element(tree.root(), style(&format!("display: block; clear: {clear}; height: 10px")))
        .unwrap();
    layout(&mut tree);
    tree.get(div).unwrap().bounds.y
}

#[test]
fn test_clear_one_side() {
    assert_eq!(cleared_y("left"), 80.0);
    assert_eq!(cleared_y("right"), 60.0);
    assert_eq!(cleared_y("none"), 0.0);
}

#[test]
fn test_auto_height_is_the_flow_cursor() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block")).unwrap();
    let _ = tree.append_element(div, style("display: block; height: 30px")).unwrap();
    let _ = tree
        .append_element(div, style("float: left; width: 10px; height: 100px"))
        .unwrap();
    let _ = tree.append_element(div, style("display: block; height: 20px")).unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(div).unwrap().dimensions.content.height, 50.0);
}

#[test]
fn test_clear_both_moves_below_floats() {
    let mut tree = viewport();
    let _ = tree
        .append_element(tree.root(), style("float: left; width: 100px; height: 80px"))
        .unwrap();
    let _ = tree
        .append_element(tree.root(), style("float: right; width: 100px; height: 60px"))
        .unwrap();
    let div = tree
        .append_element(tree.root(), style("display: block; clear: both; height: 10px"))
        .unwrap();
    layout(&mut tree);

    assert!(tree.get(div).unwrap().bounds.y >= 80.0);
}

#[test]
fn test_overflow_hidden_encloses_floats() {
    let mut tree = viewport();
    let bfc = tree
        .append_element(tree.root(), style("display: block; overflow: hidden"))
        .unwrap();
    let _ = tree
        .append_element(bfc, style("float: left; width: 50px; height: 100px"))
        .unwrap();
    let plain = tree.append_element(tree.root(), style("display: block")).unwrap();
    let _ = tree
        .append_element(plain, style("float: left; width: 50px; height: 100px"))
        .unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(bfc).unwrap().dimensions.content.height, 100.0);
    assert_eq!(tree.get(plain).unwrap().dimensions.content.height, 0.0);
}

#[test]
fn test_relative_and_absolute_positions() {
    let mut tree = viewport();
    let rel = tree
        .append_element(
            tree.root(),
            style("display: block; position: relative; left: 10px; top: 5px; height: 100px"),
        )
        .unwrap();
    let abs = tree
        .append_element(
            rel,
            style("position: absolute; right: 0; bottom: 0; width: 20px; height: 20px"),
        )
        .unwrap();
    let fixed = tree
        .append_element(rel, style("position: fixed; left: 1px; top: 2px; width: 5px; height: 5px"))
        .unwrap();
    layout(&mut tree);

    let rel = tree.get(rel).unwrap();
    assert_eq!((rel.bounds.x, rel.bounds.y), (10.0, 5.0));
    let abs = tree.get(abs).unwrap();
    assert_eq!((abs.bounds.x, abs.bounds.y), (390.0, 85.0));
    let fixed = tree.get(fixed).unwrap();
    assert_eq!((fixed.bounds.x, fixed.bounds.y), (1.0, 2.0));
}

#[test]
fn test_display_none_is_collapsed() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block")).unwrap();
    let hidden = tree
        .append_element(div, style("display: none; width: 100px; height: 100px"))
        .unwrap();
    layout(&mut tree);

    assert_eq!(tree.get(hidden).unwrap().bounds.height, 0.0);
    assert_eq!(tree.get(div).unwrap().dimensions.content.height, 0.0);
    assert!(tree.geometry().children[0].children.is_empty());
}

#[test]
fn test_intrinsic_widths() {
    let mut tree = viewport();
    let float = tree
        .append_element(tree.root(), style("float: left; font-size: 10px"))
        .unwrap();
    let _ = tree.append_text(float, "aaaa bb").unwrap();
    let ctx = LayoutContext::default();
    tree.layout(&ctx).unwrap();

    assert_eq!(tree.minimal_width(&ctx, float).unwrap(), 24.0);
    assert_eq!(tree.maximal_width(&ctx, float).unwrap(), 42.0);
    assert_eq!(tree.get(float).unwrap().dimensions.content.width, 42.0);
    assert_eq!(
        tree.minimal_width(&ctx, BoxId(999)),
        Err(LayoutError::UnknownBox(BoxId(999)))
    );
}

#[test]
fn test_layout_twice_gives_same_geometry() {
    let mut tree = viewport();
    let div = tree
        .append_element(tree.root(), style("display: block; width: 100px; font-size: 10px"))
        .unwrap();
    let _ = tree.append_text(div, "aaaa bbbb cccc dddd").unwrap();
    layout(&mut tree);
    let first = tree.get(div).unwrap().bounds;
    layout(&mut tree);

    assert_eq!(tree.get(div).unwrap().bounds, first);
    assert_eq!(tree.get(div).unwrap().block().unwrap().lines.len(), 2);
}

#[test]
fn test_narrow_space_threshold_moves_line_below_float() {
    let config: LayoutConfig = serde_json::from_str(r#"{ "inflow_space_threshold": 40 }"#).unwrap();
    let ctx = LayoutContext::new(config);
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 100px")).unwrap();
    let _ = tree
        .append_element(div, style("float: left; width: 70px; height: 30px"))
        .unwrap();
    let img = tree.append_replaced(div, style(""), 50.0, 10.0).unwrap();
    tree.layout(&ctx).unwrap();

    let img = tree.get(img).unwrap();
    assert_eq!((img.bounds.x, img.bounds.y), (0.0, 30.0));
}

/// Every character is 10px wide, lines are 10px tall.
struct Monospace;

impl TextMeasure for Monospace {
    fn text_width(&self, text: &str, _font: &FontSpec) -> f32 {
        10.0 * text.chars().count() as f32
    }

    fn line_height(&self, _font: &FontSpec) -> f32 {
        10.0
    }
}

#[test]
fn test_custom_text_measure() {
    let ctx = LayoutContext::default()
        .with_decoder(Box::new(CssLengthDecoder::new(10.0, 1.0)))
        .with_measure(Box::new(Monospace));
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block; width: 2em")).unwrap();
    let _ = tree.append_text(div, "ab cd").unwrap();
    tree.layout(&ctx).unwrap();

    let div = tree.get(div).unwrap();
    assert_eq!(div.dimensions.content.width, 20.0);
    assert_eq!(div.block().unwrap().lines.len(), 2);
    assert_eq!(div.dimensions.content.height, 20.0);
}

#[test]
fn test_floats_are_recorded_in_the_context_root() {
    let mut tree = viewport();
    let div = tree.append_element(tree.root(), style("display: block")).unwrap();
    let float = tree
        .append_element(div, style("float: right; width: 30px; height: 10px"))
        .unwrap();
    layout(&mut tree);

    let placement = tree.get(float).unwrap().block().unwrap().placement.unwrap();
    let list = tree.float_list(placement.list).unwrap();
    assert_eq!(list.owner(), tree.root());
    assert_eq!(list.side(), FloatSide::Right);
    assert_eq!(list.entries().len(), 1);
    assert_eq!(list.entries()[0].placed_by, div);
    assert_eq!(tree.get(float).unwrap().bounds.x, 370.0);
}

#[quickcheck]
fn prop_next_y_is_strictly_below(entries: Vec<(u16, u16, u16, u16)>, y: u16) -> bool {
    let mut list = FloatList::new(BoxId(0), FloatSide::Left);
    for (i, (x, top, width, height)) in entries.into_iter().enumerate() {
        list.add(FloatEntry {
            id: BoxId(i + 1),
            placed_by: BoxId(0),
            x: f32::from(x),
            y: f32::from(top),
            width: f32::from(width),
            height: f32::from(height),
        });
    }
    let y = f32::from(y);
    list.next_y(y) > y
}

#[quickcheck]
fn prop_content_width_is_within_min_and_max(width: u8, min: u8, max: u8) -> bool {
    let mut tree = viewport();
    let div = tree
        .append_element(
            tree.root(),
            style(&format!(
                "display: block; width: {width}px; min-width: {min}px; max-width: {max}px"
            )),
        )
        .unwrap();
    layout(&mut tree);

    let used = tree.get(div).unwrap().dimensions.content.width;
    let (min, max) = (f32::from(min), f32::from(max).max(f32::from(min)));
    (min..=max).contains(&used) && used == f32::from(width).clamp(min, max)
}

#[quickcheck]
fn prop_shrink_to_fit_respects_min_width(content: u8, min: u8) -> bool {
    let mut tree = viewport();
    let float = tree
        .append_element(tree.root(), style(&format!("float: left; min-width: {min}px")))
        .unwrap();
    let _ = tree.append_replaced(float, style(""), f32::from(content), 10.0).unwrap();
    layout(&mut tree);

    let used = tree.get(float).unwrap().dimensions.content.width;
    used >= f32::from(min) && used == f32::from(content.max(min))
}
