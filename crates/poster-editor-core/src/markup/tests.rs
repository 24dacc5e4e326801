use super::*;
use crate::blank::transform;

fn widget_html(class: &str) -> String {
    format!(
        r#"<span class="blank-box {class}" data-blank-box="true" data-selectable="true"><span class="blank-text">____</span></span>"#
    )
}

#[test]
fn test_transform_output_round_trips() {
    let html = transform("I can [] swim", false);
    let region = Region::parse(&html);
    assert_eq!(region.to_html(), html);
    assert_eq!(region.widget_count(), 1);
}

#[test]
fn test_units_count_widgets_once() {
    let region = Region::parse(&transform("I can [] swim", false));
    // "I can " is 6 units, the widget 1, " swim" 5.
    assert_eq!(region.units(), 12);
    assert_eq!(region.text_in(2..5), "can");
    assert_eq!(region.text_in(0..12), "I\u{a0}can\u{a0}[]\u{a0}swim");
}

#[test]
fn test_widget_attributes_parsed() {
    let region = Region::parse(
        r#"<span class="blank-box space-4" data-blank-box="true" data-element-id="el-3" data-styled="true" style="color: #3B82F6 !important;"><span class="blank-text">____</span></span>"#,
    );
    let widget = region.widget(0).expect("one widget");
    assert_eq!(widget.size, BlankSize::Four);
    assert_eq!(widget.key.as_ref().map(|k| k.as_str()), Some("el-3"));
    assert!(widget.styled);
    assert_eq!(widget.style.color.as_ref().map(|c| c.as_str()), Some("#3B82F6"));
    assert_eq!(widget.token.as_deref(), Some("____"));
}

#[test]
fn test_widget_without_token() {
    let region = Region::parse(r#"<span class="blank-box space-1"></span>"#);
    assert_eq!(region.widget(0).and_then(|w| w.token.clone()), None);
    assert_eq!(region.units(), 1);
}

#[test]
fn test_unknown_elements_are_transparent() {
    let region = Region::parse("<b>bold</b> <div>x<img src=a>y</div>");
    assert_eq!(region.nodes, vec![Node::text("bold xy")]);
}

#[test]
fn test_unclosed_markup_is_closed() {
    let region = Region::parse(r#"a<span style="color: red;">b"#);
    insta::assert_snapshot!(region.to_html(), @r#"a<span style="color: red;">b</span>"#);
}

#[test]
fn test_unmanaged_styles_dropped() {
    let region = Region::parse(
        r#"<span style="color: #EF4444 ; background: url(x); font-size: 1.5em">y</span>"#,
    );
    insta::assert_snapshot!(region.to_html(), @r#"<span style="color: #EF4444; font-size: 27px;">y</span>"#);
}

#[test]
fn test_plain_spans_unwrap() {
    let region = Region::parse("<span>a</span><span>b</span>");
    assert_eq!(region.nodes, vec![Node::text("ab")]);
}

#[test]
fn test_split_clones_span_with_key() {
    let region = Region::parse(r#"<span style="color: red;" data-element-id="el-1">abc</span>"#);
    let (before, middle, after) = split_range(region.nodes, 1..2);
    assert_eq!(units(&before), 1);
    assert_eq!(units(&middle), 1);
    assert_eq!(units(&after), 1);
    for part in [&before, &middle, &after] {
        match part.as_slice() {
            [Node::Span(span)] => assert_eq!(span.key.as_ref().map(|k| k.as_str()), Some("el-1")),
            other => panic!("expected a single span, got {other:?}"),
        }
    }
}

#[test]
fn test_normalize_rejoins_split_spans() {
    let region = Region::parse(r#"<span style="color: red;">abc</span>"#);
    let html = region.to_html();
    let (before, middle, after) = split_range(region.nodes, 1..2);
    let rejoined = Region::new([before, middle, after].concat());
    assert_eq!(rejoined.to_html(), html);
}

#[test]
fn test_split_at_widget_boundary() {
    let region = Region::parse(&transform("a[]b", false));
    let (before, middle, after) = split_range(region.nodes, 1..2);
    assert_eq!(before, vec![Node::text("a")]);
    assert!(matches!(middle.as_slice(), [Node::Blank(_)]));
    assert_eq!(after, vec![Node::text("b")]);
}

#[test]
fn test_text_content_and_breaks() {
    let region = Region::parse(&transform("a []\nb", false));
    assert_eq!(region.text_content(), "a\u{a0}____\nb");
    assert_eq!(region.units(), 5);
}

#[test]
fn test_has_widget_markup_is_structural() {
    assert!(has_widget_markup(&widget_html("space-2")));
    // The class name as plain text is not a widget.
    assert!(!has_widget_markup("write blank-box here"));
    assert!(!has_widget_markup(r#"<span class="blank-boxes">x</span>"#));
}

#[test]
fn test_entities_decode_to_text() {
    let region = Region::parse("a&nbsp;&amp;&lt;b");
    assert_eq!(region.nodes, vec![Node::text("a\u{a0}&<b")]);
    assert_eq!(region.to_html(), "a&nbsp;&amp;&lt;b");
}

#[test]
fn test_widget_offset_and_font_size_at() {
    let region = Region::parse(&format!(
        r#"ab<span style="font-size: 27px;">c{}</span>d{}"#,
        widget_html("space-1"),
        widget_html("space-2")
    ));
    assert_eq!(region.widget_offset(0), Some(3));
    assert_eq!(region.widget_offset(1), Some(5));
    assert_eq!(region.widget_offset(2), None);
    assert_eq!(region.font_size_at(0), None);
    assert_eq!(region.font_size_at(3), Some(FontSize::from_px(27.0)));
    assert_eq!(region.font_size_at(4), None);
}
