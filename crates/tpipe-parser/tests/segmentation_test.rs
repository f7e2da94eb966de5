//! Segmentation properties over generated markup

use proptest::prelude::*;
use tpipe_core::SegmentationConfig;
use tpipe_parser::segment_html;

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Vec<String>),
    Division(Vec<String>),
    Inline(Vec<String>),
    Nav(Vec<String>),
}

impl Block {
    fn render(&self) -> String {
        match self {
            Self::Paragraph(words) => format!("<p>{}</p>", render_words(words)),
            Self::Division(words) => format!("<div>{}</div>", render_words(words)),
            Self::Inline(words) => format!("<span>{}</span>", render_words(words)),
            Self::Nav(words) => format!("<nav>{}</nav>", words.join(" ")),
        }
    }

    fn visible_words(&self) -> &[String] {
        match self {
            Self::Nav(_) => &[],
            Self::Paragraph(words) | Self::Division(words) | Self::Inline(words) => words,
        }
    }
}

/// Alternate plain and bold words so inline markup is exercised
fn render_words(words: &[String]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 1 {
                format!("<b>{w}</b>")
            } else {
                w.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..6)
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        words().prop_map(Block::Paragraph),
        words().prop_map(Block::Division),
        words().prop_map(Block::Inline),
        words().prop_map(Block::Nav),
    ]
}

proptest! {
    #[test]
    fn segments_reproduce_visible_text(blocks in prop::collection::vec(block(), 0..8)) {
        let html = format!(
            "<html><body>{}</body></html>",
            blocks.iter().map(Block::render).collect::<String>()
        );
        let segments = segment_html(&html, &SegmentationConfig::default());

        let expected: Vec<&str> = blocks
            .iter()
            .flat_map(|b| b.visible_words())
            .map(String::as_str)
            .collect();
        let actual: Vec<&str> = segments
            .iter()
            .flat_map(|s| s.text.split_whitespace())
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn segments_are_trimmed_and_non_empty(blocks in prop::collection::vec(block(), 0..8)) {
        let html: String = blocks.iter().map(Block::render).collect();
        for segment in segment_html(&html, &SegmentationConfig::default()) {
            prop_assert!(!segment.text.is_empty());
            prop_assert_eq!(segment.text.trim(), segment.text.as_str());
            prop_assert!(segment.location_path.starts_with("/html"));
        }
    }

    #[test]
    fn block_boundaries_split_segments(
        first in words(),
        second in words(),
    ) {
        let html = format!(
            "<p>{}</p><p>{}</p>",
            render_words(&first),
            render_words(&second)
        );
        let segments = segment_html(&html, &SegmentationConfig::default());

        prop_assert_eq!(segments.len(), 2);
        prop_assert_eq!(&segments[0].text, &first.join(" "));
        prop_assert_eq!(&segments[1].text, &second.join(" "));
    }
}

#[test]
fn test_title_never_absorbs_body_text() {
    let html = "<html><head><title>Page</title></head><body>loose text<p>para</p></body></html>";
    let segments = segment_html(html, &SegmentationConfig::default());

    let title: Vec<_> = segments.iter().filter(|s| s.element_tag == "title").collect();
    assert_eq!(title.len(), 1);
    assert_eq!(title[0].text, "Page");
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[1].text, "loose text");
    assert_eq!(segments[1].element_tag, "body");
}
