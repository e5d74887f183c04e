// src/reasoning/mod.rs
// Splits a raw response into prose and shown-derivation segments

use serde::Serialize;

pub use crate::prompt::{REASONING_CLOSE_TAG, REASONING_OPEN_TAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Prose,
    Reasoning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Scan for non-overlapping `<think>...</think>` regions in document order.
///
/// One linear pass, no nesting: an opening tag inside a reasoning region is
/// literal text. A reasoning segment is only emitted for a complete
/// open+close pair; an unterminated opener leaves the trailing text as
/// prose. Segment text is trimmed and whitespace-only segments are dropped.
pub fn parse_segments(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = raw;

    loop {
        let Some(open) = rest.find(REASONING_OPEN_TAG) else {
            push_segment(&mut segments, SegmentKind::Prose, rest);
            break;
        };
        let after_open = &rest[open + REASONING_OPEN_TAG.len()..];
        let Some(close) = after_open.find(REASONING_CLOSE_TAG) else {
            // Unterminated opener: everything left is ordinary prose
            push_segment(&mut segments, SegmentKind::Prose, rest);
            break;
        };
        push_segment(&mut segments, SegmentKind::Prose, &rest[..open]);
        push_segment(&mut segments, SegmentKind::Reasoning, &after_open[..close]);
        rest = &after_open[close + REASONING_CLOSE_TAG.len()..];
    }

    segments
}

fn push_segment(segments: &mut Vec<Segment>, kind: SegmentKind, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(Segment {
            kind,
            text: trimmed.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(kind: SegmentKind, text: &str) -> Segment {
        Segment { kind, text: text.into() }
    }

    #[test]
    fn test_plain_prose() {
        let segments = parse_segments("just an answer");
        assert_eq!(segments, vec![seg(SegmentKind::Prose, "just an answer")]);
    }

    #[test]
    fn test_prose_reasoning_prose() {
        let segments = parse_segments("P1 <think> R </think> P2");
        assert_eq!(
            segments,
            vec![
                seg(SegmentKind::Prose, "P1"),
                seg(SegmentKind::Reasoning, "R"),
                seg(SegmentKind::Prose, "P2"),
            ]
        );
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let segments = parse_segments("<think>a</think>mid<think>b</think>end");
        assert_eq!(
            segments,
            vec![
                seg(SegmentKind::Reasoning, "a"),
                seg(SegmentKind::Prose, "mid"),
                seg(SegmentKind::Reasoning, "b"),
                seg(SegmentKind::Prose, "end"),
            ]
        );
    }

    #[test]
    fn test_unterminated_opener_is_prose() {
        let segments = parse_segments("before <think> never closed");
        assert_eq!(
            segments,
            vec![seg(SegmentKind::Prose, "before <think> never closed")]
        );
    }

    #[test]
    fn test_whitespace_only_segments_dropped() {
        let segments = parse_segments("  <think>R</think>  ");
        assert_eq!(segments, vec![seg(SegmentKind::Reasoning, "R")]);
    }

    #[test]
    fn test_no_nesting() {
        // The inner opener is literal text within the reasoning region
        let segments = parse_segments("<think>outer <think> inner</think>tail");
        assert_eq!(
            segments,
            vec![
                seg(SegmentKind::Reasoning, "outer <think> inner"),
                seg(SegmentKind::Prose, "tail"),
            ]
        );
    }
}
