use regex::Regex;
use std::fmt;

/// First-occurrence search result for both splice markers.
///
/// Offsets are byte positions from `str::find`, so they always sit on UTF-8
/// character boundaries. Both statuses are kept together because diagnosing a
/// missing marker usually requires seeing where the other one landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerScan {
    pub start_marker: String,
    pub end_marker: String,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
}

/// Byte range `start..end` of the input that a splice removes.
///
/// Invariant: `start <= end`, guaranteed when obtained via [`MarkerScan::span`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceSpan {
    pub start: usize,
    pub end: usize,
}

impl MarkerScan {
    pub fn is_complete(&self) -> bool {
        self.start_index.is_some() && self.end_index.is_some()
    }

    pub fn is_ordered(&self) -> bool {
        matches!(
            (self.start_index, self.end_index),
            (Some(start), Some(end)) if start <= end
        )
    }

    /// The span to replace, available only when both markers were found in
    /// bracketing order.
    pub fn span(&self) -> Option<SpliceSpan> {
        match (self.start_index, self.end_index) {
            (Some(start), Some(end)) if start <= end => Some(SpliceSpan { start, end }),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let describe = |index: Option<usize>| match index {
            Some(at) => format!("found at byte {}", at),
            None => "not found".to_string(),
        };
        write!(
            f,
            "start marker \"{}\" {}; end marker \"{}\" {}",
            preview(&self.start_marker),
            describe(self.start_index),
            preview(&self.end_marker),
            describe(self.end_index)
        )
    }
}

/// Locates the first occurrence of each marker independently.
pub fn scan_markers(text: &str, start_marker: &str, end_marker: &str) -> MarkerScan {
    MarkerScan {
        start_marker: start_marker.to_string(),
        end_marker: end_marker.to_string(),
        start_index: text.find(start_marker),
        end_index: text.find(end_marker),
    }
}

/// Replaces `text[span.start..span.end]` with `replacement`.
///
/// The text at the end offset (the end marker itself) is preserved in the
/// suffix; the start marker is consumed with the replaced region.
pub fn splice(text: &str, span: SpliceSpan, replacement: &str) -> String {
    let mut output =
        String::with_capacity(text.len() - (span.end - span.start) + replacement.len());
    output.push_str(&text[..span.start]);
    output.push_str(replacement);
    output.push_str(&text[span.end..]);
    output
}

/// Degenerate span at the insertion point just behind the first occurrence
/// of `marker`. `None` when the marker is absent.
pub fn span_after(text: &str, marker: &str) -> Option<SpliceSpan> {
    let at = text.find(marker)? + marker.len();
    Some(SpliceSpan { start: at, end: at })
}

/// Degenerate span at the insertion point just ahead of the first occurrence
/// of `marker`. `None` when the marker is absent.
pub fn span_before(text: &str, marker: &str) -> Option<SpliceSpan> {
    let at = text.find(marker)?;
    Some(SpliceSpan { start: at, end: at })
}

/// Byte range of the first match of `pattern`. `None` when nothing matches.
pub fn pattern_span(text: &str, pattern: &Regex) -> Option<SpliceSpan> {
    let matched = pattern.find(text)?;
    Some(SpliceSpan {
        start: matched.start(),
        end: matched.end(),
    })
}

/// Inserts `payload` immediately after the first occurrence of `marker`.
/// Returns `None` when the marker is absent.
pub fn insert_after(text: &str, marker: &str, payload: &str) -> Option<String> {
    span_after(text, marker).map(|span| splice(text, span, payload))
}

/// Inserts `payload` immediately before the first occurrence of `marker`.
/// Returns `None` when the marker is absent.
pub fn insert_before(text: &str, marker: &str, payload: &str) -> Option<String> {
    span_before(text, marker).map(|span| splice(text, span, payload))
}

/// Replaces the first match of `pattern` with `replacement`, taken literally
/// (no `$n` capture expansion). Returns `None` when nothing matches.
pub fn replace_pattern(text: &str, pattern: &Regex, replacement: &str) -> Option<String> {
    pattern_span(text, pattern).map(|span| splice(text, span, replacement))
}

// Markers are often whole source lines; keep diagnostics on one line.
fn preview(marker: &str) -> String {
    const MAX_CHARS: usize = 40;
    let flat: String = marker
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(MAX_CHARS)
        .collect();
    if marker.chars().count() > MAX_CHARS {
        format!("{}...", flat)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "AAA<START>old body<END>ZZZ";

    #[test]
    fn test_scan_finds_both_markers() {
        let scan = scan_markers(TEXT, "<START>", "<END>");
        assert_eq!(scan.start_index, Some(3));
        assert_eq!(scan.end_index, Some(18));
        assert!(scan.is_complete());
        assert!(scan.is_ordered());
    }

    #[test]
    fn test_scan_reports_missing_markers_independently() {
        let scan = scan_markers("AAAZZZ", "<START>", "<END>");
        assert_eq!(scan.start_index, None);
        assert_eq!(scan.end_index, None);
        assert!(!scan.is_complete());
        assert_eq!(scan.span(), None);

        let scan = scan_markers("AAA<END>ZZZ", "<START>", "<END>");
        assert_eq!(scan.start_index, None);
        assert_eq!(scan.end_index, Some(3));
        assert!(!scan.is_complete());
    }

    #[test]
    fn test_scan_display_shows_both_statuses() {
        let scan = scan_markers("AAA<END>ZZZ", "<START>", "<END>");
        let shown = scan.to_string();
        assert!(shown.contains("start marker \"<START>\" not found"));
        assert!(shown.contains("end marker \"<END>\" found at byte 3"));
    }

    #[test]
    fn test_splice_preserves_end_marker_in_suffix() {
        let scan = scan_markers(TEXT, "<START>", "<END>");
        let output = splice(TEXT, scan.span().unwrap(), "<NEW>");
        // The end marker itself is preserved in the suffix.
        assert_eq!(output, "AAA<NEW><END>ZZZ");
    }

    #[test]
    fn test_splice_formula_holds_for_arbitrary_offsets() {
        let text = "prefix START middle END suffix";
        let scan = scan_markers(text, "START", "END");
        let span = scan.span().unwrap();
        let output = splice(text, span, "NEW");
        assert_eq!(
            output,
            format!("{}NEW{}", &text[..span.start], &text[span.end..])
        );
    }

    #[test]
    fn test_out_of_order_markers_yield_no_span() {
        let text = "AAA<END>xxx<START>ZZZ";
        let scan = scan_markers(text, "<START>", "<END>");
        assert!(scan.is_complete());
        assert!(!scan.is_ordered());
        assert_eq!(scan.span(), None);
    }

    #[test]
    fn test_equal_offsets_degenerate_to_insert_before() {
        // Both markers share a first occurrence position: nothing is removed.
        let text = "AAA<M>ZZZ";
        let scan = scan_markers(text, "<M>", "<M>ZZZ");
        let span = scan.span().unwrap();
        assert_eq!(span.start, span.end);
        assert_eq!(splice(text, span, "NEW"), "AAANEW<M>ZZZ");
    }

    #[test]
    fn test_splice_preserves_multibyte_text() {
        let text = "café №1 <START>старый<END> naïve—done";
        let scan = scan_markers(text, "<START>", "<END>");
        let output = splice(text, scan.span().unwrap(), "žluťoučký");
        assert_eq!(output, "café №1 žluťoučký<END> naïve—done");
    }

    #[test]
    fn test_reapplication_follows_first_occurrence_formula() {
        // The real payload re-declares the start marker part-way through, so a
        // second application keeps the payload text before the marker and
        // inserts the payload again after it. Documented, not idempotent.
        let text = "head START body END tail";
        let payload = "helper() START inner ";
        let first = splice(
            text,
            scan_markers(text, "START", "END").span().unwrap(),
            payload,
        );
        assert_eq!(first, "head helper() START inner END tail");

        let rescan = scan_markers(&first, "START", "END");
        let second = splice(&first, rescan.span().unwrap(), payload);
        assert_eq!(second, "head helper() helper() START inner END tail");
    }

    #[test]
    fn test_insert_after_places_payload_behind_anchor() {
        assert_eq!(
            insert_after("function addLog() {}\nrest", "addLog() {}", "\nextra()"),
            Some("function addLog() {}\nextra()\nrest".to_string())
        );
        assert_eq!(insert_after("nothing here", "addLog", "x"), None);
    }

    #[test]
    fn test_insert_before_places_payload_ahead_of_anchor() {
        assert_eq!(
            insert_before("AAA<M>ZZZ", "<M>", "NEW"),
            Some("AAANEW<M>ZZZ".to_string())
        );
        assert_eq!(insert_before("AAAZZZ", "<M>", "NEW"), None);
    }

    #[test]
    fn test_span_helpers_locate_edit_positions() {
        let text = "function addLog() {}\nrest";

        let after = span_after(text, "addLog() {}").unwrap();
        assert_eq!((after.start, after.end), (20, 20));

        let before = span_before(text, "rest").unwrap();
        assert_eq!((before.start, before.end), (21, 21));

        let pattern = Regex::new(r"add\w+").unwrap();
        assert_eq!(
            pattern_span(text, &pattern),
            Some(SpliceSpan { start: 9, end: 15 })
        );

        assert_eq!(span_after(text, "missing"), None);
        assert_eq!(span_before(text, "missing"), None);
    }

    #[test]
    fn test_replace_pattern_first_match_only() {
        let pattern = Regex::new(r#"src="data:image/png;base64,[^"]*""#).unwrap();
        let text = r#"<img src="data:image/png;base64,AAA"><img src="data:image/png;base64,BBB">"#;
        let output = replace_pattern(text, &pattern, r#"src="data:image/png;base64,NEW""#);
        assert_eq!(
            output.unwrap(),
            r#"<img src="data:image/png;base64,NEW"><img src="data:image/png;base64,BBB">"#
        );
    }

    #[test]
    fn test_replace_pattern_is_literal() {
        let pattern = Regex::new(r"(old)").unwrap();
        // "$1" must survive as-is, not expand to the capture.
        assert_eq!(
            replace_pattern("old text", &pattern, "$1-new"),
            Some("$1-new text".to_string())
        );
    }

    #[test]
    fn test_replace_pattern_none_when_unmatched() {
        let pattern = Regex::new(r"missing").unwrap();
        assert_eq!(replace_pattern("text", &pattern, "x"), None);
    }

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("line\nbreak"), "line break");
        let long = "x".repeat(60);
        let shown = preview(&long);
        assert_eq!(shown, format!("{}...", "x".repeat(40)));
    }
}
