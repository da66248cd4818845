//! Pure functions over `(text, spans)` pairs.
//!
//! Every function takes the text an annotation denotes together with the
//! spans anchoring that text to the original document, and returns a new
//! pair with the spans recomputed against the *original* text. Producers
//! never recompute offsets by searching the document themselves; they go
//! through these functions, so anchoring survives arbitrary chains of
//! extraction and replacement.
//!
//! Requested ranges are always expressed in the coordinate system of the
//! passed `text`, not the document. Validation is eager and loud: spans
//! must cover the text exactly, and ranges must be ordered, disjoint, in
//! bounds, and on character boundaries.

use crate::error::{CoreError, CoreResult};
use crate::span::{AnySpan, ModifiedSpan, Span};

/// Extracts the concatenation of `ranges` from `text`, recomputing spans.
///
/// Ranges must be non-overlapping and increasing; zero-width ranges are
/// skipped and an empty range list yields `("", [])`. A range that covers
/// a [`ModifiedSpan`] only partially fails with
/// [`CoreError::AmbiguousSplit`].
pub fn extract(
    text: &str,
    spans: &[AnySpan],
    ranges: &[(usize, usize)],
) -> CoreResult<(String, Vec<AnySpan>)> {
    check_coverage(text, spans)?;
    check_ranges(text, ranges)?;

    let mut new_text = String::new();
    let mut new_spans = Vec::new();
    for &(start, end) in ranges {
        if start == end {
            continue;
        }
        new_text.push_str(&text[start..end]);
        spans_between(spans, start, end, &mut new_spans)?;
    }
    Ok((new_text, new_spans))
}

/// Replaces each range with the paired string, recording what each
/// replacement consumed as a [`ModifiedSpan`].
///
/// A zero-width range is a pure insertion; an empty replacement string is
/// a deletion that keeps its site on record. Text outside the ranges
/// keeps its existing anchoring, trimmed exactly as in [`extract`].
pub fn replace(
    text: &str,
    spans: &[AnySpan],
    ranges: &[(usize, usize)],
    replacements: &[&str],
) -> CoreResult<(String, Vec<AnySpan>)> {
    check_coverage(text, spans)?;
    check_ranges(text, ranges)?;
    if ranges.len() != replacements.len() {
        return Err(CoreError::ReplacementCountMismatch {
            ranges: ranges.len(),
            replacements: replacements.len(),
        });
    }

    let mut new_text = String::new();
    let mut new_spans = Vec::new();
    let mut cursor = 0;
    for (&(start, end), replacement) in ranges.iter().zip(replacements) {
        if start > cursor {
            new_text.push_str(&text[cursor..start]);
            spans_between(spans, cursor, start, &mut new_spans)?;
        }
        let mut consumed = Vec::new();
        spans_between(spans, start, end, &mut consumed)?;
        new_text.push_str(replacement);
        new_spans.push(AnySpan::Modified(ModifiedSpan::covering(
            replacement.len(),
            &consumed,
        )));
        cursor = end;
    }
    if cursor < text.len() {
        new_text.push_str(&text[cursor..]);
        spans_between(spans, cursor, text.len(), &mut new_spans)?;
    }
    Ok((new_text, new_spans))
}

/// Deletes the ranges from `text`, keeping everything else anchored.
///
/// Equivalent to extracting the complement of `ranges`; the deleted
/// stretches leave no marker behind.
pub fn remove(
    text: &str,
    spans: &[AnySpan],
    ranges: &[(usize, usize)],
) -> CoreResult<(String, Vec<AnySpan>)> {
    check_ranges(text, ranges)?;

    let mut kept = Vec::new();
    let mut cursor = 0;
    for &(start, end) in ranges {
        if start > cursor {
            kept.push((cursor, start));
        }
        cursor = end;
    }
    if cursor < text.len() {
        kept.push((cursor, text.len()));
    }
    extract(text, spans, &kept)
}

/// Joins `(text, spans)` parts in order.
pub fn concatenate(parts: &[(&str, &[AnySpan])]) -> CoreResult<(String, Vec<AnySpan>)> {
    let mut new_text = String::new();
    let mut new_spans = Vec::new();
    for (text, spans) in parts {
        check_coverage(text, spans)?;
        new_text.push_str(text);
        new_spans.extend(spans.iter().cloned());
    }
    Ok((new_text, new_spans))
}

/// Projects spans back onto the original text as plain ranges.
///
/// Modified spans contribute the sub-spans they consumed; inserted text
/// (`None` entries) contributes nothing. Adjacent contiguous results are
/// merged, so the projection of a sentence cut out of a cleaned document
/// reads as a handful of ranges rather than one per replacement.
pub fn source_spans(spans: &[AnySpan]) -> Vec<Span> {
    let mut projected: Vec<Span> = Vec::new();
    for span in spans {
        match span {
            AnySpan::Simple(simple) => push_merged(&mut projected, *simple),
            AnySpan::Modified(modified) => {
                for replaced in modified.replaced_spans.iter().flatten() {
                    push_merged(&mut projected, *replaced);
                }
            }
        }
    }
    projected
}

fn push_merged(projected: &mut Vec<Span>, span: Span) {
    if let Some(last) = projected.last_mut() {
        if last.end == span.start {
            last.end = span.end;
            return;
        }
    }
    projected.push(span);
}

/// Collects the spans denoting `text[start..end]` into `out`.
fn spans_between(
    spans: &[AnySpan],
    start: usize,
    end: usize,
    out: &mut Vec<AnySpan>,
) -> CoreResult<()> {
    let mut offset = 0;
    for span in spans {
        let span_start = offset;
        let span_end = offset + span.length();
        offset = span_end;
        if span_end <= start {
            continue;
        }
        if span_start >= end {
            break;
        }
        let overlap_start = start.max(span_start);
        let overlap_end = end.min(span_end);
        if overlap_end <= overlap_start {
            // zero-width span sitting on a boundary
            continue;
        }
        match span {
            AnySpan::Simple(simple) => {
                out.push(AnySpan::Simple(Span::new(
                    simple.start + (overlap_start - span_start),
                    simple.start + (overlap_end - span_start),
                )));
            }
            AnySpan::Modified(modified) => {
                if overlap_start == span_start && overlap_end == span_end {
                    out.push(AnySpan::Modified(modified.clone()));
                } else {
                    let cut = if overlap_start > span_start {
                        overlap_start - span_start
                    } else {
                        overlap_end - span_start
                    };
                    return Err(CoreError::AmbiguousSplit {
                        length: modified.length,
                        offset: cut,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_coverage(text: &str, spans: &[AnySpan]) -> CoreResult<()> {
    let mut total = 0;
    for span in spans {
        match span {
            AnySpan::Simple(simple) => {
                if simple.start >= simple.end {
                    return Err(CoreError::MalformedSpan {
                        start: simple.start,
                        end: simple.end,
                    });
                }
            }
            AnySpan::Modified(modified) => {
                for replaced in modified.replaced_spans.iter().flatten() {
                    if replaced.start >= replaced.end {
                        return Err(CoreError::MalformedSpan {
                            start: replaced.start,
                            end: replaced.end,
                        });
                    }
                }
            }
        }
        total += span.length();
    }
    if total != text.len() {
        return Err(CoreError::SpanTextMismatch {
            span_total: total,
            text_len: text.len(),
        });
    }
    Ok(())
}

fn check_ranges(text: &str, ranges: &[(usize, usize)]) -> CoreResult<()> {
    let mut previous_end = 0;
    for &(start, end) in ranges {
        if start > end {
            return Err(CoreError::ReversedRange { start, end });
        }
        if end > text.len() {
            return Err(CoreError::RangeOutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if start < previous_end {
            return Err(CoreError::UnorderedRanges {
                start,
                end,
                previous_end,
            });
        }
        if !text.is_char_boundary(start) {
            return Err(CoreError::NotCharBoundary { offset: start });
        }
        if !text.is_char_boundary(end) {
            return Err(CoreError::NotCharBoundary { offset: end });
        }
        previous_end = end;
    }
    Ok(())
}
