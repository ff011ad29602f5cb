use std::collections::BTreeMap;
use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::schema;
use crate::llm::{request_structured, CompletionBackend, CompletionRequest};
use crate::model::{Proceeding, TocEntry};

/// Inclusive page span owned by one ToC entry. Empty when `end < start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

impl PageSpan {
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[empty]")
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}

#[derive(Debug)]
pub enum SegmentOutcome {
    Parsed(Proceeding),
    /// The span held no text; no request was made.
    Empty,
    Failed(String),
}

#[derive(Debug)]
pub struct SegmentReport {
    /// 1-based position of the entry in the ToC.
    pub sequence_id: u32,
    pub title: String,
    pub span: PageSpan,
    pub outcome: SegmentOutcome,
}

fn shift(page: u32, offset: i64) -> u32 {
    (page as i64).saturating_add(offset).clamp(0, u32::MAX as i64) as u32
}

/// Entry i owns `[start(i), start(i+1) - 1]`; the last entry runs to `last_page`.
pub fn segment_spans(entries: &[TocEntry], last_page: u32, page_offset: i64) -> Vec<PageSpan> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let start = shift(entry.page_start, page_offset);
            let end = match entries.get(i + 1) {
                Some(next) => shift(next.page_start, page_offset).saturating_sub(1),
                None => last_page,
            };
            PageSpan {
                start,
                end: end.min(last_page),
            }
        })
        .collect()
}

/// Concatenate the text of every page in `span`, newline separated.
pub fn span_text(pages: &BTreeMap<u32, String>, span: PageSpan) -> String {
    if span.is_empty() {
        return String::new();
    }
    pages
        .range(span.start..=span.end)
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the proceeding pass over every ToC entry, one request at a time.
pub async fn process_segments<B>(
    backend: &B,
    entries: &[TocEntry],
    pages: &BTreeMap<u32, String>,
    last_page: u32,
    page_offset: i64,
) -> Vec<SegmentReport>
where
    B: CompletionBackend + ?Sized,
{
    let spans = segment_spans(entries, last_page, page_offset);
    let proceeding_schema = schema::proceeding_schema();

    let pb = ProgressBar::new(entries.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut reports = Vec::with_capacity(entries.len());
    for (i, (entry, span)) in entries.iter().zip(spans).enumerate() {
        let sequence_id = i as u32 + 1;
        pb.set_message(entry.title.clone());
        let text = span_text(pages, span);

        let outcome = if text.trim().is_empty() {
            warn!("Skipping '{}' {}: no text in span", entry.title, span);
            SegmentOutcome::Empty
        } else {
            let user = schema::proceeding_user_message(&entry.title, &text);
            let request = CompletionRequest {
                system: schema::PROCEEDING_SYSTEM,
                user: &user,
                schema: &proceeding_schema,
            };
            match request_structured::<B, Proceeding>(backend, &request).await {
                Ok(mut proceeding) => {
                    proceeding.sequence_id = sequence_id;
                    info!("Parsed #{} '{}' {}", sequence_id, entry.title, span);
                    SegmentOutcome::Parsed(proceeding)
                }
                Err(e) => {
                    warn!("Failed to parse '{}' {}: {}", entry.title, span, e);
                    SegmentOutcome::Failed(e.to_string())
                }
            }
        };

        reports.push(SegmentReport {
            sequence_id,
            title: entry.title.clone(),
            span,
            outcome,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();
    reports
}

// ── Tests ──
