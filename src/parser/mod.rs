pub mod schema;
pub mod segments;
pub mod toc;

use std::collections::BTreeMap;

use tracing::info;

use crate::error::PipelineError;
use crate::llm::CompletionBackend;
use crate::model::HansardDocument;
use crate::output;
use crate::pdf;
use crate::settings::Settings;
use segments::{SegmentOutcome, SegmentReport};

pub struct RunCounts {
    pub toc_entries: usize,
    pub parsed: usize,
    pub empty: usize,
    pub failed: usize,
    skipped: Vec<String>,
}

impl RunCounts {
    fn from_reports(reports: &[SegmentReport]) -> Self {
        let mut counts = RunCounts {
            toc_entries: reports.len(),
            parsed: 0,
            empty: 0,
            failed: 0,
            skipped: Vec::new(),
        };
        for r in reports {
            match &r.outcome {
                SegmentOutcome::Parsed(_) => counts.parsed += 1,
                SegmentOutcome::Empty => {
                    counts.empty += 1;
                    counts
                        .skipped
                        .push(format!("#{} {} {}: no text", r.sequence_id, r.title, r.span));
                }
                SegmentOutcome::Failed(reason) => {
                    counts.failed += 1;
                    counts
                        .skipped
                        .push(format!("#{} {} {}: {}", r.sequence_id, r.title, r.span, reason));
                }
            }
        }
        counts
    }

    pub fn print(&self) {
        println!(
            "Saved {} of {} proceedings ({} empty, {} failed).",
            self.parsed, self.toc_entries, self.empty, self.failed,
        );
        for line in &self.skipped {
            println!("  skipped {}", line);
        }
    }
}

/// Text of pages `1..=n`, each followed by a newline.
pub fn front_text(pages: &BTreeMap<u32, String>, n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    pages
        .range(1..=n)
        .map(|(_, t)| format!("{}\n", t))
        .collect()
}

/// Two-pass pipeline: PDF → ToC → per-segment proceedings → JSON file.
///
/// The output file is only written once every fatal step has succeeded.
pub async fn run<B>(backend: &B, settings: &Settings) -> Result<(HansardDocument, RunCounts), PipelineError>
where
    B: CompletionBackend + ?Sized,
{
    let metadata = settings.metadata()?;

    let extracted = pdf::extract_text(&settings.input, None)?;
    let front = front_text(&extracted.pages, settings.toc_pages);

    info!("Pass 1: table of contents from {} front pages", settings.toc_pages);
    let entries = toc::parse_toc(backend, &front).await?;

    info!("Pass 2: {} segments", entries.len());
    let reports = segments::process_segments(
        backend,
        &entries,
        &extracted.pages,
        extracted.last_page(),
        settings.page_offset,
    )
    .await;
    let counts = RunCounts::from_reports(&reports);

    let doc = output::assemble(metadata, reports);
    output::write_document(&settings.output, &doc)?;
    info!("Wrote {:?}", settings.output);
    Ok((doc, counts))
}

// ── Tests ──
