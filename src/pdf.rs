use std::collections::BTreeMap;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, info, warn};

use crate::error::PipelineError;

/// 1-based inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        PageRange { start, end }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    /// Every extracted page in order, each followed by a newline.
    pub text: String,
    pub pages: BTreeMap<u32, String>,
    /// Page count of the whole document, independent of the range.
    pub page_count: u32,
}

impl ExtractedText {
    pub fn last_page(&self) -> u32 {
        self.page_count
    }
}

/// Extract page text from a PDF file. `None` reads every page.
pub fn extract_text(path: &Path, range: Option<PageRange>) -> Result<ExtractedText, PipelineError> {
    let doc = load(path)?;
    let extracted = extract_from_document(&doc, range);
    info!(
        "Extracted {} of {} pages from {:?} ({} chars)",
        extracted.pages.len(),
        extracted.page_count,
        path,
        extracted.text.len()
    );
    Ok(extracted)
}

pub fn page_count(path: &Path) -> Result<u32, PipelineError> {
    let doc = load(path)?;
    Ok(doc.get_pages().len() as u32)
}

fn load(path: &Path) -> Result<Document, PipelineError> {
    Document::load(path).map_err(|source| PipelineError::Extraction {
        path: path.to_path_buf(),
        source,
    })
}

fn extract_from_document(doc: &Document, range: Option<PageRange>) -> ExtractedText {
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let page_count = page_numbers.len() as u32;
    let (start, end) = match range {
        Some(r) => (r.start.max(1), r.end.min(page_count)),
        None => (1, page_count),
    };

    let mut text = String::new();
    let mut pages = BTreeMap::new();
    for page_num in page_numbers.into_iter().filter(|p| (start..=end).contains(p)) {
        let page_text = match doc.extract_text(&[page_num]) {
            Ok(t) => t,
            Err(e) => {
                warn!("No text layer decoded on page {}: {}", page_num, e);
                String::new()
            }
        };
        debug!("page {}: {} chars", page_num, page_text.len());
        text.push_str(&page_text);
        text.push('\n');
        pages.insert(page_num, page_text);
    }

    ExtractedText {
        text,
        pages,
        page_count,
    }
}

// ── Tests ──
