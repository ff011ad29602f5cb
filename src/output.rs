use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::PipelineError;
use crate::model::{Category, DocumentMetadata, HansardDocument};
use crate::parser::segments::{SegmentOutcome, SegmentReport};

/// Keep the parsed proceedings, in ToC order, under the metadata block.
pub fn assemble(metadata: DocumentMetadata, reports: Vec<SegmentReport>) -> HansardDocument {
    let proceedings = reports
        .into_iter()
        .filter_map(|r| match r.outcome {
            SegmentOutcome::Parsed(p) => Some(p),
            SegmentOutcome::Empty | SegmentOutcome::Failed(_) => None,
        })
        .collect();
    HansardDocument {
        document_metadata: metadata,
        proceedings,
    }
}

/// Write pretty-printed JSON, replacing whatever is at `path`.
pub fn write_document(path: &Path, doc: &HansardDocument) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(doc)
        .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    fs::write(path, json + "\n").map_err(io_err)
}

pub fn read_document(path: &Path) -> anyhow::Result<HansardDocument> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub struct DocumentStats {
    pub proceedings: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub interventions: usize,
    pub votes: usize,
    pub first_id: Option<u32>,
    pub last_id: Option<u32>,
}

pub fn summarize(doc: &HansardDocument) -> DocumentStats {
    let mut by_category = BTreeMap::new();
    for p in &doc.proceedings {
        *by_category.entry(p.category).or_insert(0) += 1;
    }
    DocumentStats {
        proceedings: doc.proceedings.len(),
        by_category,
        interventions: doc.proceedings.iter().map(|p| p.interventions.len()).sum(),
        votes: doc
            .proceedings
            .iter()
            .filter(|p| p.vote_result.is_some())
            .count(),
        first_id: doc.proceedings.first().map(|p| p.sequence_id),
        last_id: doc.proceedings.last().map(|p| p.sequence_id),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chamber, Intervention, Proceeding, VoteOutcome, VoteResult};
    use crate::parser::segments::PageSpan;
    use chrono::NaiveDate;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            chamber: Chamber::Senate,
            date: NaiveDate::from_ymd_opt(2025, 9, 4).unwrap(),
            parliament_session: "FORTY-EIGHTH PARLIAMENT, FIRST SESSION".into(),
        }
    }

    fn proceeding(id: u32, category: Category) -> Proceeding {
        Proceeding {
            sequence_id: id,
            category,
            title: format!("Item {}", id),
            stage: Some("Second Reading".into()),
            summary: "Debate resumed.".into(),
            key_topics: vec!["housing".into(), "energy".into()],
            interventions: vec![Intervention {
                speaker_name: "Senator Smith".into(),
                speaker_title: None,
                party: "ALP".into(),
                stance: "In favor".into(),
                speech_summary: "Supported the bill.".into(),
            }],
            vote_result: (category == Category::Bills).then(|| VoteResult {
                outcome: VoteOutcome::Negatived,
                ayes_count: 20,
                noes_count: 31,
                ayes_members: Some(vec!["Senator Smith".into()]),
                noes_members: None,
            }),
        }
    }

    fn report(id: u32, outcome: SegmentOutcome) -> SegmentReport {
        SegmentReport {
            sequence_id: id,
            title: format!("Item {}", id),
            span: PageSpan { start: id, end: id },
            outcome,
        }
    }

    fn sample() -> HansardDocument {
        assemble(
            metadata(),
            vec![
                report(1, SegmentOutcome::Parsed(proceeding(1, Category::Bills))),
                report(2, SegmentOutcome::Empty),
                report(3, SegmentOutcome::Failed("timeout".into())),
                report(4, SegmentOutcome::Parsed(proceeding(4, Category::Adjournment))),
            ],
        )
    }

    #[test]
    fn assemble_keeps_only_parsed_in_order() {
        let doc = sample();
        let ids: Vec<u32> = doc.proceedings.iter().map(|p| p.sequence_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let doc = sample();
        write_document(&path, &doc).unwrap();
        assert_eq!(read_document(&path).unwrap(), doc);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("document_metadata").is_some());
        assert_eq!(raw["proceedings"][0]["type"], "BILLS");
        assert_eq!(raw["proceedings"][1]["vote_result"], serde_json::Value::Null);
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "stale contents that are much longer than needed").unwrap();
        let doc = assemble(metadata(), vec![]);
        write_document(&path, &doc).unwrap();
        let back = read_document(&path).unwrap();
        assert!(back.proceedings.is_empty());
    }

    #[test]
    fn stats_count_categories_and_votes() {
        let s = summarize(&sample());
        assert_eq!(s.proceedings, 2);
        assert_eq!(s.by_category[&Category::Bills], 1);
        assert_eq!(s.by_category[&Category::Adjournment], 1);
        assert_eq!(s.interventions, 2);
        assert_eq!(s.votes, 1);
        assert_eq!((s.first_id, s.last_id), (Some(1), Some(4)));
    }
}
