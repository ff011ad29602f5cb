use serde::Deserialize;
use tracing::{info, warn};

use super::schema;
use crate::error::PipelineError;
use crate::llm::{request_structured, CompletionBackend, CompletionRequest};
use crate::model::TocEntry;

#[derive(Deserialize)]
struct TocReply {
    #[serde(default)]
    entries: Vec<TocEntry>,
}

/// Ask the model for the table of contents found in `front_text`.
///
/// Any failure is fatal: without the ToC there are no segment boundaries.
pub async fn parse_toc<B>(backend: &B, front_text: &str) -> Result<Vec<TocEntry>, PipelineError>
where
    B: CompletionBackend + ?Sized,
{
    if front_text.trim().is_empty() {
        return Err(PipelineError::TocUnavailable(
            "front pages contain no text".into(),
        ));
    }

    let toc_schema = schema::toc_schema();
    let user = schema::toc_user_message(front_text);
    let request = CompletionRequest {
        system: schema::TOC_SYSTEM,
        user: &user,
        schema: &toc_schema,
    };
    let reply: TocReply = request_structured(backend, &request)
        .await
        .map_err(|e| PipelineError::TocUnavailable(e.to_string()))?;

    let entries = clean_entries(reply.entries);
    if entries.is_empty() {
        return Err(PipelineError::TocUnavailable(
            "model returned no entries".into(),
        ));
    }
    info!("Table of contents: {} entries", entries.len());
    Ok(entries)
}

fn clean_entries(raw: Vec<TocEntry>) -> Vec<TocEntry> {
    raw.into_iter()
        .filter_map(|mut e| {
            if e.page_start == 0 {
                warn!("Dropping ToC entry '{}' with page 0", e.title);
                return None;
            }
            e.title = e.title.trim().to_string();
            Some(e)
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::tests::ScriptedBackend;

    #[tokio::test]
    async fn parses_entries_in_order() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"entries":[
            {"title":"Bills","page_start":1},
            {"title":" Motions ","page_start":5},
            {"title":"Adjournment","page_start":9}
        ]}"#
            .into())]);
        let toc = parse_toc(&backend, "CONTENTS\nBills ... 1").await.unwrap();
        let titles: Vec<&str> = toc.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Bills", "Motions", "Adjournment"]);
        assert_eq!(toc[2].page_start, 9);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "hansard_toc");
        assert!(calls[0].1.contains("CONTENTS"));
    }

    #[tokio::test]
    async fn empty_result_is_fatal() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"entries":[]}"#.into())]);
        let err = parse_toc(&backend, "CONTENTS").await.unwrap_err();
        assert!(matches!(err, PipelineError::TocUnavailable(_)));
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let backend = ScriptedBackend::new(vec![Err(LlmError::Status {
            status: 429,
            body: "rate limited".into(),
        })]);
        let err = parse_toc(&backend, "CONTENTS").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn blank_front_pages_skip_the_call() {
        let backend = ScriptedBackend::new(vec![]);
        assert!(parse_toc(&backend, " \n\n ").await.is_err());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn page_zero_entries_dropped() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"entries":[
            {"title":"Cover","page_start":0},
            {"title":"Bills","page_start":2}
        ]}"#
            .into())]);
        let toc = parse_toc(&backend, "CONTENTS").await.unwrap();
        assert_eq!(toc, vec![TocEntry { title: "Bills".into(), page_start: 2 }]);
    }
}
