use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Chamber {
    Senate,
    HouseOfRepresentatives,
}

impl FromStr for Chamber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "SENATE" => Ok(Chamber::Senate),
            "HOUSE_OF_REPRESENTATIVES" | "HOUSE" => Ok(Chamber::HouseOfRepresentatives),
            other => Err(format!("unknown chamber '{}'", other)),
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chamber::Senate => f.write_str("SENATE"),
            Chamber::HouseOfRepresentatives => f.write_str("HOUSE_OF_REPRESENTATIVES"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub chamber: Chamber,
    pub date: NaiveDate,
    pub parliament_session: String,
}

/// One line of the table of contents. `page_start` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub page_start: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Documents,
    Bills,
    Business,
    Motions,
    Notices,
    Committees,
    QuestionsWithoutNotice,
    StatementsBySenators,
    Adjournment,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Documents,
        Category::Bills,
        Category::Business,
        Category::Motions,
        Category::Notices,
        Category::Committees,
        Category::QuestionsWithoutNotice,
        Category::StatementsBySenators,
        Category::Adjournment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documents => "DOCUMENTS",
            Category::Bills => "BILLS",
            Category::Business => "BUSINESS",
            Category::Motions => "MOTIONS",
            Category::Notices => "NOTICES",
            Category::Committees => "COMMITTEES",
            Category::QuestionsWithoutNotice => "QUESTIONS_WITHOUT_NOTICE",
            Category::StatementsBySenators => "STATEMENTS_BY_SENATORS",
            Category::Adjournment => "ADJOURNMENT",
            Category::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proceeding {
    /// Filled in by the segment processor; the model never supplies it.
    #[serde(default)]
    pub sequence_id: u32,
    #[serde(rename = "type")]
    pub category: Category,
    pub title: String,
    #[serde(default)]
    pub stage: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,
    #[serde(default)]
    pub vote_result: Option<VoteResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub speaker_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_title: Option<String>,
    pub party: String,
    pub stance: String,
    pub speech_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    #[serde(rename = "Agreed to")]
    AgreedTo,
    Negatived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub outcome: VoteOutcome,
    pub ayes_count: u32,
    pub noes_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ayes_members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noes_members: Option<Vec<String>>,
}

/// The file written at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HansardDocument {
    pub document_metadata: DocumentMetadata,
    pub proceedings: Vec<Proceeding>,
}

// ── Tests ──
