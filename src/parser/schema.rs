use serde_json::json;

use crate::llm::JsonSchema;
use crate::model::Category;

pub const TOC_SYSTEM: &str = "You are an expert parliamentary analyst specializing in Australian Hansard documents. \
You are given the opening pages of a Hansard transcript. Read its table of contents and list every proceeding \
in the order it appears, with the page number on which it starts.";

pub const PROCEEDING_SYSTEM: &str = "You are an expert parliamentary analyst specializing in parsing Australian Hansard documents. \
You are given the transcript of a single proceeding. Meticulously extract and structure it according to the provided JSON schema. \
Use null for a stage or vote result that does not apply.";

pub fn toc_user_message(front_text: &str) -> String {
    format!(
        "Here are the first pages of a Hansard document. Return its table of contents in the specified JSON format.\n\n{}",
        front_text
    )
}

pub fn proceeding_user_message(title: &str, segment_text: &str) -> String {
    format!(
        "The table of contents lists this proceeding as \"{}\". Parse the following transcript and provide the output in the specified JSON format. Here is the text:\n\n{}",
        title, segment_text
    )
}

pub fn toc_schema() -> JsonSchema {
    JsonSchema {
        name: "hansard_toc",
        strict: true,
        schema: json!({
            "type": "object",
            "properties": {
                "entries": {
                    "type": "array",
                    "description": "Table of contents entries in document order.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "The heading exactly as printed in the table of contents."
                            },
                            "page_start": {
                                "type": "integer",
                                "description": "The page on which this item begins."
                            }
                        },
                        "required": ["title", "page_start"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["entries"],
            "additionalProperties": false
        }),
    }
}

pub fn proceeding_schema() -> JsonSchema {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    JsonSchema {
        name: "hansard_proceeding",
        strict: true,
        schema: json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": categories,
                    "description": "The general category of the proceeding from the Table of Contents."
                },
                "title": {
                    "type": "string",
                    "description": "The specific title of the bill, motion, or topic being discussed."
                },
                "stage": {
                    "type": ["string", "null"],
                    "description": "The procedural stage if applicable (e.g., 'Second Reading', 'In Committee'). Null if not applicable."
                },
                "summary": {
                    "type": "string",
                    "description": "A 2-3 sentence high-level summary of the entire proceeding, including the key issue and outcome if any."
                },
                "key_topics": {
                    "type": "array",
                    "description": "An array of 5-7 key noun phrases or topics discussed in this proceeding.",
                    "items": { "type": "string" }
                },
                "interventions": {
                    "type": "array",
                    "description": "A list of speeches or significant comments made during the proceeding.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "speaker_name": { "type": "string" },
                            "speaker_title": { "type": ["string", "null"], "description": "The speaker's title, including electorate or state. Null if not stated." },
                            "party": { "type": "string", "description": "The speaker's political party." },
                            "stance": { "type": "string", "description": "A brief description of their position (e.g., 'In favor', 'Against', 'Questioning')." },
                            "speech_summary": { "type": "string", "description": "A 1-2 sentence summary of the speaker's main arguments." }
                        },
                        "required": ["speaker_name", "speaker_title", "party", "stance", "speech_summary"],
                        "additionalProperties": false
                    }
                },
                "vote_result": {
                    "type": ["object", "null"],
                    "description": "Details of any formal vote (Division) that occurred. Null if no vote.",
                    "properties": {
                        "outcome": { "type": "string", "enum": ["Agreed to", "Negatived"] },
                        "ayes_count": { "type": "integer" },
                        "noes_count": { "type": "integer" },
                        "ayes_members": { "type": ["array", "null"], "items": { "type": "string" } },
                        "noes_members": { "type": ["array", "null"], "items": { "type": "string" } }
                    },
                    "required": ["outcome", "ayes_count", "noes_count", "ayes_members", "noes_members"],
                    "additionalProperties": false
                }
            },
            "required": ["type", "title", "stage", "summary", "key_topics", "interventions", "vote_result"],
            "additionalProperties": false
        }),
    }
}
