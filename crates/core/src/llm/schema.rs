use serde_json::{Value, json};

use crate::types::SegmentLabel;

/// JSON Schema the model's answer is asked to follow.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

fn label_enum() -> Value {
    Value::Array(
        SegmentLabel::ALL
            .iter()
            .map(|label| Value::String(label.as_str().to_string()))
            .collect(),
    )
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

pub fn global_analysis_schema() -> ResponseSchema {
    ResponseSchema {
        name: "global_analysis",
        schema: json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" },
                "pacingScore": { "type": "number" },
                "hookScore": { "type": "number" },
                "dominantTone": { "type": "string" },
                "keyPatterns": string_array(),
                "writingStyle": {
                    "type": "object",
                    "properties": {
                        "toneKeywords": string_array(),
                        "voiceDescription": { "type": "string" },
                        "instructionalDirective": { "type": "string" },
                        "rhetoricalDevices": string_array(),
                        "complexityLevel": { "type": "string" },
                    },
                },
            },
            "required": ["summary", "pacingScore", "hookScore", "dominantTone", "keyPatterns"],
        }),
    }
}

pub fn segment_labels_schema() -> ResponseSchema {
    ResponseSchema {
        name: "segment_labels",
        schema: json!({
            "type": "object",
            "properties": {
                "segments": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "index": { "type": "number", "description": "The ID provided in input" },
                            "label": { "type": "string", "enum": label_enum() },
                            "analysis": {
                                "type": "string",
                                "description": "Max 10 words reason in target language",
                            },
                        },
                        "required": ["index", "label", "analysis"],
                    },
                },
            },
            "required": ["segments"],
        }),
    }
}

pub fn master_template_schema() -> ResponseSchema {
    ResponseSchema {
        name: "master_template",
        schema: json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "targetAudience": { "type": "string" },
                "structure": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "section": { "type": "string", "enum": label_enum() },
                            "durationPercent": { "type": "string" },
                            "description": { "type": "string" },
                            "examplePhrases": string_array(),
                        },
                    },
                },
                "winningFormula": { "type": "string" },
                "tips": string_array(),
            },
            "required": ["title", "targetAudience", "structure", "winningFormula", "tips"],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_schema_enumerates_the_closed_set() {
        let schema = segment_labels_schema();
        let labels = &schema.schema["properties"]["segments"]["items"]["properties"]["label"]["enum"];
        assert_eq!(labels.as_array().map(Vec::len), Some(7));
        assert!(labels.as_array().unwrap().contains(&json!("PATTERN_INTERRUPT")));
    }

    #[test]
    fn every_schema_has_an_object_root() {
        for schema in [
            global_analysis_schema(),
            segment_labels_schema(),
            master_template_schema(),
        ] {
            assert_eq!(schema.schema["type"], "object", "{} root", schema.name);
        }
    }

    #[test]
    fn label_entries_are_wrapped_in_segments() {
        let schema = segment_labels_schema().schema;
        assert_eq!(schema["required"], json!(["segments"]));
        assert_eq!(schema["properties"]["segments"]["type"], "array");

        let answer = json!({"segments": [{"index": 1, "label": "HOOK", "analysis": "a"}]});
        let entries = crate::llm::locate_result_array(answer).unwrap();
        assert_eq!(entries[0]["label"], "HOOK");
    }

    #[test]
    fn schemas_have_distinct_names() {
        let names = [
            global_analysis_schema().name,
            segment_labels_schema().name,
            master_template_schema().name,
        ];
        assert_eq!(names, ["global_analysis", "segment_labels", "master_template"]);
    }
}
