//! Structured-output schemas sent to the generative service.
//!
//! These use the service's OpenAPI subset (upper-case type names).

use serde_json::{json, Value};

/// Schema for [`ExtractionResult`](crate::models::ExtractionResult).
pub fn extraction_result_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "domain": { "type": "STRING" },
            "blocks": {
                "type": "ARRAY",
                "items": insight_block_schema()
            }
        },
        "required": ["domain", "blocks"]
    })
}

/// Schema for one [`InsightBlock`](crate::models::InsightBlock).
pub fn insight_block_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "foundationalRule": { "type": "STRING" },
            "whyItWorks": { "type": "STRING" },
            "analogy": { "type": "STRING" },
            "analogousFoundationalConcept": { "type": "STRING" },
            "commonConfusion": { "type": "STRING" },
            "examEliminationCue": { "type": "STRING" },
            "memoryHook": { "type": "STRING" }
        },
        "required": ["foundationalRule", "whyItWorks", "analogy", "memoryHook"]
    })
}
