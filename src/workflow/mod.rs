//! The extraction and synthesis workflows and the session controller that
//! sequences them.

pub mod controller;
pub mod extraction;
pub mod schema;
pub mod synthesis;

pub use controller::{Controller, ControllerError};
pub use extraction::{ExtractionInput, MAX_EXTRACTED};
pub use synthesis::{SynthesisError, SynthesisOutcome, FALLBACK_RULE};

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::strip_code_fence;

    #[test]
    fn strips_labelled_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        assert_eq!(strip_code_fence("  ```\n[1, 2]\n```  \n"), "[1, 2]");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
    }
}
