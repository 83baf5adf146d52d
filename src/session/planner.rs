//! Keyword-based turn planner.
//!
//! Derives coarse next-steps from the inbound user text. Deliberately
//! simple and deterministic: the plan exists for client visibility, not
//! for steering the model, so the classifier can be swapped without
//! touching the turn logic.

use crate::protocol::{ContentBlock, PlanEntry, PlanPriority};

/// Keywords mapped to the step they suggest, checked in order.
const RULES: &[(&[&str], &str, PlanPriority)] = &[
    (
        &["read", "show", "open", "look at", "cat"],
        "Read the requested files",
        PlanPriority::High,
    ),
    (
        &["write", "create", "save", "add"],
        "Write the requested changes",
        PlanPriority::High,
    ),
    (
        &["fix", "debug", "error", "fail"],
        "Investigate and fix the reported problem",
        PlanPriority::High,
    ),
    (
        &["test", "verify", "check"],
        "Verify the result",
        PlanPriority::Medium,
    ),
    (
        &["explain", "describe", "what", "why", "how"],
        "Explain the findings",
        PlanPriority::Low,
    ),
];

/// Classify inbound content into an ordered plan.
///
/// Returns an empty plan when no rule matches; the caller skips the
/// plan update entirely in that case.
pub fn derive_plan(content: &[ContentBlock]) -> Vec<PlanEntry> {
    let text: String = content
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut entries = Vec::new();
    for (keywords, description, priority) in RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            entries.push(PlanEntry::new(*description, *priority));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PlanEntryStatus;

    fn text(s: &str) -> Vec<ContentBlock> {
        vec![ContentBlock::text(s)]
    }

    #[test]
    fn read_request_yields_read_step() {
        let plan = derive_plan(&text("please read README.md"));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].description, "Read the requested files");
        assert_eq!(plan[0].priority, PlanPriority::High);
        assert_eq!(plan[0].status, PlanEntryStatus::Pending);
    }

    #[test]
    fn multiple_rules_match_in_rule_order() {
        let plan = derive_plan(&text("read the config and fix the error"));
        let descriptions: Vec<_> = plan.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Read the requested files",
                "Investigate and fix the reported problem"
            ]
        );
    }

    #[test]
    fn unmatched_text_yields_empty_plan() {
        assert!(derive_plan(&text("hello there")).is_empty());
    }

    #[test]
    fn classification_is_deterministic() {
        let a = derive_plan(&text("check and verify the output"));
        let b = derive_plan(&text("check and verify the output"));
        assert_eq!(a, b);
    }
}
