//! Termination policy for the planning loop.
//!
//! Two independent checks, combined by OR: a hard ceiling on cumulative
//! tool calls, and a best-effort scan of assistant text for the markers
//! of an already-complete itinerary. Neither check knows about the other.

use crate::llm::ChatMessage;

/// What the loop should do with a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Execute the attached tool calls and continue the conversation.
    DispatchTools,
    /// Treat the response as the final answer.
    Finish,
}

/// Decide the next step for a model response.
pub fn next_step(response: &ChatMessage, tool_calls_made: usize, max_tool_calls: usize) -> Step {
    if tool_calls_made >= max_tool_calls {
        return Step::Finish;
    }

    // A response that already reads as a finished itinerary ends the
    // conversation even when the model attached further tool calls;
    // models sometimes keep requesting data after answering.
    if response
        .content
        .as_deref()
        .is_some_and(itinerary_complete)
    {
        return Step::Finish;
    }

    if response.has_tool_calls() {
        Step::DispatchTools
    } else {
        Step::Finish
    }
}

/// Best-effort detection of a finished itinerary in assistant text.
///
/// Matches the day-by-day section heading the output format mandates, or
/// the trip title marker together with its duration phrase. Purely
/// textual: a partial response that happens to quote these headings will
/// match too, and that false positive is accepted rather than corrected.
pub fn itinerary_complete(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("## 📅 detailed day-by-day itinerary")
        || (text.contains("# ✈️") && text.contains("day trip:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FunctionCall, ToolCall};

    fn with_calls(content: Option<&str>, call_count: usize) -> ChatMessage {
        let calls = (0..call_count)
            .map(|i| ToolCall {
                id: format!("call-{}", i),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: "search_flights".to_string(),
                    arguments: "{}".to_string(),
                },
            })
            .collect();
        ChatMessage {
            role: crate::llm::Role::Assistant,
            content: content.map(str::to_string),
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    #[test]
    fn tool_calls_route_to_dispatch_under_the_ceiling() {
        let response = with_calls(Some("let me check flights"), 1);
        assert_eq!(next_step(&response, 3, 10), Step::DispatchTools);
    }

    #[test]
    fn ceiling_finishes_regardless_of_tool_calls() {
        let response = with_calls(Some("one more lookup"), 2);
        assert_eq!(next_step(&response, 10, 10), Step::Finish);
    }

    #[test]
    fn plain_text_response_finishes() {
        let response = ChatMessage::assistant("here is your plan");
        assert_eq!(next_step(&response, 0, 10), Step::Finish);
    }

    #[test]
    fn detected_itinerary_overrides_attached_tool_calls() {
        let text = "# ✈️ 3-Day Trip: Delhi → Goa\n...\n## 📅 DETAILED DAY-BY-DAY ITINERARY\nDay 1 ...";
        let response = with_calls(Some(text), 1);
        assert_eq!(next_step(&response, 2, 10), Step::Finish);
    }

    #[test]
    fn heuristic_matches_either_marker() {
        assert!(itinerary_complete("## 📅 Detailed Day-by-Day Itinerary"));
        assert!(itinerary_complete("# ✈️ 5-Day Trip: Mumbai → Bali\nmore text"));
        assert!(!itinerary_complete("# ✈️ Flight options listed below"));
        assert!(!itinerary_complete("working on the day trip: section next"));
    }
}
