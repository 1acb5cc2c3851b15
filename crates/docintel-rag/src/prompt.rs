//! Prompt construction for grounded question answering

use docintel_domain::RetrievalResult;

/// System instructions for answering from retrieved context only
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a logistics document expert. \
Answer questions based ONLY on the provided context from the document.

RULES:
1. Only use information from the context
2. If the answer isn't in the context, say \"Not found in document\"
3. Be concise and specific
4. Include relevant details like dates, names, and numbers when available
5. Never make up information";

/// Separator between retrieved chunks in the context window
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Concatenate retrieved chunks in retrieval order
pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// User turn combining the context window and the question
pub fn build_user_prompt(context: &str, question: &str) -> String {
    format!(
        "CONTEXT:\n{}\n\nQUESTION: {}\n\nANSWER (based only on the context above):",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_order() {
        let results = vec![
            RetrievalResult::new("second best", 0.6, 4),
            RetrievalResult::new("best", 0.9, 1),
        ];
        assert_eq!(build_context(&results), "second best\n\nbest");
    }

    #[test]
    fn test_user_prompt_layout() {
        let prompt = build_user_prompt("Shipper: ABC Corp", "Who is the shipper?");
        assert!(prompt.starts_with("CONTEXT:\nShipper: ABC Corp\n\n"));
        assert!(prompt.contains("QUESTION: Who is the shipper?"));
        assert!(prompt.ends_with("ANSWER (based only on the context above):"));
    }

    #[test]
    fn test_system_prompt_mentions_refusal_phrase() {
        assert!(ANSWER_SYSTEM_PROMPT.contains("Not found in document"));
    }
}
