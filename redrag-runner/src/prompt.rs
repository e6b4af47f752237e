//! Prompt assembly.

const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant. Use the following context and conversation history to answer the user's question.";

const CLOSING_INSTRUCTION: &str = "Please provide a helpful, accurate response based on the context and conversation history. If the context doesn't contain relevant information, say so politely.";

/// Render the single prompt sent to the model.
pub fn build_prompt(context: &str, chat_history: &str, question: &str) -> String {
    format!(
        "System: {SYSTEM_INSTRUCTION}\n\
         Context: {context}\n\
         Conversation History: {chat_history}\n\
         {CLOSING_INSTRUCTION}\n\
         Human: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_appear_in_order() {
        let prompt = build_prompt("Redis is fast.", "human: hi", "What is Redis?");
        let context = prompt.find("Context: Redis is fast.").unwrap();
        let history = prompt.find("Conversation History: human: hi").unwrap();
        let question = prompt.find("Human: What is Redis?").unwrap();

        assert!(prompt.starts_with("System: You are a helpful AI assistant."));
        assert!(context < history && history < question);
        assert!(prompt.ends_with("What is Redis?"));
    }
}
