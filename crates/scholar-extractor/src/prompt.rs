//! Prompt construction for research completions

/// Builds the prompt sent to the completion service
pub struct PromptBuilder {
    prompt: String,
    custom_instructions: Option<String>,
    request_citations: bool,
}

impl PromptBuilder {
    /// Create a new prompt builder for the user's prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            custom_instructions: None,
            request_citations: true,
        }
    }

    /// Prepend conversation-level instructions
    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.custom_instructions = if instructions.trim().is_empty() {
            None
        } else {
            Some(instructions)
        };
        self
    }

    /// Whether to ask for citation markers
    pub fn with_citations(mut self, request_citations: bool) -> Self {
        self.request_citations = request_citations;
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        if let Some(instructions) = &self.custom_instructions {
            prompt.push_str(instructions.trim());
            prompt.push_str("\n\n");
        }

        prompt.push_str(&self.prompt);

        if self.request_citations {
            prompt.push_str("\n\n");
            prompt.push_str(CITATION_INSTRUCTIONS);
        }

        prompt
    }
}

/// Instructions sent with every screenshot
pub const SCREENSHOT_PROMPT: &str = "Analyze this screenshot and provide detailed insights about what you see. \
Focus on the main content, UI elements, and any notable information displayed.";

const CITATION_INSTRUCTIONS: &str = "Please provide a comprehensive response with citations where applicable. \
Format citations as [CITATION]{title}|{url}|{text} if you reference external sources.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citations::count_markers;

    #[test]
    fn test_prompt_includes_user_text() {
        let prompt = PromptBuilder::new("What is CRISPR?").build();
        assert!(prompt.starts_with("What is CRISPR?"));
    }

    #[test]
    fn test_prompt_includes_marker_format() {
        let prompt = PromptBuilder::new("q").build();
        assert!(prompt.contains("[CITATION]{title}|{url}|{text}"));
    }

    #[test]
    fn test_instruction_example_is_itself_a_marker() {
        // An echoed instruction is parsed like any other marker.
        assert_eq!(count_markers(CITATION_INSTRUCTIONS), 1);
    }

    #[test]
    fn test_citations_can_be_disabled() {
        let prompt = PromptBuilder::new("q").with_citations(false).build();
        assert_eq!(prompt, "q");
    }

    #[test]
    fn test_custom_instructions_come_first() {
        let prompt = PromptBuilder::new("q")
            .with_custom_instructions("Answer in French.\n")
            .with_citations(false)
            .build();
        assert_eq!(prompt, "Answer in French.\n\nq");

        let prompt = PromptBuilder::new("q")
            .with_custom_instructions("   ")
            .with_citations(false)
            .build();
        assert_eq!(prompt, "q");
    }
}
