//! Abstract summarization prompts.

/// System prompt sent with every summary request
pub const SYSTEM_PROMPT: &str = "You are an expert in bioinformatics.";

/// User prompt template
/// Placeholder: {abstract}
pub const USER_PROMPT_TEMPLATE: &str =
    "Summarize the following scientific abstract in simple terms:\n\n{abstract}\n\nSummary:";

/// Build user prompt around a trimmed abstract
pub fn build_user_prompt(abstract_text: &str) -> String {
    USER_PROMPT_TEMPLATE.replace("{abstract}", abstract_text.trim())
}
