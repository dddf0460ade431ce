//! Prompt templates for the two Gemini generations
//!
//! Both templates take only the user's instruction and end with a
//! `Regex Pattern:` completion cue. The instruction is substituted
//! verbatim; no escaping or validation happens here.

/// Prompt asking for the regular expression that matches the text the
/// user wants changed.
pub fn regex_pattern_prompt(query: &str) -> String {
    format!(
        r#"Extract a Python-compatible regular expression from the natural language instruction. This regex should be
able to match the specified patterns that the user wants to highlight or replace in their data.
Only output the raw regex pattern itself, without any markdown, backticks, or explanations.
Do not include the word "Regex:" or any other prefix.

Instruction: "{query}"
Regex Pattern:"#
    )
}

/// Prompt asking for the replacement text to apply wherever the pattern
/// matches.
pub fn replacement_text_prompt(query: &str) -> String {
    format!(
        r#"Extract a Python-compatible regular expression from the natural language instruction.
This regex should match the exact replacement text that the user wants to apply to their data.
Only output the raw regex pattern itself, without any markdown, backticks, or explanations.
Do not include the word "Regex:" or any other prefix.

Instruction: "{query}"
Regex Pattern:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_prompt_embeds_query() {
        let prompt = regex_pattern_prompt("replace all digits with X");
        assert!(prompt.contains("Instruction: \"replace all digits with X\""));
        assert!(prompt.ends_with("Regex Pattern:"));
    }

    #[test]
    fn test_replacement_prompt_embeds_query() {
        let prompt = replacement_text_prompt("replace all digits with X");
        assert!(prompt.contains("Instruction: \"replace all digits with X\""));
        assert!(prompt.ends_with("Regex Pattern:"));
    }

    #[test]
    fn test_prompts_are_distinguishable() {
        let pattern = regex_pattern_prompt("q");
        let replacement = replacement_text_prompt("q");

        assert_ne!(pattern, replacement);
        assert!(pattern.contains("highlight or replace"));
        assert!(replacement.contains("exact replacement text"));
    }
}
