use crate::providers::gemini::{GenerateContentResponse, Part};

/// Concatenates the text of every text part across every candidate, in
/// order. Non-text parts and candidates without content are skipped. An
/// empty response renders as an empty string.
pub fn render(response: &GenerateContentResponse) -> String {
    let mut out = String::new();
    for candidate in &response.candidates {
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                if let Part::Text { text } = part {
                    out.push_str(text);
                }
            }
        }
    }
    out
}
