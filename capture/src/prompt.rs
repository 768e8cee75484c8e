//! Instruction text sent to the completion service.

/// System instruction listing the known categories and the output contract.
pub fn system_prompt(categories: &[String]) -> String {
    format!(
        "You are a personal idea organizer. You turn raw, unstructured thoughts into clean, \
         organized entries.\n\
         \n\
         Available categories: {}\n\
         \n\
         Rules:\n\
         - Pick the most appropriate category from the list above\n\
         - If none fit well, suggest a new category name (short, title-case, 1-3 words)\n\
         - Return ONLY valid JSON with the keys title, summary, category, tags, priority; no other text\n\
         - title: max 8 words, punchy and specific\n\
         - summary: 1-2 clean sentences capturing the core idea\n\
         - tags: up to 3 lowercase keyword strings\n\
         - priority: \"normal\", \"important\", or \"urgent\" based on time-sensitivity or \
         importance signals in the text",
        categories.join(", "),
    )
}

pub fn user_message(raw_input: &str) -> String {
    format!("Here is the raw input to process:\n\n{raw_input}")
}
