pub const SYSTEM_PROMPT: &str = "You are an AI assistant. Use the following transcript...";

pub fn question_prompt(transcript: &str, question: &str) -> String {
    format!(
        "Transcript:\n\"{}\"\n\nQuestion:\n{}\n\nAnswer concisely:",
        transcript, question
    )
}
