pub mod openai;
pub mod prompts;

use crate::config::settings::LlmConfig;
use crate::error::{ProfessorError, Result};
use openai::{ChatMessage, Sampling};

const NO_RESPONSE: &str = "No response.";

/// Ask a one-shot question about a transcript.
pub async fn answer_question(config: &LlmConfig, transcript: &str, question: &str) -> Result<String> {
    if question.trim().is_empty() {
        return Err(ProfessorError::Validation("Question is empty".to_string()));
    }

    let api_key = config.api_key.as_deref().ok_or_else(|| {
        ProfessorError::Config("LLM API key not configured (set OPENAI_API_KEY)".to_string())
    })?;

    tracing::info!(
        "Asking {} about transcript ({} chars): {}",
        config.model,
        transcript.len(),
        question
    );

    let messages = vec![
        ChatMessage::system(prompts::SYSTEM_PROMPT),
        ChatMessage::user(prompts::question_prompt(transcript, question)),
    ];
    let sampling = Sampling {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let content = openai::complete(&config.base_url, api_key, &config.model, messages, sampling)
        .await
        .map_err(|e| ProfessorError::Api(format!("{:#}", e)))?;

    Ok(normalize_answer(content))
}

fn normalize_answer(content: Option<String>) -> String {
    content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}
