//! Quiz generation through the OpenAI chat completions API. The model's
//! output is advisory; [`normalize`] clamps it to the requested shape
//! before anyone else sees it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PoolConfig, QuestionType, QuizDocument};
use crate::names;

const PROMPT_TEMPLATE: &str = include_str!("../prompts/quiz-generation.txt");

const SYSTEM_PROMPT: &str =
    "You are an expert at building learning quizzes. Respond with valid JSON only, no extra text.";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("no content provided")]
    MissingInput,
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// What the author asked for, as posted in the `config` form field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub target_audience: String,
    pub question_count: u32,
    pub answers_per_question: u32,
    pub allow_multiple_answers: bool,
    pub quiz_title: String,
    #[serde(default)]
    pub pool_size: Option<u32>,
}

impl GenerationConfig {
    /// How many questions to request from the model. A pool generates more
    /// questions than a single game presents.
    pub fn effective_count(&self) -> u32 {
        match self.pool_size {
            Some(pool_size) if pool_size > 0 => pool_size,
            _ => self.question_count,
        }
    }
}

#[derive(Clone)]
pub struct Generator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Generator {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    /// Fill the instruction template. The answers-per-question and title
    /// slots appear more than once and are replaced everywhere; content
    /// goes in last so placeholder-looking text inside it stays untouched.
    pub fn build_prompt(config: &GenerationConfig, content: &str) -> String {
        let answer_type = if config.allow_multiple_answers {
            "MultipleAnswer (several answers may be correct)"
        } else {
            "SingleAnswer (exactly one correct answer)"
        };

        PROMPT_TEMPLATE
            .replacen("{{TARGET_AUDIENCE}}", &config.target_audience, 1)
            .replace("{{QUESTION_COUNT}}", &config.effective_count().to_string())
            .replace(
                "{{ANSWERS_PER_QUESTION}}",
                &config.answers_per_question.to_string(),
            )
            .replacen("{{ANSWER_TYPE}}", answer_type, 1)
            .replace("{{QUIZ_TITLE}}", &config.quiz_title)
            .replacen("{{CONTENT}}", content, 1)
    }

    /// One round trip to the model: prompt in, parsed and normalized quiz
    /// document out.
    pub async fn generate(
        &self,
        config: &GenerationConfig,
        content: &str,
    ) -> Result<QuizDocument, GenerateError> {
        if content.trim().is_empty() {
            return Err(GenerateError::MissingInput);
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(config, content),
                },
            ],
            temperature: names::GENERATION_TEMPERATURE,
            max_tokens: names::GENERATION_MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(names::OPENAI_CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Upstream(format!("model request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("model API returned {status}: {body}");
            return Err(GenerateError::Upstream(format!(
                "model API returned {status}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Upstream(format!("unreadable completion: {e}")))?;

        let raw = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| GenerateError::Upstream("empty completion".to_string()))?;

        let mut doc: QuizDocument = serde_json::from_str(raw)
            .map_err(|e| GenerateError::Upstream(format!("completion is not a quiz: {e}")))?;
        if doc.topic.is_empty() {
            return Err(GenerateError::Upstream(
                "completion has no topic".to_string(),
            ));
        }

        normalize(&mut doc, config);

        tracing::info!(
            "generated quiz '{}' with {} questions",
            doc.topic,
            doc.questions.len()
        );
        Ok(doc)
    }
}

/// Clamp a generated document to the requested shape:
/// 1. drop questions beyond the effective count (never pad),
/// 2. drop answers beyond the per-question count,
/// 3. force the question type the author configured,
/// 4. a question with no correct answer gets its first answer marked
///    correct with a placeholder comment,
/// 5. a single-answer question keeps only its first correct answer,
/// 6. a requested pool is attached as the document's pool config.
pub fn normalize(doc: &mut QuizDocument, config: &GenerationConfig) {
    let target = config.effective_count() as usize;
    if doc.questions.len() > target {
        doc.questions.truncate(target);
    }

    for question in &mut doc.questions {
        if question.answers.len() > config.answers_per_question as usize {
            question.answers.truncate(config.answers_per_question as usize);
        }

        question.question_type = if config.allow_multiple_answers {
            QuestionType::MultipleAnswer
        } else {
            QuestionType::SingleAnswer
        };

        if !question.answers.iter().any(|answer| answer.correct) {
            if let Some(first) = question.answers.first_mut() {
                first.correct = true;
                first.comment = names::CORRECT_ANSWER_PLACEHOLDER.to_string();
            }
        }

        if question.question_type == QuestionType::SingleAnswer {
            let mut seen_correct = false;
            for answer in &mut question.answers {
                if answer.correct {
                    if seen_correct {
                        answer.correct = false;
                    }
                    seen_correct = true;
                }
            }
        }
    }

    if let Some(pool_size) = config.pool_size.filter(|&pool_size| pool_size > 0) {
        doc.pool_config = Some(PoolConfig {
            pool_size,
            questions_per_game: config.question_count,
        });
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
