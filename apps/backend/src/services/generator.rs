//! AI content generation through the Gemini `generateContent` REST API.
//!
//! Produces flashcards, mnemonics, memorization test items, key-concept
//! lists, palace images and the loci visible in them, and plays the student
//! in Feynman-technique chats. Every call is a single request; retries are
//! left to the user ("generation failed, try again").

use palace_core::TestKind;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::GeneratorConfig;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Content generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("content generator is not configured (set GEMINI_API_KEY)")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("generator API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("generator returned no usable content")]
    EmptyResponse,

    #[error("malformed generator output: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Persona the model is asked to adopt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CognitiveRole {
    /// Builds vivid, bizarre mental images.
    Architect,
    /// Picks the 20% of concepts that carry 80% of a topic.
    Analyst,
    /// A curious child the learner has to explain a concept to.
    Feynman,
}

impl CognitiveRole {
    fn system_instruction(self) -> &'static str {
        match self {
            Self::Architect => {
                "You are a visual memory architect versed in cognitive neuroscience. \
                 Build mnemonics with the elaboration principle: \
                 1. Recode abstract terms into familiar, similar-sounding words. \
                 2. Relate the familiar word to the concept through a dynamic, bizarre interaction. \
                 3. Visualize an exaggerated scene that engages the senses and emotions. \
                 Learning the mnemonic must take less effort than learning the raw content. \
                 Prefer bizarre, funny or emotional images."
            }
            Self::Analyst => {
                "You are a strategic analyst. Identify the 20% of concepts (Pareto principle) \
                 that are fundamental to understanding a topic, chunking dense information \
                 into groups."
            }
            Self::Feynman => {
                "You are a curious 10-year-old student. Ask for simple explanations. \
                 Follow the rule: if you cannot explain it simply, you have not understood it."
            }
        }
    }
}

/// Speaker of one chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One message of a Feynman chat. The client keeps the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Question/answer pair proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub question: String,
    pub answer: String,
}

// === Wire types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<ChatRole>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ChatRole::User),
            parts,
        }
    }

    fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .into_iter()
            .flat_map(|candidate| candidate.content.parts.iter())
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    fn inline_image(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

// === Client ===

/// Gemini client.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    text_model: String,
    image_model: String,
    language: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client, or `None` when no API key is configured.
    pub fn from_config(config: &GeneratorConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            language: config.content_language.clone(),
            base_url: API_BASE.to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Point the client at another API root, such as a local stand-in.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `count` short question/answer cards about `concepts` within `theme`.
    pub async fn generate_flashcards(
        &self,
        theme: &str,
        concepts: &[&str],
        count: usize,
    ) -> Result<Vec<GeneratedCard>> {
        let prompt = format!(
            "Generate {count} flashcards (a question and a short answer) for the theme \"{theme}\" \
             based on these concepts: {}. Write them in {}.",
            concepts.join(", "),
            self.language
        );
        let schema = json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "question": { "type": "STRING" },
                    "answer": { "type": "STRING" }
                },
                "required": ["question", "answer"]
            }
        });
        let text = self.ask_json(None, prompt, schema).await?;
        parse_list(&text)
    }

    /// Mnemonic that ties a card's answer to its question.
    pub async fn suggest_mnemonic(&self, question: &str, answer: &str) -> Result<String> {
        let prompt = format!(
            "Create a strong mnemonic in {} for:\nQuestion: {question}\nAnswer: {answer}\n\
             Apply recoding, relating and visualizing.",
            self.language
        );
        self.ask_text(Some(CognitiveRole::Architect), prompt).await
    }

    /// Items for a memorization trial.
    pub async fn generate_test_items(&self, kind: TestKind, count: usize) -> Result<Vec<String>> {
        let prompt = match kind {
            TestKind::Words => format!(
                "Generate a list of {count} concrete, random words in {}.",
                self.language
            ),
            TestKind::Numbers => format!("Generate a list of {count} random two-digit numbers."),
        };
        let text = self.ask_json(None, prompt, string_list_schema()).await?;
        parse_list(&text)
    }

    /// Ten fundamental concepts of a theme.
    pub async fn key_concepts(&self, theme: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Analyze the theme \"{theme}\" and apply chunking to list its 10 fundamental \
             concepts, in {}.",
            self.language
        );
        let text = self
            .ask_json(Some(CognitiveRole::Analyst), prompt, string_list_schema())
            .await?;
        parse_list(&text)
    }

    /// Vivid scene linking a palace object to a concept.
    pub async fn bizarre_mnemonic(&self, object: &str, concept: &str) -> Result<String> {
        let prompt = format!(
            "Object: \"{object}\". Concept: \"{concept}\". Create the visual scene in {}.",
            self.language
        );
        self.ask_text(Some(CognitiveRole::Architect), prompt).await
    }

    /// Picture of the palace as a `data:` URL.
    pub async fn palace_image(&self, description: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text(format!(
                "Realistic architecture of a memory palace: {description}. \
                 NO text. Rich in physical loci. High quality."
            ))])],
            system_instruction: None,
            generation_config: Some(json!({
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9" }
            })),
        };
        let response = self.generate(&self.image_model, &request).await?;
        let image = response.inline_image().ok_or(GeneratorError::EmptyResponse)?;
        Ok(format!("data:{};base64,{}", image.mime_type, image.data))
    }

    /// Twelve clearly visible objects in a palace image, usable as loci.
    pub async fn extract_loci(&self, image_url: &str) -> Result<Vec<String>> {
        let (mime_type, data) = split_data_url(image_url).ok_or(GeneratorError::EmptyResponse)?;
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::image(mime_type, data),
                Part::text(format!(
                    "Identify 12 clear physical objects to serve as loci. \
                     Name them in {}. JSON array of strings.",
                    self.language
                )),
            ])],
            system_instruction: None,
            generation_config: Some(json_config(string_list_schema())),
        };
        let response = self.generate(&self.text_model, &request).await?;
        parse_list(&response.text().unwrap_or_default())
    }

    /// The student's next reply in a Feynman chat about `concept`.
    ///
    /// `history` ends with the learner's latest message.
    pub async fn feynman_reply(
        &self,
        theme: &str,
        concept: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let instruction = format!(
            "{} Theme: \"{theme}\". Concept: \"{concept}\". Reply in {}.",
            CognitiveRole::Feynman.system_instruction(),
            self.language
        );
        let request = GenerateRequest {
            contents: chat_contents(history),
            system_instruction: Some(Content::instruction(instruction)),
            generation_config: None,
        };
        let response = self.generate(&self.text_model, &request).await?;
        response.text().ok_or(GeneratorError::EmptyResponse)
    }

    async fn ask_text(&self, role: Option<CognitiveRole>, prompt: String) -> Result<String> {
        let request = text_request(role, prompt, None);
        let response = self.generate(&self.text_model, &request).await?;
        response.text().ok_or(GeneratorError::EmptyResponse)
    }

    async fn ask_json(
        &self,
        role: Option<CognitiveRole>,
        prompt: String,
        schema: Value,
    ) -> Result<String> {
        let request = text_request(role, prompt, Some(json_config(schema)));
        let response = self.generate(&self.text_model, &request).await?;
        Ok(response.text().unwrap_or_default())
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!(model, "calling content generator");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

fn text_request(
    role: Option<CognitiveRole>,
    prompt: String,
    generation_config: Option<Value>,
) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::user(vec![Part::text(prompt)])],
        system_instruction: role.map(|role| Content::instruction(role.system_instruction())),
        generation_config,
    }
}

/// Chat turns as request contents. The API wants the user to speak first,
/// so a leading greeting from the model is left out.
fn chat_contents(history: &[ChatTurn]) -> Vec<Content> {
    history
        .iter()
        .skip_while(|turn| turn.role == ChatRole::Model)
        .map(|turn| Content {
            role: Some(turn.role),
            parts: vec![Part::text(turn.text.clone())],
        })
        .collect()
}

fn json_config(schema: Value) -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": schema
    })
}

fn string_list_schema() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Parse a JSON array answer; an empty answer is an empty list.
fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text.trim())?)
}

/// Split `data:<mime>;base64,<payload>` into its mime type and payload.
fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64").unwrap_or(meta);
    Some((mime_type, data))
}
