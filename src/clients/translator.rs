//! LLM-backed translation of titles and summaries.
//!
//! Three request shapes are spoken, picked from the configured URL: a local
//! Ollama `generate` endpoint, SiliconFlow chat completions, and any other
//! OpenAI-compatible chat completions endpoint.

use crate::config::TranslationConfig;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Translation service is not configured")]
    NotConfigured,

    #[error("Translation API token is not configured")]
    MissingToken,

    #[error("Model is still loading, try again shortly")]
    ModelLoading,

    #[error("Translation API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Could not find translated text in the API response")]
    UnrecognizedResponse,

    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    Ollama,
    SiliconFlow,
    OpenAi,
}

impl ApiFlavor {
    #[must_use]
    pub fn detect(api_url: &str) -> Self {
        if api_url.contains("localhost:11434") || api_url.contains("127.0.0.1:11434") {
            Self::Ollama
        } else if api_url.contains("siliconflow.cn") {
            Self::SiliconFlow
        } else {
            Self::OpenAi
        }
    }
}

#[derive(Clone)]
pub struct Translator {
    client: Client,
    settings: TranslationConfig,
}

impl Translator {
    pub fn new(settings: TranslationConfig, timeout: Duration) -> Result<Self, TranslateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub const fn settings(&self) -> &TranslationConfig {
        &self.settings
    }

    #[must_use]
    pub fn flavor(&self) -> ApiFlavor {
        ApiFlavor::detect(&self.settings.api_url)
    }

    /// Blank input translates to an empty string without a request.
    pub async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let flavor = self.flavor();
        let token = self.settings.api_token.trim();
        if token.is_empty() && flavor != ApiFlavor::Ollama {
            return Err(TranslateError::MissingToken);
        }

        let url = endpoint_url(flavor, &self.settings.api_url);
        let body = payload(flavor, &self.settings, text);
        debug!(url = %url, model = %self.settings.model, ?flavor, "Sending translation request");

        let mut request = self.client.post(&url).json(&body);
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response.json().await?;
        let translated = extract_translation(flavor, &result)?;
        info!(chars = translated.chars().count(), "Translation received");
        Ok(translated)
    }
}

/// Ollama is always addressed through `/api/generate`.
#[must_use]
pub fn endpoint_url(flavor: ApiFlavor, api_url: &str) -> String {
    if flavor != ApiFlavor::Ollama {
        return api_url.to_string();
    }

    if api_url.contains("/api/chat") {
        return api_url.replace("/api/chat", "/api/generate");
    }
    if api_url.contains("/api/generate") {
        return api_url.to_string();
    }

    let base = api_url.trim_end_matches('/');
    if base.contains("/api") {
        format!("{base}/generate")
    } else {
        format!("{base}/api/generate")
    }
}

fn system_prompt(settings: &TranslationConfig) -> String {
    format!(
        "你是一个专业的{}到{}翻译器。",
        settings.source_lang, settings.target_lang
    )
}

fn user_prompt(settings: &TranslationConfig, text: &str) -> String {
    format!(
        "将以下{}文本翻译成{}，只返回翻译结果，不要解释：\n\n{text}",
        settings.source_lang, settings.target_lang
    )
}

#[must_use]
pub fn payload(flavor: ApiFlavor, settings: &TranslationConfig, text: &str) -> Value {
    let system = system_prompt(settings);
    let prompt = user_prompt(settings, text);

    match flavor {
        ApiFlavor::Ollama => json!({
            "model": settings.model,
            "prompt": format!("{system}\n{prompt}"),
            "stream": false,
            "options": {"temperature": 0.3, "top_p": 0.9},
        }),
        ApiFlavor::SiliconFlow => json!({
            "model": settings.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.3,
            "stream": false,
            "max_tokens": 1024,
            "top_p": 0.7,
            "top_k": 50,
            "response_format": {"type": "text"},
        }),
        ApiFlavor::OpenAi => json!({
            "model": settings.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.3,
        }),
    }
}

pub fn extract_translation(flavor: ApiFlavor, result: &Value) -> Result<String, TranslateError> {
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if flavor == ApiFlavor::Ollama {
        let text = non_empty(result.get("response"))
            .or_else(|| non_empty(result.pointer("/message/content")));
        if let Some(text) = text {
            return Ok(text);
        }
        if result.get("done_reason").and_then(Value::as_str) == Some("load") {
            return Err(TranslateError::ModelLoading);
        }
    }

    non_empty(result.pointer("/choices/0/message/content"))
        .or_else(|| non_empty(result.pointer("/choices/0/text")))
        .ok_or(TranslateError::UnrecognizedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> TranslationConfig {
        TranslationConfig {
            api_url: url.to_string(),
            ..TranslationConfig::default()
        }
    }

    #[test]
    fn test_flavor_detection() {
        assert_eq!(ApiFlavor::detect("http://localhost:11434"), ApiFlavor::Ollama);
        assert_eq!(
            ApiFlavor::detect("http://127.0.0.1:11434/api/chat"),
            ApiFlavor::Ollama
        );
        assert_eq!(
            ApiFlavor::detect("https://api.siliconflow.cn/v1/chat/completions"),
            ApiFlavor::SiliconFlow
        );
        assert_eq!(
            ApiFlavor::detect("https://api.openai.com/v1/chat/completions"),
            ApiFlavor::OpenAi
        );
    }

    #[test]
    fn test_ollama_url_rewrite() {
        let ollama = ApiFlavor::Ollama;
        assert_eq!(
            endpoint_url(ollama, "http://localhost:11434"),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            endpoint_url(ollama, "http://localhost:11434/"),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            endpoint_url(ollama, "http://localhost:11434/api/chat"),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            endpoint_url(ollama, "http://localhost:11434/api"),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            endpoint_url(ApiFlavor::OpenAi, "https://x/v1/chat"),
            "https://x/v1/chat"
        );
    }

    #[test]
    fn test_payload_shapes() {
        let s = settings("https://api.siliconflow.cn/v1/chat/completions");
        let body = payload(ApiFlavor::SiliconFlow, &s, "テスト");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(
            body["messages"][1]["content"]
                .as_str()
                .unwrap()
                .ends_with("テスト")
        );

        let body = payload(ApiFlavor::Ollama, &s, "テスト");
        assert_eq!(body["stream"], false);
        assert!(body.get("messages").is_none());
        assert!(body["prompt"].as_str().unwrap().contains("テスト"));

        let body = payload(ApiFlavor::OpenAi, &s, "テスト");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_known_shapes() {
        let ollama = json!({"response": " 你好 ", "done": true});
        assert_eq!(extract_translation(ApiFlavor::Ollama, &ollama).unwrap(), "你好");

        let ollama_chat = json!({"message": {"role": "assistant", "content": "你好"}});
        assert_eq!(
            extract_translation(ApiFlavor::Ollama, &ollama_chat).unwrap(),
            "你好"
        );

        let chat = json!({"choices": [{"message": {"content": "你好"}}]});
        assert_eq!(extract_translation(ApiFlavor::OpenAi, &chat).unwrap(), "你好");

        let legacy = json!({"choices": [{"text": "你好"}]});
        assert_eq!(
            extract_translation(ApiFlavor::SiliconFlow, &legacy).unwrap(),
            "你好"
        );
    }

    #[test]
    fn test_extract_model_loading_and_unknown() {
        let loading = json!({"response": "", "done_reason": "load"});
        assert!(matches!(
            extract_translation(ApiFlavor::Ollama, &loading),
            Err(TranslateError::ModelLoading)
        ));

        let unknown = json!({"data": "x"});
        assert!(matches!(
            extract_translation(ApiFlavor::OpenAi, &unknown),
            Err(TranslateError::UnrecognizedResponse)
        ));
    }

    #[tokio::test]
    async fn test_blank_text_and_missing_token() {
        let t = Translator::new(
            settings("https://api.openai.com/v1/chat/completions"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(t.translate("   ").await.unwrap(), "");
        assert!(matches!(
            t.translate("text").await,
            Err(TranslateError::MissingToken)
        ));
    }
}
