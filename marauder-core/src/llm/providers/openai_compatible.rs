use std::time::Duration;

use async_trait::async_trait;
use marauder_config::MarauderConfig;
use marauder_config::constants::defaults;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::llm::provider::{
    FinishReason, LLMError, LLMErrorMetadata, LLMProvider, LLMRequest, LLMResponse, Message,
    ToolCall, Usage,
};

const PROVIDER_NAME: &str = "openai-compatible";

/// Any server speaking `POST {base_url}/chat/completions` with bearer auth.
pub struct OpenAICompatibleProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl OpenAICompatibleProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LLMError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(defaults::HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| LLMError::provider(format!("failed to build HTTP client: {err}")))?;
        Ok(Self::new_with_client(base_url, api_key, model, http_client))
    }

    pub fn new_with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        http_client: HttpClient,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &MarauderConfig) -> Result<Self, LLMError> {
        Self::new(&config.base_url, &config.api_key, &config.model)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_payload(&self, request: &LLMRequest) -> Result<Value, LLMError> {
        let mut payload = Map::new();
        let model = if request.model.trim().is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };
        payload.insert("model".to_owned(), Value::String(model));

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system_prompt) = &request.system_prompt {
            messages.push(json!({"role": "system", "content": system_prompt.as_str()}));
        }
        messages.extend(request.messages.iter().map(serialize_message));
        payload.insert("messages".to_owned(), Value::Array(messages));

        if let Some(tools) = &request.tools
            && !tools.is_empty()
        {
            payload.insert("tools".to_owned(), json!(tools.as_slice()));
        }

        if let Some(max_tokens) = request.max_tokens {
            payload.insert("max_tokens".to_owned(), json!(max_tokens));
        }

        if let Some(temperature) = request.temperature {
            let number = serde_json::Number::from_f64(f64::from(temperature)).ok_or_else(|| {
                LLMError::InvalidRequest {
                    message: "Invalid temperature value".to_owned(),
                    metadata: None,
                }
            })?;
            payload.insert("temperature".to_owned(), Value::Number(number));
        }

        Ok(Value::Object(payload))
    }

    fn error_for_status(status: StatusCode, body: String) -> LLMError {
        let metadata = Some(LLMErrorMetadata::new(
            PROVIDER_NAME,
            Some(status.as_u16()),
            Some(body.clone()),
        ));
        match status.as_u16() {
            401 | 403 => LLMError::Authentication {
                message: format!("HTTP {status} (check your API key)"),
                metadata,
            },
            429 => LLMError::RateLimit { metadata },
            400 | 404 | 422 => LLMError::InvalidRequest {
                message: format!("HTTP {status}: {body}"),
                metadata,
            },
            _ => LLMError::Provider {
                message: format!("HTTP {status}: {body}"),
                metadata,
            },
        }
    }
}

fn serialize_message(message: &Message) -> Value {
    let mut map = Map::new();
    map.insert(
        "role".to_owned(),
        Value::String(message.role.as_openai_str().to_owned()),
    );
    map.insert("content".to_owned(), Value::String(message.content.clone()));

    if let Some(tool_calls) = &message.tool_calls {
        map.insert("tool_calls".to_owned(), json!(tool_calls));
    }
    if let Some(tool_call_id) = &message.tool_call_id {
        map.insert(
            "tool_call_id".to_owned(),
            Value::String(tool_call_id.clone()),
        );
    }

    Value::Object(map)
}

fn parse_tool_call(value: &Value) -> Option<ToolCall> {
    let id = value.get("id").and_then(Value::as_str)?;
    let function = value.get("function")?.as_object()?;
    let name = function.get("name").and_then(Value::as_str)?;
    let arguments = match function.get("arguments") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "{}".to_owned(),
        Some(other) => other.to_string(),
    };
    Some(ToolCall::function(id, name, arguments))
}

/// Split message content into visible text and reasoning. Content is either a
/// string or an array of `text`/`thinking` parts; `reasoning_content` and
/// `reasoning` fields also count as reasoning.
fn extract_content(message: &Value) -> (String, String) {
    let mut text = String::new();
    let mut thinking = String::new();

    for key in ["reasoning_content", "reasoning"] {
        if let Some(reasoning) = message.get(key).and_then(Value::as_str)
            && !reasoning.trim().is_empty()
        {
            thinking.push_str(reasoning);
            break;
        }
    }

    match message.get("content") {
        Some(Value::String(content)) => text.push_str(content),
        Some(Value::Array(parts)) => {
            for part in parts {
                match part.get("type").and_then(Value::as_str) {
                    Some("thinking") => {
                        if let Some(value) = part.get("thinking").and_then(Value::as_str) {
                            thinking.push_str(value);
                        }
                    }
                    _ => {
                        if let Some(value) = part.get("text").and_then(Value::as_str) {
                            text.push_str(value);
                        }
                    }
                }
            }
        }
        _ => {}
    }

    (text.trim().to_owned(), thinking.trim().to_owned())
}

fn read_count(usage: &Value, key: &str) -> u32 {
    usage
        .get(key)
        .and_then(Value::as_u64)
        .map_or(0, |value| u32::try_from(value).unwrap_or(u32::MAX))
}

fn parse_response(response_json: &Value, fallback_model: &str) -> Result<LLMResponse, LLMError> {
    let choice = response_json
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| LLMError::provider("Invalid response format: missing choices"))?;
    let message = choice
        .get("message")
        .ok_or_else(|| LLMError::provider("Invalid response format: missing message"))?;

    let (text, thinking) = extract_content(message);

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect::<Vec<_>>())
        .filter(|calls| !calls.is_empty());

    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .map_or(FinishReason::Stop, FinishReason::from_wire);

    let usage = response_json.get("usage").map(|usage| {
        let prompt_tokens = read_count(usage, "prompt_tokens");
        let completion_tokens = read_count(usage, "completion_tokens");
        let mut parsed = Usage::new(prompt_tokens, completion_tokens);
        let total = read_count(usage, "total_tokens");
        if total > 0 {
            parsed.total_tokens = total;
        }
        parsed
    });

    let model = response_json
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(fallback_model)
        .to_owned();

    Ok(LLMResponse {
        content: (!text.is_empty()).then_some(text),
        tool_calls,
        model,
        usage,
        finish_reason,
        reasoning: (!thinking.is_empty()).then_some(thinking),
    })
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let payload = self.build_payload(&request)?;
        let url = format!("{}/chat/completions", self.base_url);
        debug!(
            %url,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, |tools| tools.len()),
            "sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LLMError::network(format!("request to {url} timed out"))
                } else {
                    LLMError::network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, body));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|err| LLMError::provider(format!("Failed to parse response: {err}")))?;

        parse_response(&response_json, &self.model)
    }
}
