//! OpenAI-compatible planner implementation.
//!
//! Implements the core's [`Planner`] seam against any chat-completions
//! endpoint that speaks the OpenAI wire format (OpenAI itself, plus the
//! usual self-hosted gateways). The operation catalog is advertised as
//! function tools; returned `tool_calls` become [`OperationRequest`]s on
//! the assistant turn.

use crate::config::PlannerConfig;
use async_trait::async_trait;
use mailgraph_agent::{Planner, PlannerError};
use mailgraph_session::{OperationRequest, Turn, TurnRole};
use mailgraph_tools::ToolMetadata;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Chat-completions client implementing the planner seam.
#[derive(Clone)]
pub struct OpenAiPlanner {
    config: PlannerConfig,
    client: Client,
    catalog: Vec<ToolMetadata>,
}

impl OpenAiPlanner {
    /// Create a planner advertising the given operation catalog.
    pub fn new(config: PlannerConfig, catalog: Vec<ToolMetadata>) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            catalog,
        }
    }

    /// Convert a turn to the chat-completions message format.
    fn convert_turn(&self, turn: &Turn) -> ApiMessage {
        match turn.role {
            TurnRole::User => ApiMessage {
                role: "user".to_string(),
                content: Some(turn.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            TurnRole::Assistant => ApiMessage {
                role: "assistant".to_string(),
                content: if turn.content.is_empty() {
                    None
                } else {
                    Some(turn.content.clone())
                },
                tool_calls: turn.operations.as_ref().map(|ops| {
                    ops.iter()
                        .map(|op| ApiToolCall {
                            id: op.id.clone(),
                            call_type: "function".to_string(),
                            function: ApiFunctionCall {
                                name: op.name.clone(),
                                arguments: op.args.to_string(),
                            },
                        })
                        .collect()
                }),
                tool_call_id: None,
            },
            TurnRole::ToolResult => ApiMessage {
                role: "tool".to_string(),
                content: Some(turn.content.clone()),
                tool_calls: None,
                tool_call_id: turn.operation_id.clone(),
            },
        }
    }

    /// Advertise the catalog as function tools.
    fn tool_specs(&self) -> Vec<Value> {
        self.catalog
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.input_schema.clone().unwrap_or_else(
                            || json!({"type": "object", "properties": {}})
                        ),
                    }
                })
            })
            .collect()
    }

    /// Convert the API response into an assistant turn.
    fn convert_response(&self, response: ApiResponse) -> Result<Turn, PlannerError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::InvalidResponse("response has no choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        let mut turn = Turn::assistant(content);

        if let Some(tool_calls) = choice.message.tool_calls {
            let operations = tool_calls
                .into_iter()
                .map(|call| {
                    let args: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| json!({}));
                    OperationRequest::new(call.id, call.function.name, args)
                })
                .collect::<Vec<_>>();

            if !operations.is_empty() {
                turn = turn.with_operations(operations);
            }
        }

        Ok(turn)
    }
}

#[async_trait]
impl Planner for OpenAiPlanner {
    async fn plan(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
    ) -> Result<Turn, PlannerError> {
        let mut messages: Vec<ApiMessage> = Vec::with_capacity(turns.len() + 1);

        if let Some(prompt) = system_prompt {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: Some(prompt.to_string()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(turns.iter().map(|turn| self.convert_turn(turn)));

        debug!(model = %self.config.model, messages = messages.len(), "planner request");

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": 0,
        });
        if !self.catalog.is_empty() {
            body["tools"] = json!(self.tool_specs());
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlannerError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PlannerError::Provider(format!(
                "planner endpoint returned {}: {}",
                status, text
            )));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::InvalidResponse(e.to_string()))?;

        self.convert_response(parsed)
    }
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> OpenAiPlanner {
        OpenAiPlanner::new(
            PlannerConfig::new("key", "https://api.openai.com/v1", "gpt-4o-mini"),
            vec![],
        )
    }

    #[test]
    fn test_convert_tool_result_turn_maps_to_tool_role() {
        let planner = planner();
        let message = planner.convert_turn(&Turn::tool_result("{\"ok\":true}", "op_1"));

        assert_eq!(message.role, "tool");
        assert_eq!(message.tool_call_id.as_deref(), Some("op_1"));
    }

    #[test]
    fn test_convert_response_extracts_operations() {
        let planner = planner();
        let response = ApiResponse {
            choices: vec![ApiChoice {
                message: ApiResponseMessage {
                    content: Some("Checking.".to_string()),
                    tool_calls: Some(vec![ApiToolCall {
                        id: "call_1".to_string(),
                        call_type: "function".to_string(),
                        function: ApiFunctionCall {
                            name: "Gmail_ListEmails".to_string(),
                            arguments: r#"{"query": "after:today"}"#.to_string(),
                        },
                    }]),
                },
            }],
        };

        let turn = planner.convert_response(response).unwrap();

        assert!(turn.has_operations());
        let ops = turn.requested_operations();
        assert_eq!(ops[0].name, "Gmail_ListEmails");
        assert_eq!(ops[0].args["query"], "after:today");
    }

    #[test]
    fn test_convert_response_rejects_empty_choices() {
        let planner = planner();
        let result = planner.convert_response(ApiResponse { choices: vec![] });
        assert!(matches!(result, Err(PlannerError::InvalidResponse(_))));
    }

    #[test]
    fn test_malformed_arguments_degrade_to_empty_object() {
        let planner = planner();
        let response = ApiResponse {
            choices: vec![ApiChoice {
                message: ApiResponseMessage {
                    content: None,
                    tool_calls: Some(vec![ApiToolCall {
                        id: "call_1".to_string(),
                        call_type: "function".to_string(),
                        function: ApiFunctionCall {
                            name: "Gmail_ListEmails".to_string(),
                            arguments: "{not json".to_string(),
                        },
                    }]),
                },
            }],
        };

        let turn = planner.convert_response(response).unwrap();
        assert_eq!(turn.requested_operations()[0].args, json!({}));
    }
}
