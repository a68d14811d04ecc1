//! HTTP tool-gateway client.
//!
//! The mail operations themselves live behind an external authenticated
//! gateway. At startup the gateway supplies the operation catalog; each
//! entry is wrapped as a [`MailTool`] proxy that forwards execution over
//! HTTP, and the gateway doubles as the [`Authorizer`] for
//! consent-gated operations using the provider's
//! `{"status": "...", "url": "..."}` response shape.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use mailgraph_tools::{
    AuthResponse, Authorizer, MailTool, Result as ToolResult, ToolError, ToolInput, ToolOutput,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One catalog entry as described by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayToolSpec {
    /// Operation name.
    pub name: String,

    /// Operation description.
    #[serde(default)]
    pub description: String,

    /// Argument schema.
    #[serde(default)]
    pub input_schema: Option<Value>,

    /// Whether the operation needs user consent.
    #[serde(default)]
    pub requires_authorization: bool,

    /// Whether the operation is compose-type.
    #[serde(default)]
    pub compose: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    tools: Vec<GatewayToolSpec>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    output: Option<Value>,
}

/// Client for the external tool gateway.
#[derive(Clone)]
pub struct HttpToolGateway {
    config: GatewayConfig,
    client: Client,
    auth_required: Arc<HashMap<String, bool>>,
}

impl HttpToolGateway {
    /// Create a gateway client.
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            auth_required: Arc::new(HashMap::new()),
        }
    }

    /// Fetch the operation catalog for a toolkit.
    ///
    /// Also records which operations are consent-gated so the
    /// [`Authorizer`] impl can answer without a network round trip.
    pub async fn fetch_catalog(&mut self, toolkit: &str) -> ToolResult<Vec<GatewayToolSpec>> {
        let response = self
            .client
            .get(format!("{}/tools", self.config.base_url))
            .query(&[("toolkit", toolkit)])
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Execution(format!(
                "catalog request failed with {}",
                response.status()
            )));
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        self.auth_required = Arc::new(
            catalog
                .tools
                .iter()
                .map(|spec| (spec.name.clone(), spec.requires_authorization))
                .collect(),
        );

        info!(toolkit, count = catalog.tools.len(), "loaded tool catalog");
        Ok(catalog.tools)
    }

    /// Wrap catalog entries as executable tool proxies.
    pub fn into_tools(&self, catalog: Vec<GatewayToolSpec>) -> Vec<Box<dyn MailTool>> {
        catalog
            .into_iter()
            .map(|spec| {
                Box::new(GatewayTool {
                    spec,
                    gateway: self.clone(),
                }) as Box<dyn MailTool>
            })
            .collect()
    }

    async fn execute_remote(&self, name: &str, args: &Value) -> ToolResult<ToolOutput> {
        debug!(operation = name, "executing via gateway");

        let response = self
            .client
            .post(format!("{}/tools/execute", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "tool_name": name,
                "input": args,
                "user_id": self.config.user_id,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Execution(format!(
                "{} failed with {}",
                name,
                response.status()
            )));
        }

        let parsed: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(parsed.output.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Authorizer for HttpToolGateway {
    async fn requires_authorization(&self, operation: &str, _user_id: &str) -> bool {
        self.auth_required.get(operation).copied().unwrap_or(false)
    }

    async fn authorize(&self, operation: &str, user_id: &str) -> ToolResult<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/auth/authorize", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "tool_name": operation,
                "user_id": user_id,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Authorization(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Authorization(format!(
                "authorization request failed with {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::Authorization(e.to_string()))
    }
}

/// Proxy for one gateway operation.
struct GatewayTool {
    spec: GatewayToolSpec,
    gateway: HttpToolGateway,
}

#[async_trait]
impl MailTool for GatewayTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        &self.spec.description
    }

    fn input_schema(&self) -> Option<Value> {
        self.spec.input_schema.clone()
    }

    fn requires_authorization(&self) -> bool {
        self.spec.requires_authorization
    }

    fn is_compose(&self) -> bool {
        self.spec.compose
    }

    async fn execute(&self, args: ToolInput) -> ToolResult<ToolOutput> {
        self.gateway.execute_remote(&self.spec.name, &args).await
    }
}
