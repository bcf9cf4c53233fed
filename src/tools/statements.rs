use super::{
    financial_datasets::{FinancialDatasetsClient, StatementKind, StatementQuery},
    tool::{parse_arguments, Tool, ToolRegistry},
};
use crate::Result;
use schemars::gen::SchemaSettings;
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::Arc;

/// Statement lookup tool backed by the Financial Datasets API
#[derive(Debug, Clone)]
pub struct FinancialStatementTool {
    kind: StatementKind,
    client: Arc<FinancialDatasetsClient>,
}

impl FinancialStatementTool {
    pub fn new(kind: StatementKind, client: Arc<FinancialDatasetsClient>) -> Self {
        Self { kind, client }
    }
}

impl Tool for FinancialStatementTool {
    fn name(&self) -> &'static str {
        self.kind.tool_name()
    }

    fn description(&self) -> &'static str {
        self.kind.description()
    }

    fn parameters_schema(&self) -> Value {
        statement_query_schema()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let query: StatementQuery = parse_arguments(self.name(), parameters)?;
            let query = query.normalized()?;

            let statements = self.client.fetch_statements(self.kind, &query).await?;

            Ok(json!({
                "ticker": query.ticker,
                "period": query.period.as_str(),
                self.kind.response_key(): statements
            }))
        })
    }
}

/// JSON schema for [`StatementQuery`] with sub-schemas inlined, as
/// function-calling APIs do not resolve `$ref`.
fn statement_query_schema() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator();
    let root = generator.into_root_schema_for::<StatementQuery>();

    serde_json::to_value(&root.schema).unwrap_or_else(|_| {
        json!({
            "type": "object",
            "properties": {"ticker": {"type": "string"}},
            "required": ["ticker"]
        })
    })
}

/// Builds the balance sheet, income statement and cash flow statement tools
/// over one shared client.
#[derive(Debug, Clone)]
pub struct FinancialDatasetsToolkit {
    client: Arc<FinancialDatasetsClient>,
}

impl FinancialDatasetsToolkit {
    pub fn new(client: FinancialDatasetsClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn tools(&self) -> Vec<FinancialStatementTool> {
        StatementKind::ALL
            .into_iter()
            .map(|kind| FinancialStatementTool::new(kind, Arc::clone(&self.client)))
            .collect()
    }

    pub fn register_all(&self, registry: &mut ToolRegistry) {
        for tool in self.tools() {
            registry.register(tool);
        }
    }

    pub fn into_registry(self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        self.register_all(&mut registry);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolkit_builds_three_tools() {
        let toolkit = FinancialDatasetsToolkit::new(FinancialDatasetsClient::new("key"));
        let registry = toolkit.into_registry();
        assert_eq!(
            registry.names(),
            vec!["balance_sheets", "cash_flow_statements", "income_statements"]
        );
    }

    #[test]
    fn test_schema_is_inlined() {
        let schema = statement_query_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["ticker"]));
        assert!(schema.get("definitions").is_none());
        let period = schema["properties"]["period"].to_string();
        assert!(period.contains("quarterly"), "{period}");
        assert!(!period.contains("$ref"), "{period}");
    }

    #[tokio::test]
    async fn test_invalid_arguments_fail_before_http() {
        let client = FinancialDatasetsClient::new("key").with_base_url("http://127.0.0.1:9");
        let tool = FinancialStatementTool::new(StatementKind::BalanceSheets, Arc::new(client));

        let err = tool.execute(json!({"period": "annual"})).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = tool.execute(json!({"ticker": "$$$"})).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
