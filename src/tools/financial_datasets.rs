//! HTTP client for the Financial Datasets API (<https://financialdatasets.ai>).

use crate::{AgentError, Result};
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.financialdatasets.ai";
const DEFAULT_LIMIT: u32 = 5;
const MAX_TICKER_LEN: usize = 10;

/// The three statement families exposed as agent tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    BalanceSheets,
    IncomeStatements,
    CashFlowStatements,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheets,
        StatementKind::IncomeStatements,
        StatementKind::CashFlowStatements,
    ];

    pub fn tool_name(self) -> &'static str {
        match self {
            StatementKind::BalanceSheets => "balance_sheets",
            StatementKind::IncomeStatements => "income_statements",
            StatementKind::CashFlowStatements => "cash_flow_statements",
        }
    }

    /// Path segment under `/financials/`
    pub fn path(self) -> &'static str {
        match self {
            StatementKind::BalanceSheets => "balance-sheets",
            StatementKind::IncomeStatements => "income-statements",
            StatementKind::CashFlowStatements => "cash-flow-statements",
        }
    }

    /// Key holding the statement array in the response body
    pub fn response_key(self) -> &'static str {
        self.tool_name()
    }

    pub fn description(self) -> &'static str {
        match self {
            StatementKind::BalanceSheets => {
                "Retrieve balance sheets for a publicly traded company by ticker. \
                 A balance sheet lists assets, liabilities and shareholders' equity at a point in time."
            }
            StatementKind::IncomeStatements => {
                "Retrieve income statements for a publicly traded company by ticker. \
                 An income statement reports revenues, expenses and net income over a period."
            }
            StatementKind::CashFlowStatements => {
                "Retrieve cash flow statements for a publicly traded company by ticker. \
                 A cash flow statement reports cash from operating, investing and financing activities."
            }
        }
    }
}

/// Reporting period for statement lookups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Annual,
    Quarterly,
    Ttm,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Quarterly => "quarterly",
            Period::Ttm => "ttm",
        }
    }
}

/// Parameters shared by all three statement tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementQuery {
    /// Ticker symbol of the company, e.g. AAPL
    pub ticker: String,
    /// Reporting period: annual, quarterly or ttm (trailing twelve months)
    #[serde(default)]
    pub period: Period,
    /// Maximum number of statements to return, most recent first
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl StatementQuery {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            period: Period::default(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Normalize the ticker to upper case and check the limits
    pub fn normalized(mut self) -> Result<Self> {
        let ticker = self.ticker.trim().to_uppercase();

        if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
            return Err(AgentError::Validation(format!(
                "ticker must be 1-{} characters, got {:?}",
                MAX_TICKER_LEN, self.ticker
            )));
        }

        if !ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(AgentError::Validation(format!(
                "ticker {:?} contains invalid characters",
                self.ticker
            )));
        }

        if self.limit == 0 {
            return Err(AgentError::Validation(
                "limit must be at least 1".to_string(),
            ));
        }

        self.ticker = ticker;
        Ok(self)
    }
}

/// Thin wrapper over the Financial Datasets REST API
#[derive(Debug, Clone)]
pub struct FinancialDatasetsClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl FinancialDatasetsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch statements of `kind` and return the statement array
    pub async fn fetch_statements(&self, kind: StatementKind, query: &StatementQuery) -> Result<Value> {
        let url = format!(
            "{}/financials/{}/",
            self.base_url.trim_end_matches('/'),
            kind.path()
        );
        debug!(
            ticker = %query.ticker,
            period = query.period.as_str(),
            limit = query.limit,
            "GET {}",
            url
        );

        let limit = query.limit.to_string();
        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(&[
                ("ticker", query.ticker.as_str()),
                ("period", query.period.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                AgentError::ToolExecution(format!("Failed to call Financial Datasets: {}", err))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AgentError::ToolExecution(format!("Failed to read Financial Datasets response: {}", err))
        })?;

        if !status.is_success() {
            return Err(AgentError::ToolExecution(format!(
                "Financial Datasets returned status {}: {}",
                status,
                body.trim()
            )));
        }

        let mut payload: Value = serde_json::from_str(&body)?;
        payload
            .get_mut(kind.response_key())
            .map(Value::take)
            .ok_or_else(|| {
                AgentError::ToolExecution(format!(
                    "Financial Datasets response is missing `{}`",
                    kind.response_key()
                ))
            })
    }
}
