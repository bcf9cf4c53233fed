//! Tool abstractions and the Financial Datasets statement tools

pub mod financial_datasets;
pub mod statements;
pub mod tool;

pub use financial_datasets::{FinancialDatasetsClient, Period, StatementKind, StatementQuery};
pub use statements::{FinancialDatasetsToolkit, FinancialStatementTool};
pub use tool::{parse_arguments, Tool, ToolRegistry};
