//! Ad-hoc query request and the schema-less outcome
//!
//! `/execute-query` answers with whatever the statement produced: an array of
//! row objects, an `{error}` record, or any other JSON value. The shape is
//! classified once, here, into [`QueryOutcome`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::model::config::ConnectionConfig;

/// Which configured endpoint a statement runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTarget {
    #[default]
    Source,
    Destination,
}

impl QueryTarget {
    pub fn toggled(self) -> Self {
        match self {
            QueryTarget::Source => QueryTarget::Destination,
            QueryTarget::Destination => QueryTarget::Source,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueryTarget::Source => "Source (MySQL)",
            QueryTarget::Destination => "Destination (Postgres)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryTarget::Source => "source",
            QueryTarget::Destination => "destination",
        }
    }
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" | "src" | "mysql" => Ok(QueryTarget::Source),
            "destination" | "dest" | "postgres" => Ok(QueryTarget::Destination),
            other => Err(format!(
                "unknown target '{}' (expected source or destination)",
                other
            )),
        }
    }
}

/// Body of `/execute-query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub config: &'a ConnectionConfig,
    pub target: QueryTarget,
    pub query: &'a str,
}

/// One result row: columns in the order the backend returned them
pub type Row = Vec<(String, Value)>;

/// Classified query response
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Tabular result (possibly empty)
    Rows(Vec<Row>),
    /// Backend-reported or synthesized failure
    Error(String),
    /// Anything that is neither rows nor an error
    Value(Value),
}

impl QueryOutcome {
    /// Outcome used when the request never completed
    pub fn transport_failure() -> Self {
        QueryOutcome::Error("Failed to execute query".to_string())
    }

    /// Classify a decoded response body
    ///
    /// `success` is the HTTP status class. A failed response with no
    /// `error` field is reported as the serialization of the whole body.
    pub fn from_response(success: bool, body: Value) -> Self {
        if let Some(error) = body.get("error").filter(|v| !v.is_null()) {
            return QueryOutcome::Error(match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        if !success {
            return QueryOutcome::Error(body.to_string());
        }
        match body {
            Value::Array(items) if items.iter().all(Value::is_object) => QueryOutcome::Rows(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map.into_iter().collect()),
                        _ => None,
                    })
                    .collect(),
            ),
            other => QueryOutcome::Value(other),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryOutcome::Error(_))
    }
}
