//! The five-field intake form submitted by the caller.

use crate::error::ContractError;
use serde_json::Value;

/// Placeholder used in the prompt for any field the caller left out.
pub const PLACEHOLDER: &str = "-";

/// Free-text answers describing a 30-day goal.
///
/// Every field is optional. Parsing is tolerant: missing keys, `null`, `false`,
/// zero and empty strings are treated as "not provided". Other non-string
/// values are kept in their JSON text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    /// `objetivo`: what the person commits to for the next 30 days.
    pub objective: Option<String>,
    /// `porque`: why now.
    pub motivation: Option<String>,
    /// `tempo`: daily time available.
    pub daily_time: Option<String>,
    /// `recursos`: resources at hand.
    pub resources: Option<String>,
    /// `obstaculo`: most likely obstacle.
    pub obstacle: Option<String>,
}

impl IntakeForm {
    /// Parse a raw request body.
    ///
    /// Only syntactically invalid JSON is rejected. A valid document that is
    /// not an object yields an empty form.
    pub fn from_json(body: &[u8]) -> Result<Self, ContractError> {
        let value: Value = serde_json::from_slice(body).map_err(ContractError::InvalidJson)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(field_text);

        Self {
            objective: field("objetivo"),
            motivation: field("porque"),
            daily_time: field("tempo"),
            resources: field("recursos"),
            obstacle: field("obstaculo"),
        }
    }

    pub fn objective_or_placeholder(&self) -> &str {
        or_placeholder(&self.objective)
    }

    pub fn motivation_or_placeholder(&self) -> &str {
        or_placeholder(&self.motivation)
    }

    pub fn daily_time_or_placeholder(&self) -> &str {
        or_placeholder(&self.daily_time)
    }

    pub fn resources_or_placeholder(&self) -> &str {
        or_placeholder(&self.resources)
    }

    pub fn obstacle_or_placeholder(&self) -> &str {
        or_placeholder(&self.obstacle)
    }

    /// Number of fields the caller actually filled in.
    pub fn provided_fields(&self) -> usize {
        [
            &self.objective,
            &self.motivation,
            &self.daily_time,
            &self.resources,
            &self.obstacle,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn or_placeholder(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(PLACEHOLDER)
}
