//! Actions the assistant may request instead of answering with text.
//!
//! [`ActionKind`] is the registry of callable actions and their schemas. An [`ActionRequest`]
//! can only be built by [`ActionRequest::validate`], so holding one means the name is registered
//! and every required argument is present.

mod executor;

pub use executor::{ActionExecutor, ActionOutcome};

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::llm::{ToolDefinition, ToolFunctionDefinition};

/// Value stored for optional arguments the assistant left out.
pub const UNSPECIFIED: &str = "unspecified";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Registered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateAppointment,
}

impl ActionKind {
    pub const ALL: [ActionKind; 1] = [ActionKind::CreateAppointment];

    /// Wire name used in tool schemas and calls.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::CreateAppointment => "create_appointment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            ActionKind::CreateAppointment => &["date"],
        }
    }

    fn optional(self) -> &'static [&'static str] {
        match self {
            ActionKind::CreateAppointment => &["service", "details"],
        }
    }

    fn is_declared(self, arg: &str) -> bool {
        self.required().contains(&arg) || self.optional().contains(&arg)
    }

    /// Tool schema offered to the model.
    pub fn definition(self) -> ToolDefinition {
        let (description, parameters) = match self {
            ActionKind::CreateAppointment => (
                "Book an appointment for the customer. Call only when the customer asked to book and gave a date and time.",
                json!({
                    "type": "object",
                    "required": ["date"],
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "Date and time of the appointment exactly as agreed with the customer, e.g. 2025-05-01 10:00."
                        },
                        "service": {
                            "type": "string",
                            "description": "Service requested (e.g. screen repair)."
                        },
                        "details": {
                            "type": "string",
                            "description": "Any other details the customer gave."
                        }
                    }
                }),
            ),
        };
        ToolDefinition {
            typ: "function".to_string(),
            function: ToolFunctionDefinition {
                name: self.name().to_string(),
                description: Some(description.to_string()),
                parameters,
            },
        }
    }
}

/// Tool schemas for every registered action.
pub fn definitions() -> Vec<ToolDefinition> {
    ActionKind::ALL.iter().map(|k| k.definition()).collect()
}

/// A validated request to run a registered action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    kind: ActionKind,
    arguments: BTreeMap<String, String>,
}

impl ActionRequest {
    /// Validate a call from the model: `raw_arguments` is the provider's untyped JSON payload.
    /// Scalars are coerced to strings, nulls count as absent, nested values are rejected and
    /// undeclared keys are dropped.
    pub fn validate(name: &str, raw_arguments: &str) -> Result<Self, ActionError> {
        let kind = ActionKind::from_name(name.trim())
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;
        let raw = raw_arguments.trim();
        let value: Value = if raw.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(raw).map_err(|e| ActionError::InvalidArguments(e.to_string()))?
        };
        let Value::Object(object) = value else {
            return Err(ActionError::InvalidArguments(
                "arguments must be an object".to_string(),
            ));
        };
        let mut arguments = BTreeMap::new();
        for (key, value) in object {
            if !kind.is_declared(&key) {
                log::debug!("action {}: dropping undeclared argument {}", kind.name(), key);
                continue;
            }
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ActionError::InvalidArguments(format!(
                        "argument {} must be a scalar",
                        key
                    )))
                }
            };
            arguments.insert(key, text);
        }
        for required in kind.required() {
            let present = arguments
                .get(*required)
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                return Err(ActionError::MissingArgument(*required));
            }
        }
        Ok(Self { kind, arguments })
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Argument value, or None when absent or blank.
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_call_keeps_date_verbatim() {
        let req = ActionRequest::validate(
            "create_appointment",
            r#"{"date":"2025-05-01 10:00","service":"screen repair"}"#,
        )
        .unwrap();
        assert_eq!(req.kind(), ActionKind::CreateAppointment);
        assert_eq!(req.argument("date"), Some("2025-05-01 10:00"));
        assert_eq!(req.argument("service"), Some("screen repair"));
        assert_eq!(req.argument("details"), None);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(
            ActionRequest::validate("delete_everything", "{}"),
            Err(ActionError::UnknownAction("delete_everything".to_string()))
        );
    }

    #[test]
    fn missing_or_blank_date_is_rejected() {
        assert_eq!(
            ActionRequest::validate("create_appointment", r#"{"service":"x"}"#),
            Err(ActionError::MissingArgument("date"))
        );
        assert_eq!(
            ActionRequest::validate("create_appointment", r#"{"date":"  "}"#),
            Err(ActionError::MissingArgument("date"))
        );
        assert_eq!(
            ActionRequest::validate("create_appointment", r#"{"date":null}"#),
            Err(ActionError::MissingArgument("date"))
        );
        assert_eq!(
            ActionRequest::validate("create_appointment", ""),
            Err(ActionError::MissingArgument("date"))
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for raw in [r#"{"date": "#, r#"["2025-05-01"]"#, r#"{"date":{"day":1}}"#] {
            assert!(
                matches!(
                    ActionRequest::validate("create_appointment", raw),
                    Err(ActionError::InvalidArguments(_))
                ),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn scalars_are_coerced_and_extras_dropped() {
        let req = ActionRequest::validate(
            "create_appointment",
            r#"{"date":20250501,"details":true,"customer_id":"x"}"#,
        )
        .unwrap();
        assert_eq!(req.argument("date"), Some("20250501"));
        assert_eq!(req.argument("details"), Some("true"));
        assert!(!req.arguments().contains_key("customer_id"));
    }

    #[test]
    fn definitions_cover_registry() {
        let defs = definitions();
        assert_eq!(defs.len(), ActionKind::ALL.len());
        assert_eq!(defs[0].function.name, "create_appointment");
        assert_eq!(defs[0].function.parameters["required"][0], "date");
    }
}
