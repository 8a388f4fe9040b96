//! Conversion of declarative validation failures into [`AppError`]

use super::codes::ErrorCode;
use super::types::AppError;
use serde_json::{Map, Value};
use validator::ValidationErrors;

impl From<ValidationErrors> for AppError {
    /// Field errors are reported as `details.fields = {field: [message, ...]}`.
    /// A single failing field is also exposed as `details.field`.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Map::new();
        for (field, errs) in errors.field_errors() {
            let messages: Vec<Value> = errs
                .iter()
                .map(|e| {
                    let text = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    Value::String(text)
                })
                .collect();
            fields.insert(field.to_string(), Value::Array(messages));
        }

        let first_message = fields
            .values()
            .filter_map(|v| v.as_array().and_then(|a| a.first()))
            .filter_map(Value::as_str)
            .next()
            .map(str::to_string);

        let single_field = (fields.len() == 1)
            .then(|| fields.keys().next().cloned())
            .flatten();

        let mut err = AppError::with_message(
            ErrorCode::ValidationFailed,
            first_message.unwrap_or_else(|| ErrorCode::ValidationFailed.message().to_string()),
        )
        .with_detail("fields", Value::Object(fields));
        if let Some(field) = single_field {
            err = err.with_detail("field", field);
        }
        err
    }
}
