//! Access policy handling.
//!
//! The provider fills in `Resource` for statements that omit it, using the
//! domain ARN. [`patch_policy`] applies the same default on our side so a
//! policy that relies on it compares equal to what the provider reports.

use serde_json::Value;

use crate::error::PolicyError;

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Check that the document is a JSON object. Statement contents are left
/// to the provider; [`patch_policy`] skips anything it cannot patch.
pub fn validate(doc: &Value) -> Result<()> {
    if doc.is_object() {
        Ok(())
    } else {
        Err(PolicyError::Malformed(format!(
            "expected a JSON object, got {doc}"
        )))
    }
}

/// Serialize a validated document into the string form the provider takes.
pub fn serialize(doc: &Value) -> Result<String> {
    validate(doc)?;
    serde_json::to_string(doc).map_err(|e| PolicyError::Malformed(e.to_string()))
}

/// Resource value the provider assigns to statements without one.
pub fn default_resource(arn: &str) -> String {
    format!("{arn}/*")
}

/// Return a copy of `desired` where every statement lacking `Resource` gets
/// `<arn>/*`. The input is left untouched.
pub fn patch_policy(desired: &Value, arn: &str) -> Value {
    let mut patched = desired.clone();
    let resource = default_resource(arn);
    match patched.get_mut("Statement") {
        Some(Value::Array(statements)) => {
            for statement in statements.iter_mut() {
                fill_resource(statement, &resource);
            }
        }
        Some(statement @ Value::Object(_)) => fill_resource(statement, &resource),
        _ => {}
    }
    patched
}

fn fill_resource(statement: &mut Value, resource: &str) {
    if let Some(obj) = statement.as_object_mut() {
        obj.entry("Resource")
            .or_insert_with(|| Value::String(resource.to_string()));
    }
}

/// Structural comparison against the policy string the provider reports.
///
/// A missing or unparseable observed policy never equals a desired one.
pub fn policies_equal(desired: &Value, observed: Option<&str>) -> bool {
    observed
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .is_some_and(|parsed| parsed == *desired)
}
