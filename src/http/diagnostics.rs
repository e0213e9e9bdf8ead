//! Diagnostic text for failed and debugged exchanges

use serde_json::Value;

use super::response::Response;

/// Build the warning logged for a failed exchange.
///
/// A JSON body carrying `error.msg` contributes that message; anything else
/// is appended verbatim.
pub fn error_message(response: &Response) -> String {
    let mut message = format!(
        "Request failed '{} {}':",
        response.status(),
        response.status_text()
    );
    match error_msg(response.body()) {
        Some(msg) => message.push_str(&format!("\n\nMsg: '{}'\n\n", msg)),
        None => message.push_str(response.body()),
    }
    message
}

/// The alert text shown in debug mode: status only, the body stays in the
/// logged diagnostic.
pub fn alert_message(response: &Response) -> String {
    format!(
        "Request failed '{} {}'\nsee console for details. (debug mode on)",
        response.status(),
        response.status_text()
    )
}

/// Body rendering for the debug log of a successful exchange.
///
/// Falls back to the raw body when it is not JSON.
pub fn success_body(response: &Response) -> String {
    match serde_json::from_str::<Value>(response.body()) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        Err(_) => response.body().to_string(),
    }
}

fn error_msg(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")?.get("msg")? {
        Value::String(msg) => Some(msg.clone()),
        other => Some(other.to_string()),
    }
}
