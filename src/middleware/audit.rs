use serde_json::Value;

/// Emit an audit event on the `audit` tracing target. Called explicitly in
/// handlers after mutations and logins.
pub fn log_event(
    actor: &str,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    details: Option<Value>,
) {
    let details = details.map(|d| d.to_string()).unwrap_or_default();
    tracing::info!(
        target: "audit",
        actor,
        action,
        resource_type,
        resource_id = resource_id.unwrap_or("-"),
        details = details.as_str(),
        "audit event"
    );
}
