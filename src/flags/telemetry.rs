use tracing::info;

use super::context::AuthDecisionContext;

/// Receives tracking events tied to a decision context.
pub trait TelemetrySink: Send + Sync {
    fn track(&self, event: &str, context: &AuthDecisionContext);
}

/// Emits each event as a structured log line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn track(&self, event: &str, context: &AuthDecisionContext) {
        info!(
            event,
            context.key = %context.key(),
            context.anonymous = context.is_anonymous(),
            "telemetry event"
        );
    }
}
