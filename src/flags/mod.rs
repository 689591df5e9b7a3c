//! Flag-gated fault injection.
//!
//! Flow Overview: before auth touches credentials, ask the flag oracle about
//! the two chaos flags for the current context. If either is on, record an
//! `http.500` event and fail the request with a synthetic error. The oracle
//! and the telemetry sink are injected, so tests can pin decisions.

mod context;
mod oracle;
mod telemetry;

pub use context::{ANONYMOUS_KEY, AuthDecisionContext, ContextPayload};
pub use oracle::{FlagOracle, HttpFlagOracle, StaticFlags};
pub use telemetry::{LogTelemetry, TelemetrySink};

#[cfg(test)]
pub(crate) use telemetry::test_support::RecordingTelemetry;

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const RELEASE_NEW_AUTH: &str = "release-new-auth";
pub const ENABLE_DISASTER_MODE: &str = "enable-disaster-mode";

/// Flags that force a failure when any of them is on.
pub const FAULT_FLAGS: [&str; 2] = [RELEASE_NEW_AUTH, ENABLE_DISASTER_MODE];

/// Event tracked right before a synthetic failure.
pub const FAULT_EVENT: &str = "http.500";

/// A deliberate failure; carries no retry guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("service temporarily unavailable")]
pub struct InjectedFailure;

#[derive(Clone)]
pub struct FaultInjector {
    oracle: Arc<dyn FlagOracle>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for FaultInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultInjector").finish_non_exhaustive()
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new(Arc::new(StaticFlags::new()), Arc::new(LogTelemetry))
    }
}

impl FaultInjector {
    #[must_use]
    pub fn new(oracle: Arc<dyn FlagOracle>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { oracle, telemetry }
    }

    pub async fn evaluate(&self, flag: &str, context: &AuthDecisionContext) -> bool {
        self.oracle.evaluate(flag, context).await
    }

    /// Fail with [`InjectedFailure`] if any fault flag is on for `context`.
    ///
    /// # Errors
    /// Returns [`InjectedFailure`] when fault injection triggers.
    pub async fn maybe_fail(&self, context: &AuthDecisionContext) -> Result<(), InjectedFailure> {
        let mut triggered = false;
        // Both flags are always evaluated so the oracle sees every decision.
        for flag in FAULT_FLAGS {
            triggered |= self.evaluate(flag, context).await;
        }

        if triggered {
            warn!(context.key = %context.key(), "fault injection triggered");
            self.telemetry.track(FAULT_EVENT, context);
            return Err(InjectedFailure);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct AskedFlags(Mutex<Vec<String>>);

    #[async_trait]
    impl FlagOracle for AskedFlags {
        async fn evaluate(&self, flag: &str, _context: &AuthDecisionContext) -> bool {
            if let Ok(mut asked) = self.0.lock() {
                asked.push(flag.to_string());
            }
            false
        }
    }

    fn injector(flags: StaticFlags) -> (FaultInjector, Arc<RecordingTelemetry>) {
        let sink = Arc::new(RecordingTelemetry::default());
        (FaultInjector::new(Arc::new(flags), sink.clone()), sink)
    }

    #[tokio::test]
    async fn proceeds_when_all_flags_off() {
        let (injector, sink) = injector(StaticFlags::new().with(RELEASE_NEW_AUTH, false));
        assert_eq!(injector.maybe_fail(&AuthDecisionContext::Anonymous).await, Ok(()));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn either_flag_triggers_failure_and_tracks() {
        for flag in FAULT_FLAGS {
            let (injector, sink) = injector(StaticFlags::new().with(flag, true));
            let context = AuthDecisionContext::user(uuid::Uuid::new_v4(), "alice@x.com");
            assert_eq!(injector.maybe_fail(&context).await, Err(InjectedFailure));
            assert_eq!(sink.events(), vec![(FAULT_EVENT.to_string(), context.key())]);
        }
    }

    #[tokio::test]
    async fn asks_oracle_about_both_flags() {
        let oracle = Arc::new(AskedFlags::default());
        let injector = FaultInjector::new(oracle.clone(), Arc::new(LogTelemetry));
        assert!(injector.maybe_fail(&AuthDecisionContext::Anonymous).await.is_ok());
        let asked = oracle.0.lock().map(|asked| asked.clone()).unwrap_or_default();
        assert_eq!(asked, vec![RELEASE_NEW_AUTH.to_string(), ENABLE_DISASTER_MODE.to_string()]);
    }
}
