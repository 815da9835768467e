// Shadow-Instructor: Fallback Orchestrator
// Single-shot request with at most one fallback attempt:
// - primary call, then parse/validate against the target shape
// - on a rate-limit or region failure, one call to the secondary provider
// - everything else propagates unchanged
//
// Degradation to a safe default is left to each agent.

use super::classifier::{classify, FailureClass};
use super::json::parse_structured;
use super::provider::{CallContext, ProviderAdapter};
use crate::error::{CoreError, ProviderError};
use crate::schema::StructuredOutput;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Counters for orchestrated calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStats {
    /// Logical requests received
    pub total_requests: u64,
    /// Requests answered by the primary provider
    pub primary_successes: u64,
    /// Secondary calls issued
    pub fallbacks_attempted: u64,
    /// Secondary calls that produced a valid answer
    pub fallback_successes: u64,
    /// Primary failures classified as fatal
    pub fatal_failures: u64,
}

/// Which provider produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Primary,
    Fallback,
}

pub struct FallbackOrchestrator {
    primary: Arc<dyn ProviderAdapter>,
    secondary: Option<Arc<dyn ProviderAdapter>>,
    stats: Mutex<FallbackStats>,
}

impl FallbackOrchestrator {
    pub fn new(primary: Arc<dyn ProviderAdapter>, secondary: Option<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            primary,
            secondary,
            stats: Mutex::new(FallbackStats::default()),
        }
    }

    /// An orchestrator that never falls back
    pub fn with_primary(primary: Arc<dyn ProviderAdapter>) -> Self {
        Self::new(primary, None)
    }

    pub fn stats(&self) -> FallbackStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            *stats = FallbackStats::default();
        }
    }

    /// Raw text from whichever provider answers
    pub async fn execute_text(&self, ctx: &CallContext) -> Result<String, CoreError> {
        self.run(ctx, Ok).await.map(|(text, _)| text)
    }

    /// Parsed and validated output from whichever provider answers
    pub async fn execute<T: StructuredOutput>(&self, ctx: &CallContext) -> Result<T, CoreError> {
        self.execute_routed(ctx).await.map(|(value, _)| value)
    }

    /// Like `execute`, also reporting which provider answered
    pub async fn execute_routed<T: StructuredOutput>(&self, ctx: &CallContext) -> Result<(T, Route), CoreError> {
        self.run(ctx, |text| parse_structured::<T>(&text)).await
    }

    async fn run<T>(
        &self,
        ctx: &CallContext,
        parse: fn(String) -> Result<T, CoreError>,
    ) -> Result<(T, Route), CoreError> {
        self.record(|s| s.total_requests += 1);

        let primary_error = match self.primary.invoke(ctx).await {
            Ok(text) => {
                // A malformed answer is a contract violation, not a capacity failure
                let value = parse(text)?;
                self.record(|s| s.primary_successes += 1);
                return Ok((value, Route::Primary));
            }
            Err(e) => e,
        };

        let class = classify(&primary_error);
        if !class.is_retryable() {
            self.record(|s| s.fatal_failures += 1);
            log::warn!("{} failed for {:?}, not retrying: {}", self.primary.name(), ctx.task, primary_error);
            return Err(CoreError::Provider(primary_error));
        }

        let Some(secondary) = &self.secondary else {
            log::warn!(
                "{} failed for {:?} ({:?}) and no fallback provider is configured",
                self.primary.name(),
                ctx.task,
                class
            );
            return Err(match class {
                FailureClass::RetryableRegion => CoreError::RegionUnavailable(primary_error),
                _ => CoreError::RateLimited(primary_error),
            });
        };

        self.record(|s| s.fallbacks_attempted += 1);
        log::warn!(
            "{} failed for {:?} ({:?}), falling back to {}",
            self.primary.name(),
            ctx.task,
            class,
            secondary.name()
        );

        let result = Self::invoke_detached(Arc::clone(secondary), ctx.clone())
            .await
            .and_then(parse);

        match result {
            Ok(value) => {
                self.record(|s| s.fallback_successes += 1);
                log::info!("Fallback to {} succeeded for {:?}", secondary.name(), ctx.task);
                Ok((value, Route::Fallback))
            }
            Err(fallback) => {
                log::error!("Fallback to {} failed for {:?}: {}", secondary.name(), ctx.task, fallback);
                Err(CoreError::FallbackFailed {
                    primary: primary_error,
                    fallback: Box::new(fallback),
                })
            }
        }
    }

    /// Run the secondary call on its own task so a slow provider never holds
    /// the caller's executor slot
    async fn invoke_detached(adapter: Arc<dyn ProviderAdapter>, ctx: CallContext) -> Result<String, CoreError> {
        let name = adapter.name().to_string();
        let joined = tokio::spawn(async move { adapter.invoke(&ctx).await }).await;

        match joined {
            Ok(reply) => reply.map_err(CoreError::Provider),
            Err(e) => Err(CoreError::Provider(ProviderError::new(
                &name,
                None,
                format!("fallback task did not complete: {}", e),
            ))),
        }
    }

    fn record(&self, update: impl FnOnce(&mut FallbackStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }
}

/// Scripted adapters for exercising agents without a network
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct ScriptedAdapter {
        name: &'static str,
        reply: Result<String, ProviderError>,
        calls: AtomicUsize,
        last: Mutex<Option<CallContext>>,
    }

    impl ScriptedAdapter {
        pub fn ok(name: &'static str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        pub fn failing(name: &'static str, status: Option<u16>, message: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Err(ProviderError::new(name, status, message)),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_context(&self) -> Option<CallContext> {
            self.last.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        async fn invoke(&self, ctx: &CallContext) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(ctx.clone());
            self.reply.clone()
        }
    }
}
