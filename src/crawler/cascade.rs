//! Ordered fallback chains
//!
//! Page fetching, sitemap fetching and discovery all follow the same shape:
//! try strategies in a fixed order, accept the first result that validates,
//! and otherwise report why each strategy failed.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Something that can be tried as one step of a fallback chain
pub trait Strategy {
    /// Name used in logs and failure diagnostics
    fn name(&self) -> &str;
}

/// Why one strategy of a chain was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: String,
    pub reason: String,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// A pause function for chains that never wait between strategies
pub fn no_pause<S>(_: &S, _: &S) -> Duration {
    Duration::ZERO
}

/// Joins failures into a single diagnostic line
pub fn describe_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs strategies in order until one produces a value that validates
///
/// Each strategy is attempted once. A strategy fails when `attempt` returns an
/// error or `validate` rejects its value; the chain then moves on. Before each
/// strategy after the first, the chain sleeps for `pause(previous, next)`.
/// Later strategies are never attempted once one succeeds.
///
/// # Returns
///
/// * `Ok(value)` - The value from the first strategy that validated
/// * `Err(failures)` - One entry per strategy, in the order they were tried
pub async fn first_success<S, T, E, P, F, Fut, V>(
    strategies: impl IntoIterator<Item = S>,
    pause: P,
    mut attempt: F,
    validate: V,
) -> Result<T, Vec<StrategyFailure>>
where
    S: Strategy + Clone,
    E: fmt::Display,
    P: Fn(&S, &S) -> Duration,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    V: Fn(&S, &T) -> Result<(), E>,
{
    let mut failures = Vec::new();
    let mut previous: Option<S> = None;

    for strategy in strategies {
        if let Some(previous) = &previous {
            let delay = pause(previous, &strategy);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let outcome = match attempt(strategy.clone()).await {
            Ok(value) => validate(&strategy, &value).map(|()| value),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                tracing::debug!("Strategy {} succeeded", strategy.name());
                return Ok(value);
            }
            Err(e) => {
                tracing::debug!("Strategy {} failed: {}", strategy.name(), e);
                failures.push(StrategyFailure {
                    strategy: strategy.name().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        previous = Some(strategy);
    }

    Err(failures)
}
