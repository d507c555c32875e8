//! Bounded retry around a generation call

use crate::error::GenerateError;
use crate::llm::{extract_text, ContentGenerator, GenerationConfig};
use std::time::Duration;

/// How many attempts to make and how long to wait between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            3,
            vec![
                Duration::from_secs(30),
                Duration::from_secs(60),
                Duration::from_secs(120),
            ],
        )
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: usize, delays: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delays,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay before 1-based `attempt` (>= 2). Past the schedule the last entry repeats.
    pub fn delay_before(&self, attempt: usize) -> Duration {
        let idx = attempt.saturating_sub(2);
        self.delays
            .get(idx)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or_default()
    }
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Call the generator and extract text, retrying transient failures.
///
/// Any terminal failure is wrapped in [`GenerateError::Exhausted`] carrying the
/// number of attempts made and the last underlying error.
pub fn generate_with_retry<G>(
    generator: &G,
    prompt: &str,
    config: &GenerationConfig,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<String, GenerateError>
where
    G: ContentGenerator + ?Sized,
{
    let max = policy.max_attempts();
    let mut attempt = 1;

    loop {
        if attempt == 1 {
            tracing::info!("calling model (large files can take several minutes)");
        }

        let err = match generator
            .generate_content(prompt, config)
            .and_then(|resp| extract_text(&resp))
        {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        if !err.is_retryable() || attempt >= max {
            return Err(GenerateError::Exhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = policy.delay_before(attempt + 1);
        tracing::warn!(
            "attempt {}/{} failed: {}; retrying in {}s",
            attempt,
            max,
            err,
            delay.as_secs()
        );
        sleeper.sleep(delay);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_before(2), Duration::from_secs(30));
        assert_eq!(policy.delay_before(3), Duration::from_secs(60));
        assert_eq!(policy.delay_before(4), Duration::from_secs(120));
        assert_eq!(policy.delay_before(9), Duration::from_secs(120));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, vec![]);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_before(2), Duration::ZERO);
    }
}
