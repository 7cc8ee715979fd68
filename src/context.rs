use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call context passed through handlers down to the store.
///
/// Carries an optional cancellation token and deadline together with
/// string metadata such as trace or request ids. Cloning is cheap.
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancellation: Option<CancellationToken>,
    deadline: Option<Instant>,
    values: Arc<BTreeMap<String, String>>,
}

impl Context {
    /// Empty context that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` once the token fired or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(|t| t.is_cancelled())
            || self.deadline.is_some_and(|d| d <= Instant::now())
    }

    /// Resolves when the context is cancelled. Never resolves for a context
    /// without token and deadline.
    pub async fn cancelled(&self) {
        let token = async {
            match &self.cancellation {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = token => {}
            _ = deadline => {}
        }
    }

    /// Copy of this context that keeps its values but is detached from its
    /// cancellation token and deadline.
    pub fn without_cancel(&self) -> Self {
        Context {
            cancellation: None,
            deadline: None,
            values: Arc::clone(&self.values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn without_cancel_keeps_values_and_drops_signals() {
        let token = CancellationToken::new();
        let ctx = Context::background()
            .with_value("request_id", "r-1")
            .with_cancellation(token.clone())
            .with_deadline(Instant::now());
        token.cancel();
        assert!(ctx.is_cancelled());

        let detached = ctx.without_cancel();
        assert!(!detached.is_cancelled());
        assert_eq!(detached.deadline(), None);
        assert_eq!(detached.value("request_id"), Some("r-1"));
    }

    #[test]
    fn with_value_does_not_touch_clones() {
        let parent = Context::background().with_value("a", "1");
        let child = parent.clone().with_value("b", "2");
        assert_eq!(parent.value("b"), None);
        assert_eq!(child.value("a"), Some("1"));
    }

    #[tokio::test]
    async fn cancelled_resolves_on_deadline() {
        let ctx = Context::background().with_deadline(Instant::now() + Duration::from_millis(5));
        tokio::time::timeout(Duration::from_secs(1), ctx.cancelled())
            .await
            .expect("deadline should fire");
        assert!(ctx.is_cancelled());
    }
}
