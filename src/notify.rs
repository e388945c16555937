use async_trait::async_trait;
use tracing::{error, info};

/// Toast-style user notifications. Fire-and-forget: the controller never
/// inspects what happens to a message.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Yes/no prompt shown before destructive actions.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Reports notifications through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "stock_tracker::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "stock_tracker::notify", "{}", message);
    }
}

/// Answers every prompt the same way. Useful for scripted runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
