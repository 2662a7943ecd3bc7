use tokio::sync::mpsc;

/// Sends progress messages to whoever renders them (usually a spinner).
pub struct ProgressReporter(Option<mpsc::UnboundedSender<String>>);

impl ProgressReporter {
    pub fn new(tx: Option<mpsc::UnboundedSender<String>>) -> Self {
        Self(tx)
    }

    /// A reporter that drops every message.
    pub fn silent() -> Self {
        Self(None)
    }

    /// A connected reporter and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(Some(tx)), rx)
    }

    pub fn report(&self, message: impl Into<String>) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(message.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_messages() {
        let (reporter, mut rx) = ProgressReporter::channel();
        reporter.report("Migrating 1");
        drop(reporter);

        assert_eq!(rx.recv().await.as_deref(), Some("Migrating 1"));
        assert_eq!(rx.recv().await, None);
    }
}
