mod email;
mod whatsapp;

pub use email::{EmailConfig, EmailNotifier};
pub use whatsapp::{WhatsAppConfig, WhatsAppNotifier};

use crate::{MonitorError, Notifier};
use tracing::{info, warn};

#[async_trait::async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), MonitorError> {
        (**self).send(subject, body).await
    }
}

/// Logs reports instead of delivering them.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn send(&self, subject: &str, _body: &str) -> Result<(), MonitorError> {
        info!(subject, "No notifier configured, report not sent");
        Ok(())
    }
}

/// Delivers every report through each configured transport.
///
/// Fails only when every transport failed; individual failures are logged.
pub struct FanoutNotifier {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Box<dyn Notifier>>) -> Self {
        FanoutNotifier { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name()).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for FanoutNotifier {
    fn name(&self) -> &str {
        "fanout"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), MonitorError> {
        let mut last_error = None;
        let mut delivered = 0;
        for target in &self.targets {
            match target.send(subject, body).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(notifier = target.name(), error = %e, "Failed to send notification");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if delivered == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        fail: bool,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Notifier for Recording {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(&self, subject: &str, _body: &str) -> Result<(), MonitorError> {
            if self.fail {
                return Err(MonitorError::Rejected {
                    service: "test",
                    status: 500,
                    body: String::new(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, subject));
            Ok(())
        }
    }

    fn target(name: &'static str, fail: bool, sent: &Arc<Mutex<Vec<String>>>) -> Box<dyn Notifier> {
        Box::new(Recording {
            name,
            fail,
            sent: sent.clone(),
        })
    }

    #[tokio::test]
    async fn sends_to_every_target() {
        let sent = Arc::new(Mutex::new(vec![]));
        let fanout = FanoutNotifier::new(vec![target("email", false, &sent), target("whatsapp", false, &sent)]);

        fanout.send("subject", "body").await.unwrap();
        assert_eq!(*sent.lock().unwrap(), vec!["email:subject", "whatsapp:subject"]);
        assert_eq!(fanout.names(), vec!["email", "whatsapp"]);
    }

    #[tokio::test]
    async fn partial_failure_is_ok() {
        let sent = Arc::new(Mutex::new(vec![]));
        let fanout = FanoutNotifier::new(vec![target("email", true, &sent), target("whatsapp", false, &sent)]);

        assert!(fanout.send("subject", "body").await.is_ok());
        assert_eq!(*sent.lock().unwrap(), vec!["whatsapp:subject"]);
    }

    #[tokio::test]
    async fn total_failure_is_an_error() {
        let sent = Arc::new(Mutex::new(vec![]));
        let fanout = FanoutNotifier::new(vec![target("email", true, &sent)]);
        assert!(fanout.send("subject", "body").await.is_err());
    }

    #[tokio::test]
    async fn empty_fanout_and_noop_succeed() {
        assert!(FanoutNotifier::new(vec![]).send("s", "b").await.is_ok());
        assert!(NoopNotifier.send("s", "b").await.is_ok());
    }
}
