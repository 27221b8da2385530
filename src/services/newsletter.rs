//! Newsletter delivery
//!
//! Fans a stored newsletter out to every subscriber and tells the site owner
//! about new subscriptions. Each recipient is attempted once; failures are
//! collected in the [`DispatchReport`] rather than aborting the run.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

use super::email::{DeliveryError, EmailSettings, Notifier};
use crate::models::{NewsLetter, Subscriber};

/// A recipient the newsletter could not be delivered to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelivery {
    pub email: String,
    pub reason: String,
}

/// Per-recipient outcome of a newsletter run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sends newsletters and subscription notices through a [`Notifier`]
#[derive(Clone)]
pub struct NewsletterDispatcher {
    notifier: Arc<dyn Notifier>,
    settings: EmailSettings,
}

impl NewsletterDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, settings: EmailSettings) -> Self {
        Self { notifier, settings }
    }

    pub fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    /// Send `newsletter` to every subscriber concurrently
    pub async fn dispatch(&self, newsletter: &NewsLetter, subscribers: &[Subscriber]) -> DispatchReport {
        let sends = subscribers.iter().map(|subscriber| {
            let settings = self.settings.for_recipient(&subscriber.email);
            async move {
                let outcome = self
                    .notifier
                    .send(&settings, &newsletter.subject, &newsletter.body)
                    .await;
                (settings.target_email, outcome)
            }
        });

        let mut report = DispatchReport::default();
        for (email, outcome) in join_all(sends).await {
            match outcome {
                Ok(()) => report.delivered.push(email),
                Err(err) => {
                    tracing::warn!("Newsletter delivery to {} failed: {}", email, err);
                    report.failed.push(FailedDelivery {
                        email,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Newsletter '{}' sent: {} delivered, {} failed",
            newsletter.subject,
            report.delivered.len(),
            report.failed.len()
        );
        report
    }

    /// Tell the configured target address about a new subscriber
    pub async fn notify_subscription(&self, subscriber: &Subscriber) -> Result<(), DeliveryError> {
        let subject = "New newsletter subscriber";
        let body = format!(
            "{} subscribed to the newsletter on {}.",
            subscriber.email,
            subscriber.subscribed_at.format("%Y-%m-%d %H:%M UTC")
        );

        self.notifier
            .send(&self.settings, subject, &body)
            .await
            .map_err(|err| {
                tracing::warn!("Subscription notice for {} failed: {}", subscriber.email, err);
                err
            })
    }
}
