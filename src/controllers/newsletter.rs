//! Newsletter signup

use chrono::Utc;
use std::sync::Arc;

use super::{ActionOutcome, ActionResult, ViewModel};
use crate::db::repositories::SubscriberRepository;
use crate::db::StorageError;
use crate::models::{Subscriber, SubscriberForm, ValidationErrors};
use crate::services::NewsletterDispatcher;

const ALREADY_SUBSCRIBED: &str = "This address is already subscribed";

pub struct NewsletterController {
    subscribers: Arc<dyn SubscriberRepository>,
    dispatcher: NewsletterDispatcher,
}

impl NewsletterController {
    pub fn new(subscribers: Arc<dyn SubscriberRepository>, dispatcher: NewsletterDispatcher) -> Self {
        Self {
            subscribers,
            dispatcher,
        }
    }

    fn form(form: SubscriberForm, errors: ValidationErrors) -> ActionResult {
        ActionResult::view("Index", ViewModel::SubscriberForm { form, errors })
    }

    fn already_subscribed(form: SubscriberForm) -> ActionResult {
        let mut errors = ValidationErrors::new();
        errors.add("email", ALREADY_SUBSCRIBED);
        Self::form(form, errors)
    }

    pub fn index(&self) -> ActionResult {
        Self::form(SubscriberForm::default(), ValidationErrors::new())
    }

    /// Register the address and notify the site owner
    pub async fn subscribe(&self, form: SubscriberForm) -> ActionOutcome {
        let errors = form.validate();
        if !errors.is_valid() {
            return Ok(Self::form(form, errors));
        }

        let email = form.normalized_email();
        if self.subscribers.find_by_email(&email).await?.is_some() {
            return Ok(Self::already_subscribed(form));
        }

        let subscriber = match self.subscribers.add(Subscriber::new(email, Utc::now())).await {
            Ok(subscriber) => subscriber,
            // Lost a race with a concurrent signup for the same address
            Err(StorageError::Constraint(_)) => return Ok(Self::already_subscribed(form)),
            Err(err) => return Err(err.into()),
        };

        let owner_notified = self.dispatcher.notify_subscription(&subscriber).await.is_ok();
        Ok(ActionResult::view(
            "Subscribed",
            ViewModel::Subscribed {
                subscriber,
                owner_notified,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::DbSubscriberRepository;
    use crate::db::{share, InMemoryDataContext, ModelSchema};
    use crate::services::{DeliveryError, EmailSettings, Notifier};
    use async_trait::async_trait;

    struct StubNotifier {
        deliver: bool,
    }

    #[async_trait]
    impl Notifier for StubNotifier {
        async fn send(&self, _settings: &EmailSettings, _subject: &str, _body: &str) -> Result<(), DeliveryError> {
            if self.deliver {
                Ok(())
            } else {
                Err(DeliveryError::Transport("connection refused".to_string()))
            }
        }
    }

    fn controller(deliver: bool) -> (NewsletterController, Arc<dyn SubscriberRepository>) {
        let context = share(InMemoryDataContext::new(Arc::new(ModelSchema::article_site())));
        let subscribers = DbSubscriberRepository::boxed(context);
        let dispatcher = NewsletterDispatcher::new(
            Arc::new(StubNotifier { deliver }),
            EmailSettings::new("localhost", "editor@example.com"),
        );
        (NewsletterController::new(subscribers.clone(), dispatcher), subscribers)
    }

    fn form(email: &str) -> SubscriberForm {
        SubscriberForm {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_index_returns_empty_form() {
        let (sut, _) = controller(true);
        assert_eq!(sut.index().view_name(), Some("Index"));
    }

    #[tokio::test]
    async fn test_invalid_email_rerenders_form() {
        let (sut, subscribers) = controller(true);
        let result = sut.subscribe(form("nope")).await.unwrap();

        assert_eq!(result.view_name(), Some("Index"));
        assert!(subscribers.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_stores_and_notifies() {
        let (sut, subscribers) = controller(true);
        let result = sut.subscribe(form("  reader@example.com ")).await.unwrap();

        match result.model() {
            Some(ViewModel::Subscribed { subscriber, owner_notified }) => {
                assert_eq!(subscriber.email, "reader@example.com");
                assert!(*owner_notified);
            }
            other => panic!("unexpected model {:?}", other),
        }
        assert_eq!(subscribers.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_subscription_rerenders_form() {
        let (sut, subscribers) = controller(true);
        sut.subscribe(form("reader@example.com")).await.unwrap();

        let result = sut.subscribe(form("READER@example.com")).await.unwrap();
        match result.model() {
            Some(ViewModel::SubscriberForm { errors, .. }) => {
                assert_eq!(errors.field("email"), [ALREADY_SUBSCRIBED.to_string()]);
            }
            other => panic!("unexpected model {:?}", other),
        }
        assert_eq!(subscribers.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_notice_still_subscribes() {
        let (sut, subscribers) = controller(false);
        let result = sut.subscribe(form("reader@example.com")).await.unwrap();

        assert!(matches!(
            result.model(),
            Some(ViewModel::Subscribed { owner_notified: false, .. })
        ));
        assert_eq!(subscribers.all().await.unwrap().len(), 1);
    }
}
