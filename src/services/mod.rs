//! Services layer
//!
//! Outgoing email: the SMTP notifier and newsletter delivery built on it.

pub mod email;
pub mod newsletter;

pub use email::{build_message, DeliveryError, EmailSettings, Notifier, SmtpNotifier};
pub use newsletter::{DispatchReport, FailedDelivery, NewsletterDispatcher};
