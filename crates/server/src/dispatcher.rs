// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background delivery of notification jobs.
//!
//! Handlers hand notifications to [`NotificationDispatcher::submit`], which
//! only enqueues them. A spawned worker renders each job into one or more
//! outbound messages and passes them to a [`MessageTransport`].
//!
//! # Architecture
//!
//! - The queue is an unbounded `tokio::sync::mpsc` channel
//! - Submitting never waits for delivery and never fails the caller
//! - Delivery failures are logged by the worker and dropped
//! - The worker stops once every dispatcher handle is dropped

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use trail_france_api::{Notification, NotificationSink, RaceSummary};

/// Settings used to render outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Base URL of the public site; race links are built from it.
    pub public_base_url: String,
    /// From-address of outbound messages.
    pub sender_email: String,
}

impl DispatcherConfig {
    /// Public link to a race page.
    #[must_use]
    pub fn race_link(&self, race_id: &str) -> String {
        format!(
            "{}/races/{race_id}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery failures reported by a transport.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The message has no usable recipient.
    #[error("message has no recipient")]
    MissingRecipient,

    /// The transport refused or could not send the message.
    #[error("transport refused message: {0}")]
    Refused(String),
}

/// Sends rendered messages somewhere.
pub trait MessageTransport: Send + Sync {
    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// Returns a `DeliveryError` if the message could not be delivered.
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError>;
}

/// Transport that writes every message to the log.
pub struct LogTransport;

impl MessageTransport for LogTransport {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        if message.to.trim().is_empty() {
            return Err(DeliveryError::MissingRecipient);
        }
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Outbound message"
        );
        debug!(body = %message.body, "Outbound message body");
        Ok(())
    }
}

fn race_line(race: &RaceSummary) -> String {
    format!("{} ({}, {})", race.name, race.location, race.race_date)
}

/// Renders a notification into the messages it produces.
///
/// Approval notifications produce one message per recipient; admin
/// notifications produce exactly one.
#[must_use]
pub fn render(config: &DispatcherConfig, notification: &Notification) -> Vec<OutboundMessage> {
    let race: &RaceSummary = notification.race();
    let link: String = config.race_link(&race.id);

    match notification {
        Notification::ReportReceived {
            to,
            reason,
            report_count,
            threshold,
            ..
        } => vec![OutboundMessage {
            from: config.sender_email.clone(),
            to: to.clone(),
            subject: format!("Closure report for {}", race.name),
            body: format!(
                "A visitor reported that registration is closed for {}.\n\
                 Reason: {reason}\n\
                 Pending reports: {report_count}/{threshold}\n\n\
                 {link}\n",
                race_line(race)
            ),
        }],
        Notification::RaceAutoClosed {
            to, report_count, ..
        } => vec![OutboundMessage {
            from: config.sender_email.clone(),
            to: to.clone(),
            subject: format!("Registration closed automatically for {}", race.name),
            body: format!(
                "Registration for {} was closed after {report_count} visitor reports.\n\
                 Review the race if this looks wrong.\n\n\
                 {link}\n",
                race_line(race)
            ),
        }],
        Notification::RaceApproved { recipients, .. } => recipients
            .iter()
            .map(|recipient| OutboundMessage {
                from: config.sender_email.clone(),
                to: recipient.clone(),
                subject: format!("{} is now published", race.name),
                body: format!(
                    "A race in your favorites has been published: {}.\n\n\
                     {link}\n",
                    race_line(race)
                ),
            })
            .collect(),
    }
}

/// Handle used by request handlers to queue notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationDispatcher {
    /// Starts the delivery worker on the current runtime.
    ///
    /// # Returns
    ///
    /// The dispatcher handle and the worker task. The worker ends when all
    /// handles are dropped and the queue is drained.
    #[must_use]
    pub fn spawn(
        config: DispatcherConfig,
        transport: Arc<dyn MessageTransport>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker: JoinHandle<()> = tokio::spawn(run_worker(rx, config, transport));
        (Self { tx }, worker)
    }
}

impl NotificationSink for NotificationDispatcher {
    fn submit(&self, notification: Notification) {
        let race_id: String = notification.race().id.clone();
        if self.tx.send(notification).is_err() {
            warn!(race_id = %race_id, "Notification worker is gone, dropping notification");
        } else {
            debug!(race_id = %race_id, "Notification queued");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    config: DispatcherConfig,
    transport: Arc<dyn MessageTransport>,
) {
    info!("Notification worker started");

    while let Some(notification) = rx.recv().await {
        for message in render(&config, &notification) {
            match transport.deliver(&message) {
                Ok(()) => debug!(to = %message.to, "Message delivered"),
                Err(e) => warn!(
                    to = %message.to,
                    subject = %message.subject,
                    error = %e,
                    "Message delivery failed"
                ),
            }
        }
    }

    info!("Notification worker stopped");
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingTransport {
        delivered: Mutex<Vec<OutboundMessage>>,
    }

    impl MessageTransport for CapturingTransport {
        fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingTransport;

    impl MessageTransport for FailingTransport {
        fn deliver(&self, _message: &OutboundMessage) -> Result<(), DeliveryError> {
            Err(DeliveryError::Refused(String::from("mailbox unavailable")))
        }
    }

    fn config() -> DispatcherConfig {
        DispatcherConfig {
            public_base_url: String::from("https://trail.example/"),
            sender_email: String::from("noreply@trail.example"),
        }
    }

    fn summary() -> RaceSummary {
        RaceSummary {
            id: String::from("race-1"),
            name: String::from("Trail des Aiguilles"),
            location: String::from("Chamonix"),
            race_date: String::from("2026-08-29"),
        }
    }

    #[test]
    fn test_race_link_trims_trailing_slash() {
        assert_eq!(
            config().race_link("abc"),
            "https://trail.example/races/abc"
        );
    }

    #[test]
    fn test_render_report_received() {
        let messages = render(
            &config(),
            &Notification::ReportReceived {
                to: String::from("admin@trail.example"),
                race: summary(),
                reason: String::from("Complet"),
                report_count: 2,
                threshold: 3,
            },
        );

        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.from, "noreply@trail.example");
        assert_eq!(message.to, "admin@trail.example");
        assert!(message.subject.contains("Trail des Aiguilles"));
        assert!(message.body.contains("Reason: Complet"));
        assert!(message.body.contains("2/3"));
        assert!(message.body.contains("https://trail.example/races/race-1"));
    }

    #[test]
    fn test_render_approval_addresses_each_recipient() {
        let messages = render(
            &config(),
            &Notification::RaceApproved {
                race: summary(),
                recipients: vec![
                    String::from("a@example.fr"),
                    String::from("b@example.fr"),
                ],
            },
        );

        let recipients: Vec<&str> = messages.iter().map(|m| m.to.as_str()).collect();
        assert_eq!(recipients, vec!["a@example.fr", "b@example.fr"]);
        assert!(messages.iter().all(|m| m.subject.contains("published")));
    }

    #[test]
    fn test_log_transport_refuses_blank_recipient() {
        let message = OutboundMessage {
            from: String::from("noreply@trail.example"),
            to: String::from(" "),
            subject: String::from("s"),
            body: String::from("b"),
        };
        assert_eq!(
            LogTransport.deliver(&message),
            Err(DeliveryError::MissingRecipient)
        );
    }

    #[tokio::test]
    async fn test_worker_delivers_queued_notifications() {
        let transport = Arc::new(CapturingTransport::default());
        let (dispatcher, worker) = NotificationDispatcher::spawn(config(), transport.clone());

        dispatcher.submit(Notification::RaceAutoClosed {
            to: String::from("admin@trail.example"),
            race: summary(),
            report_count: 3,
        });
        drop(dispatcher);
        worker.await.unwrap();

        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].body.contains("after 3 visitor reports"));
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_stop_worker() {
        let (dispatcher, worker) =
            NotificationDispatcher::spawn(config(), Arc::new(FailingTransport));

        for _ in 0..3 {
            dispatcher.submit(Notification::RaceApproved {
                race: summary(),
                recipients: vec![String::from("a@example.fr")],
            });
        }
        drop(dispatcher);

        assert!(worker.await.is_ok());
    }
}
