use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::session::Session;
use crate::storage::{DocumentStore, DocumentStoreExt, KeyLocks, RecordKey};
use shared::{MailFilter, MailListResponse, MailMessage};

pub(crate) type MailMap = BTreeMap<String, MailMessage>;

/// Service for the notification-style inbox
#[derive(Clone)]
pub struct MailService {
    store: Arc<dyn DocumentStore>,
    locks: KeyLocks,
    session: Session,
}

impl MailService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: KeyLocks, session: Session) -> Self {
        Self {
            store,
            locks,
            session,
        }
    }

    fn mail_key(&self) -> RecordKey {
        RecordKey::mail(self.session.user_id())
    }

    /// The filtered inbox, newest first. A first-time reader finds the
    /// welcome messages already there.
    pub async fn inbox(&self, filter: MailFilter) -> DomainResult<MailListResponse> {
        let mut messages: MailMap = self.store.read_or_default(&self.mail_key()).await?;
        if messages.is_empty() {
            messages = self.seed_welcome_messages().await?;
        }

        let mut messages: Vec<MailMessage> = messages.into_values().collect();
        messages.sort_by_key(|m| Reverse(message_stamp(m)));

        let messages = match filter {
            MailFilter::Recent => messages,
            MailFilter::LastWeek => {
                let cutoff = (Utc::now() - Duration::days(7)).timestamp_millis();
                messages
                    .into_iter()
                    .filter(|m| message_stamp(m) > cutoff)
                    .collect()
            }
            MailFilter::Important => messages.into_iter().filter(|m| m.is_important).collect(),
        };

        Ok(MailListResponse { messages })
    }

    /// Put the starter messages into an inbox that has never held anything.
    /// Runs at most once per user.
    pub async fn seed_welcome_messages(&self) -> DomainResult<MailMap> {
        let key = self.mail_key();
        let _guard = self.locks.acquire(&key.lock_key()).await;
        let mut messages: MailMap = self.store.read_or_default(&key).await?;

        if messages.is_empty() {
            info!("Seeding welcome messages for {}", self.session.user_id());
            for message in welcome_messages(Utc::now()) {
                messages.insert(message.id.clone(), message);
            }
            self.store.write(&key, &messages).await?;
        }

        Ok(messages)
    }
}

/// Sort stamp of a message; unparseable timestamps sink to the bottom
fn message_stamp(message: &MailMessage) -> i64 {
    DateTime::parse_from_rfc3339(&message.timestamp)
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

/// The four messages every new inbox starts with
fn welcome_messages(now: DateTime<Utc>) -> Vec<MailMessage> {
    let entries = [
        (
            now,
            "System",
            "Welcome to PawPal!",
            "We are so excited to have you and your companion! Check out the dashboard to manage their daily tasks and appointments.",
            true,
            false,
        ),
        (
            now - Duration::hours(1),
            "Support",
            "Urgent: Appointment Reminder",
            "Remember your upcoming vet appointment for Rex on Friday at 2:00 PM. Please ensure all vaccinations are up to date!",
            true,
            false,
        ),
        (
            now - Duration::days(3),
            "PawPal",
            "New Feature Alert: Dashboard Widgets!",
            "You can now customize your pet's dashboard with new widgets, including a daily steps tracker and a mood log. Give it a try!",
            false,
            false,
        ),
        (
            now - Duration::days(10),
            "System",
            "Account Verified Successfully",
            "Your PawPal account and profile settings have been successfully verified. You are ready to go!",
            false,
            true,
        ),
    ];

    entries
        .into_iter()
        .map(|(at, sender, subject, content, is_important, is_read)| MailMessage {
            id: MailMessage::generate_id(at.timestamp_millis() as u64),
            sender: sender.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
            timestamp: at.to_rfc3339(),
            is_important,
            is_read,
        })
        .collect()
}
