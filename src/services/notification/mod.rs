//! Outbound player notifications for swap and schedule events.
//!
//! The coordinator hands a [`LeagueEvent`] to a [`NotificationGateway`]. The
//! default gateway, [`DirectoryNotifier`], looks the recipient up in the player
//! directory, renders an email and an SMS text, and passes them to a
//! [`MessageChannel`] for delivery.

#[cfg(feature = "webhook-notifier")]
pub mod webhook;

use std::{error::Error, fmt, sync::Arc};

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::dao::{
    league_store::PlayerDirectory,
    models::PlayerEntity,
    storage::StorageError,
};

const SIGNATURE: &str = "Best regards,\nGolf League Manager";

/// Both sides of a swap, with display names resolved when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRef {
    pub swap_id: String,
    pub week_id: String,
    pub requesting_player_id: String,
    pub requesting_player_name: String,
    pub target_player_id: String,
    pub target_player_name: String,
}

impl SwapRef {
    /// Name of whoever is on the other side of the swap from `player_id`.
    fn counterpart_name(&self, player_id: &str) -> &str {
        if player_id == self.requesting_player_id {
            &self.target_player_name
        } else {
            &self.requesting_player_name
        }
    }
}

/// Event emitted by the services, addressed to a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeagueEvent {
    /// A swap was requested; sent to the target.
    SwapRequested { recipient: String, swap: SwapRef },
    /// A swap was approved; sent to both players.
    SwapApproved { recipient: String, swap: SwapRef },
    /// A swap was rejected; sent to the requester when enabled.
    SwapRejected { recipient: String, swap: SwapRef },
    /// A schedule entry was created or changed.
    ScheduleUpdated {
        recipient: String,
        week_id: String,
        time: String,
        course: String,
    },
}

/// Discriminant of [`LeagueEvent`] used in logs and webhook payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    SwapRequested,
    SwapApproved,
    SwapRejected,
    ScheduleUpdated,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::SwapRequested => "SWAP_REQUESTED",
            EventKind::SwapApproved => "SWAP_APPROVED",
            EventKind::SwapRejected => "SWAP_REJECTED",
            EventKind::ScheduleUpdated => "SCHEDULE_UPDATED",
        };
        f.write_str(label)
    }
}

impl LeagueEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LeagueEvent::SwapRequested { .. } => EventKind::SwapRequested,
            LeagueEvent::SwapApproved { .. } => EventKind::SwapApproved,
            LeagueEvent::SwapRejected { .. } => EventKind::SwapRejected,
            LeagueEvent::ScheduleUpdated { .. } => EventKind::ScheduleUpdated,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            LeagueEvent::SwapRequested { recipient, .. }
            | LeagueEvent::SwapApproved { recipient, .. }
            | LeagueEvent::SwapRejected { recipient, .. }
            | LeagueEvent::ScheduleUpdated { recipient, .. } => recipient,
        }
    }
}

/// Failures raised while notifying a player.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The recipient is not in the player directory.
    #[error("unknown notification recipient `{0}`")]
    UnknownRecipient(String),
    /// Looking up the recipient failed.
    #[error("failed to resolve notification recipient")]
    Storage(#[from] StorageError),
    /// The channel could not hand the message over.
    #[error("failed to deliver notification through {channel}")]
    Delivery {
        channel: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The channel answered with a non-success status.
    #[error("{channel} rejected notification with status {status}")]
    Rejected { channel: &'static str, status: u16 },
}

/// Sends typed events to players.
pub trait NotificationGateway: Send + Sync {
    fn notify(&self, event: LeagueEvent) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// Rendered email and SMS for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub kind: EventKind,
    pub to_email: String,
    /// Absent when the player has no phone number; SMS is skipped.
    pub to_phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub sms: String,
}

/// Transport for rendered messages.
pub trait MessageChannel: Send + Sync {
    fn deliver(&self, message: OutboundMessage) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// Channel that only writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl MessageChannel for LogChannel {
    fn deliver(&self, message: OutboundMessage) -> BoxFuture<'static, Result<(), NotifyError>> {
        Box::pin(async move {
            info!(
                kind = %message.kind,
                to = %message.to_email,
                sms = message.to_phone.is_some(),
                subject = %message.subject,
                "notification sent"
            );
            Ok(())
        })
    }
}

/// Gateway resolving recipients through the player directory.
#[derive(Clone)]
pub struct DirectoryNotifier {
    players: Arc<dyn PlayerDirectory>,
    channel: Arc<dyn MessageChannel>,
}

impl DirectoryNotifier {
    pub fn new(players: Arc<dyn PlayerDirectory>, channel: Arc<dyn MessageChannel>) -> Self {
        Self { players, channel }
    }
}

impl NotificationGateway for DirectoryNotifier {
    fn notify(&self, event: LeagueEvent) -> BoxFuture<'static, Result<(), NotifyError>> {
        let players = self.players.clone();
        let channel = self.channel.clone();
        Box::pin(async move {
            let recipient = event.recipient().to_owned();
            let player = players
                .find_player(recipient.clone())
                .await?
                .ok_or(NotifyError::UnknownRecipient(recipient))?;
            channel.deliver(render(&event, &player)).await
        })
    }
}

/// Render the email and SMS texts of `event` for `player`.
pub fn render(event: &LeagueEvent, player: &PlayerEntity) -> OutboundMessage {
    let name = &player.name;
    let (subject, body, sms) = match event {
        LeagueEvent::SwapRequested { swap, .. } => (
            "Golf League Swap Request",
            format!(
                "Hello {name},\n\n{requester} has requested to swap weeks with you for week {week}.\n\n\
                 Please log in to the Golf League Manager to accept or decline this request.\n\n{SIGNATURE}",
                requester = swap.requesting_player_name,
                week = swap.week_id,
            ),
            format!(
                "Swap Request: {} wants to swap week {}",
                swap.requesting_player_name, swap.week_id
            ),
        ),
        LeagueEvent::SwapApproved { swap, .. } => {
            let other = swap.counterpart_name(&player.id);
            (
                "Golf League Swap Accepted",
                format!(
                    "Hello {name},\n\nYour swap request with {other} for week {week} has been accepted.\n\n\
                     Please log in to the Golf League Manager to view your updated schedule.\n\n{SIGNATURE}",
                    week = swap.week_id,
                ),
                format!(
                    "Swap Accepted: Your swap with {other} for week {} is confirmed",
                    swap.week_id
                ),
            )
        }
        LeagueEvent::SwapRejected { swap, .. } => (
            "Golf League Swap Declined",
            format!(
                "Hello {name},\n\nYour swap request with {target} for week {week} has been declined.\n\n{SIGNATURE}",
                target = swap.target_player_name,
                week = swap.week_id,
            ),
            format!(
                "Swap Declined: {} declined your swap for week {}",
                swap.target_player_name, swap.week_id
            ),
        ),
        LeagueEvent::ScheduleUpdated {
            week_id,
            time,
            course,
            ..
        } => (
            "Golf League Schedule Update",
            format!(
                "Hello {name},\n\nYour golf league schedule has been updated for week {week_id}.\n\n\
                 Time: {time}\nCourse: {course}\n\n\
                 Please log in to the Golf League Manager to view your updated schedule.\n\n{SIGNATURE}"
            ),
            format!("Golf League Update: Week {week_id} - Time: {time}, Course: {course}"),
        ),
    };

    OutboundMessage {
        kind: event.kind(),
        to_email: player.email.clone(),
        to_phone: player
            .phone_number
            .as_ref()
            .filter(|phone| !phone.trim().is_empty())
            .cloned(),
        subject: subject.to_owned(),
        body,
        sms,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::dao::league_store::memory::MemoryLeagueStore;

    #[derive(Default)]
    struct CapturingChannel {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl MessageChannel for Arc<CapturingChannel> {
        fn deliver(&self, message: OutboundMessage) -> BoxFuture<'static, Result<(), NotifyError>> {
            let channel = self.clone();
            Box::pin(async move {
                channel.sent.lock().unwrap().push(message);
                Ok(())
            })
        }
    }

    fn player(id: &str, name: &str, phone: Option<&str>) -> PlayerEntity {
        PlayerEntity {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@example.com"),
            phone_number: phone.map(Into::into),
            share: 50,
        }
    }

    fn swap_ref() -> SwapRef {
        SwapRef {
            swap_id: "2024-05-12-b-a".into(),
            week_id: "2024-05-12".into(),
            requesting_player_id: "b".into(),
            requesting_player_name: "Bea".into(),
            target_player_id: "a".into(),
            target_player_name: "Al".into(),
        }
    }

    #[test]
    fn renders_swap_request_wording() {
        let event = LeagueEvent::SwapRequested {
            recipient: "a".into(),
            swap: swap_ref(),
        };
        let message = render(&event, &player("a", "Al", Some("+15550100")));

        assert_eq!(message.subject, "Golf League Swap Request");
        assert!(message.body.starts_with(
            "Hello Al,\n\nBea has requested to swap weeks with you for week 2024-05-12."
        ));
        assert_eq!(message.sms, "Swap Request: Bea wants to swap week 2024-05-12");
        assert_eq!(message.to_phone.as_deref(), Some("+15550100"));
    }

    #[test]
    fn approved_message_names_the_other_player() {
        let swap = swap_ref();
        let to_requester = render(
            &LeagueEvent::SwapApproved {
                recipient: "b".into(),
                swap: swap.clone(),
            },
            &player("b", "Bea", None),
        );
        let to_target = render(
            &LeagueEvent::SwapApproved {
                recipient: "a".into(),
                swap,
            },
            &player("a", "Al", None),
        );

        assert_eq!(
            to_requester.sms,
            "Swap Accepted: Your swap with Al for week 2024-05-12 is confirmed"
        );
        assert_eq!(
            to_target.sms,
            "Swap Accepted: Your swap with Bea for week 2024-05-12 is confirmed"
        );
        assert!(to_requester.to_phone.is_none());
    }

    #[test]
    fn schedule_update_lists_time_and_course() {
        let event = LeagueEvent::ScheduleUpdated {
            recipient: "a".into(),
            week_id: "2024-05-12".into(),
            time: "5:30 PM".into(),
            course: "TBD".into(),
        };
        let message = render(&event, &player("a", "Al", Some("  ")));

        assert!(message.body.contains("Time: 5:30 PM\nCourse: TBD"));
        assert_eq!(
            message.sms,
            "Golf League Update: Week 2024-05-12 - Time: 5:30 PM, Course: TBD"
        );
        assert!(message.to_phone.is_none());
    }

    #[tokio::test]
    async fn directory_notifier_resolves_recipient() {
        let store = MemoryLeagueStore::new();
        store.save_player(player("a", "Al", None)).await.unwrap();
        let channel = Arc::new(CapturingChannel::default());
        let notifier = DirectoryNotifier::new(Arc::new(store), Arc::new(channel.clone()));

        notifier
            .notify(LeagueEvent::SwapRequested {
                recipient: "a".into(),
                swap: swap_ref(),
            })
            .await
            .unwrap();

        let err = notifier
            .notify(LeagueEvent::SwapRequested {
                recipient: "ghost".into(),
                swap: swap_ref(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::UnknownRecipient(id) if id == "ghost"));

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_email, "a@example.com");
        assert_eq!(sent[0].kind, EventKind::SwapRequested);
    }
}
