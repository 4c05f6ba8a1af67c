//! Interaction records
//!
//! Interactions arrive as a union tagged by `type` (meeting, call, chat
//! message, email). Downstream storage wants one fixed schema for the
//! `interactions` table, so the union flattens into a single record shape
//! that carries the columns of every variant, null where absent.

use super::EntityRef;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An interaction referenced from a relationship-intelligence field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Interaction {
    #[serde(rename_all = "camelCase")]
    Meeting {
        id: i64,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        all_day: Option<bool>,
        #[serde(default)]
        start_time: Option<DateTime<Utc>>,
        #[serde(default)]
        end_time: Option<DateTime<Utc>>,
        #[serde(default)]
        attendees: Option<Vec<Attendee>>,
    },
    #[serde(rename_all = "camelCase")]
    Call {
        id: i64,
        #[serde(default)]
        start_time: Option<DateTime<Utc>>,
        #[serde(default)]
        attendees: Option<Vec<Attendee>>,
    },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        id: i64,
        #[serde(default)]
        direction: Option<String>,
        /// Person id of the manual creator
        #[serde(default)]
        manual_creator: Option<i64>,
        #[serde(default)]
        participants: Option<Vec<Attendee>>,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Email {
        id: i64,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
        #[serde(default)]
        from: Option<Attendee>,
        #[serde(default)]
        to: Option<Vec<Attendee>>,
        #[serde(default)]
        cc: Option<Vec<Attendee>>,
    },
}

impl Interaction {
    /// The interaction id (unique only together with the kind)
    pub fn id(&self) -> i64 {
        match self {
            Self::Meeting { id, .. }
            | Self::Call { id, .. }
            | Self::ChatMessage { id, .. }
            | Self::Email { id, .. } => *id,
        }
    }

    /// The wire tag for this kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Meeting { .. } => "meeting",
            Self::Call { .. } => "call",
            Self::ChatMessage { .. } => "chat-message",
            Self::Email { .. } => "email",
        }
    }

    /// The `{id, type}` compound summary placed on the referencing record
    pub fn summary(&self) -> JsonValue {
        json!({ "id": self.id(), "type": self.kind() })
    }

    /// Flatten into the fixed `interactions` table shape
    ///
    /// Every column of every variant is present; columns foreign to this
    /// variant are null. Attendee person references become bare ids.
    pub fn flattened(&self) -> JsonObject {
        let mut record = JsonObject::new();
        record.insert("id".into(), json!(self.id()));
        record.insert("type".into(), json!(self.kind()));

        for column in [
            "title",
            "all_day",
            "start_time",
            "end_time",
            "attendees",
            "direction",
            "manual_creator",
            "participants",
            "sent_at",
            "subject",
            "from",
            "to",
            "cc",
        ] {
            record.insert(column.into(), JsonValue::Null);
        }

        match self {
            Self::Meeting {
                title,
                all_day,
                start_time,
                end_time,
                attendees,
                ..
            } => {
                record.insert("title".into(), json!(title));
                record.insert("all_day".into(), json!(all_day));
                record.insert("start_time".into(), json!(start_time));
                record.insert("end_time".into(), json!(end_time));
                record.insert("attendees".into(), flatten_attendees(attendees.as_deref()));
            }
            Self::Call {
                start_time,
                attendees,
                ..
            } => {
                record.insert("start_time".into(), json!(start_time));
                record.insert("attendees".into(), flatten_attendees(attendees.as_deref()));
            }
            Self::ChatMessage {
                direction,
                manual_creator,
                participants,
                sent_at,
                ..
            } => {
                record.insert("direction".into(), json!(direction));
                record.insert("manual_creator".into(), json!(manual_creator));
                record.insert(
                    "participants".into(),
                    flatten_attendees(participants.as_deref()),
                );
                record.insert("sent_at".into(), json!(sent_at));
            }
            Self::Email {
                subject,
                sent_at,
                from,
                to,
                cc,
                ..
            } => {
                record.insert("subject".into(), json!(subject));
                record.insert("sent_at".into(), json!(sent_at));
                record.insert(
                    "from".into(),
                    from.as_ref().map_or(JsonValue::Null, Attendee::flattened),
                );
                record.insert("to".into(), flatten_attendees(to.as_deref()));
                record.insert("cc".into(), flatten_attendees(cc.as_deref()));
            }
        }

        record
    }
}

/// A meeting/call attendee or message participant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default)]
    pub email_address: Option<String>,
    /// Matched person, when Affinity resolved the address
    #[serde(default)]
    pub person: Option<EntityRef>,
}

impl Attendee {
    /// Flatten to `{email_address, person_id}`
    pub fn flattened(&self) -> JsonValue {
        json!({
            "email_address": self.email_address,
            "person_id": self.person.map(|p| p.id),
        })
    }
}

fn flatten_attendees(attendees: Option<&[Attendee]>) -> JsonValue {
    match attendees {
        Some(list) => JsonValue::Array(list.iter().map(Attendee::flattened).collect()),
        None => JsonValue::Null,
    }
}
