use crate::common::error::AppError;
use crate::models::messages::Message;
use crate::models::users::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_PARTICIPANTS: usize = 2;

#[derive(Debug, Serialize)]
pub struct Conversation {
    pub conversation_id: Uuid,
    pub participants: Vec<User>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.user_id == user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversationArgs {
    pub participant_ids: Vec<Uuid>,
}

impl ConversationArgs {
    /// Deduplicates the participants, keeping first-seen order, and checks there are enough.
    pub fn validated_participant_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let mut participant_ids = Vec::with_capacity(self.participant_ids.len());
        for participant_id in &self.participant_ids {
            if !participant_ids.contains(participant_id) {
                participant_ids.push(*participant_id);
            }
        }
        if participant_ids.len() < MIN_PARTICIPANTS {
            return Err(AppError::ConversationsTooFewParticipants);
        }
        Ok(participant_ids)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ConversationOrdering {
    #[serde(rename = "created_at")]
    OldestFirst,
    #[default]
    #[serde(rename = "-created_at")]
    NewestFirst,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationListArgs {
    #[serde(default)]
    pub ordering: ConversationOrdering,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(ids: &[u128]) -> ConversationArgs {
        ConversationArgs {
            participant_ids: ids.iter().copied().map(Uuid::from_u128).collect(),
        }
    }

    #[test]
    fn needs_two_distinct_participants() {
        assert!(matches!(
            args(&[1]).validated_participant_ids(),
            Err(AppError::ConversationsTooFewParticipants)
        ));
        assert!(matches!(
            args(&[1, 1]).validated_participant_ids(),
            Err(AppError::ConversationsTooFewParticipants)
        ));
    }

    #[test]
    fn deduplicates_in_order() {
        let ids = args(&[2, 1, 2, 3]).validated_participant_ids().unwrap();
        assert_eq!(ids, vec![Uuid::from_u128(2), Uuid::from_u128(1), Uuid::from_u128(3)]);
    }

    #[test]
    fn parses_ordering() {
        let ascending: ConversationListArgs =
            serde_json::from_str(r#"{"ordering":"created_at"}"#).unwrap();
        let default: ConversationListArgs = serde_json::from_str("{}").unwrap();
        assert_eq!(ascending.ordering, ConversationOrdering::OldestFirst);
        assert_eq!(default.ordering, ConversationOrdering::NewestFirst);
    }
}
