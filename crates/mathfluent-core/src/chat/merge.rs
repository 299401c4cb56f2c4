use crate::models::{Message, MessageStatus};

/// Merge a store snapshot into the currently visible list.
///
/// The result is the snapshot (minus anything flagged pending) followed by
/// the local messages the snapshot does not account for yet. Pending and
/// sent local messages disappear once the store echoes them; failed ones
/// were never stored and stay until the view is left.
pub fn merge_snapshot(previous: &[Message], snapshot: Vec<Message>) -> Vec<Message> {
    let mut merged: Vec<Message> = snapshot
        .into_iter()
        .filter(|m| m.status != MessageStatus::Pending)
        .collect();
    let server_len = merged.len();

    let unmatched: Vec<Message> = previous
        .iter()
        .filter(|m| m.is_local())
        .filter(|local| {
            local.status == MessageStatus::Failed
                || !merged[..server_len].iter().any(|s| local.is_echoed_by(s))
        })
        .cloned()
        .collect();

    merged.extend(unmatched);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conversation, Sender};
    use chrono::Utc;

    fn msg(id: &str, sender: &str, text: &str, status: MessageStatus) -> Message {
        Message {
            id: id.to_string(),
            text: text.to_string(),
            sender: Sender {
                id: sender.to_string(),
                name: sender.to_uppercase(),
                avatar: None,
            },
            timestamp: Utc::now(),
            conversation: Conversation::Thread("u1_u2".to_string()),
            status,
            client_token: None,
        }
    }

    fn ids(list: &[Message]) -> Vec<&str> {
        list.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_server_list_then_unmatched_pending() {
        let previous = vec![
            msg("m1", "u2", "hi", MessageStatus::Sent),
            msg("temp_a", "u1", "hello", MessageStatus::Pending),
        ];
        let snapshot = vec![
            msg("m1", "u2", "hi", MessageStatus::Sent),
            msg("m2", "u2", "anyone?", MessageStatus::Sent),
        ];
        let merged = merge_snapshot(&previous, snapshot);
        assert_eq!(ids(&merged), vec!["m1", "m2", "temp_a"]);
    }

    #[test]
    fn test_echo_replaces_local_copy_once() {
        let previous = vec![msg("temp_a", "u1", "hello", MessageStatus::Sent)];
        let snapshot = vec![msg("m9", "u1", "hello", MessageStatus::Sent)];
        let merged = merge_snapshot(&previous, snapshot);
        assert_eq!(ids(&merged), vec!["m9"]);
    }

    #[test]
    fn test_same_text_from_other_sender_is_not_an_echo() {
        let previous = vec![msg("temp_a", "u1", "ok", MessageStatus::Pending)];
        let snapshot = vec![msg("m1", "u2", "ok", MessageStatus::Sent)];
        let merged = merge_snapshot(&previous, snapshot);
        assert_eq!(ids(&merged), vec!["m1", "temp_a"]);
    }

    #[test]
    fn test_pending_flags_in_snapshot_are_filtered() {
        let snapshot = vec![
            msg("m1", "u2", "hi", MessageStatus::Sent),
            msg("temp_x", "u2", "ghost", MessageStatus::Pending),
        ];
        let merged = merge_snapshot(&[], snapshot);
        assert_eq!(ids(&merged), vec!["m1"]);
    }

    #[test]
    fn test_failed_messages_survive_merges() {
        let previous = vec![msg("temp_f", "u1", "hello", MessageStatus::Failed)];
        let snapshot = vec![msg("m1", "u1", "hello", MessageStatus::Sent)];
        let merged = merge_snapshot(&previous, snapshot);
        assert_eq!(ids(&merged), vec!["m1", "temp_f"]);
    }

    #[test]
    fn test_tokens_keep_duplicate_sends_apart() {
        let mut first = msg("temp_1", "u1", "+1", MessageStatus::Pending);
        first.client_token = Some("temp_1".into());
        let mut second = msg("temp_2", "u1", "+1", MessageStatus::Pending);
        second.client_token = Some("temp_2".into());

        let mut echo = msg("m1", "u1", "+1", MessageStatus::Sent);
        echo.client_token = Some("temp_1".into());

        let merged = merge_snapshot(&[first, second], vec![echo]);
        assert_eq!(ids(&merged), vec!["m1", "temp_2"]);
    }

    #[test]
    fn test_untracked_previous_server_messages_are_replaced() {
        let previous = vec![msg("m_old", "u2", "deleted upstream", MessageStatus::Sent)];
        let merged = merge_snapshot(&previous, vec![]);
        assert!(merged.is_empty());
    }
}
