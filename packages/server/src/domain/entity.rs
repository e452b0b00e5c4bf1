//! ドメイン層のエンティティ定義
//!
//! Room はメッセージ履歴と参加者リストを内包する集約ルートです。
//! `participant_count` は参加者リストから都度導出され、独立したカウンタは持ちません。

use super::value_object::{
    ConnectionId, MessageContent, MessageId, Nickname, ParticipantId, RoomId, Timestamp,
};

/// A participant bound to one live connection in one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Session identity, assigned per join
    pub id: ParticipantId,
    /// Self-asserted display name
    pub nickname: Nickname,
    /// The live transport handle this participant is bound to
    pub connection: ConnectionId,
    /// When this participant joined the room
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        nickname: Nickname,
        connection: ConnectionId,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id,
            nickname,
            connection,
            joined_at,
        }
    }
}

/// An immutable chat message. Append-only per room; ordering is append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Owning room
    pub room_id: RoomId,
    /// Sender identity; `None` for anonymous/system messages
    pub sender_id: Option<ParticipantId>,
    pub sender_nickname: Nickname,
    pub content: MessageContent,
    /// Server-assigned send time
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        room_id: RoomId,
        sender_id: Option<ParticipantId>,
        sender_nickname: Nickname,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            room_id,
            sender_id,
            sender_nickname,
            content,
            timestamp,
        }
    }
}

/// An ephemeral chat room.
///
/// Holds the message history and the participant set. Lives only in memory;
/// destroyed explicitly or by the idle sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// Advances on every message send, join, or leave
    pub last_activity_at: Timestamp,
    pub participants: Vec<Participant>,
    pub messages: Vec<ChatMessage>,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            last_activity_at: created_at,
            participants: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Derived participant count. Never stored separately.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Record activity on the room.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity_at = now;
    }

    /// Add a participant.
    ///
    /// Idempotent on the connection handle: an existing entry for the same
    /// connection is replaced, so a duplicate join from one connection never
    /// produces two participant records.
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants
            .retain(|p| p.connection != participant.connection);
        self.participants.push(participant);
    }

    /// Remove the participant bound to the given connection, if any.
    pub fn remove_participant(&mut self, connection: &ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.connection == *connection)?;
        Some(self.participants.remove(index))
    }

    /// Append a message to the history.
    pub fn append_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Whether the room has been inactive for longer than the threshold.
    pub fn is_idle(&self, now: Timestamp, threshold_minutes: i64) -> bool {
        now.value() - self.last_activity_at.value() > threshold_minutes * 60_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::RoomIdFactory;

    fn test_room() -> Room {
        Room::new(RoomIdFactory::generate(), Timestamp::new(1_000))
    }

    fn test_participant(connection: ConnectionId, nickname: &str) -> Participant {
        Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname),
            connection,
            Timestamp::new(1_000),
        )
    }

    #[test]
    fn test_participant_count_is_derived_from_participant_list() {
        // テスト項目: participant_count が参加者リストの長さと常に一致する
        // given (前提条件):
        let mut room = test_room();
        let conn_alice = ConnectionId::generate();
        let conn_bob = ConnectionId::generate();

        // when (操作):
        room.add_participant(test_participant(conn_alice, "Alice"));
        room.add_participant(test_participant(conn_bob, "Bob"));

        // then (期待する結果):
        assert_eq!(room.participant_count(), room.participants.len());
        assert_eq!(room.participant_count(), 2);

        // when (操作): 1人削除
        room.remove_participant(&conn_alice);

        // then (期待する結果):
        assert_eq!(room.participant_count(), room.participants.len());
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_add_participant_replaces_entry_for_same_connection() {
        // テスト項目: 同じ接続からの重複 join で参加者エントリが置き換えられる
        // given (前提条件):
        let mut room = test_room();
        let connection = ConnectionId::generate();
        room.add_participant(test_participant(connection, "Alice"));

        // when (操作): 同じ接続で再度参加する
        let rejoined = test_participant(connection, "Alice2");
        room.add_participant(rejoined.clone());

        // then (期待する結果): エントリは1件のみで、新しい参加者に置き換わっている
        assert_eq!(room.participant_count(), 1);
        assert_eq!(room.participants[0].id, rejoined.id);
        assert_eq!(room.participants[0].nickname.as_str(), "Alice2");
    }

    #[test]
    fn test_remove_participant_for_unknown_connection_is_noop() {
        // テスト項目: 存在しない接続の削除は何もしない（冪等性）
        // given (前提条件):
        let mut room = test_room();
        room.add_participant(test_participant(ConnectionId::generate(), "Alice"));

        // when (操作):
        let removed = room.remove_participant(&ConnectionId::generate());

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_messages_keep_append_order() {
        // テスト項目: メッセージ履歴が追加順に並ぶ
        // given (前提条件):
        let mut room = test_room();
        let first = ChatMessage::new(
            room.id.clone(),
            None,
            Nickname::new("Alice"),
            MessageContent::new("first".to_string()).unwrap(),
            Timestamp::new(2_000),
        );
        let second = ChatMessage::new(
            room.id.clone(),
            None,
            Nickname::new("Bob"),
            MessageContent::new("second".to_string()).unwrap(),
            Timestamp::new(1_500),
        );

        // when (操作): タイムスタンプの逆順で追加する
        room.append_message(first.clone());
        room.append_message(second.clone());

        // then (期待する結果): 並び順は追加順のまま
        assert_eq!(room.messages.len(), 2);
        assert_eq!(room.messages[0].id, first.id);
        assert_eq!(room.messages[1].id, second.id);
    }

    #[test]
    fn test_is_idle_respects_threshold() {
        // テスト項目: 閾値を超えた非アクティブ時間で is_idle が true になる
        // given (前提条件):
        let mut room = test_room();
        room.touch(Timestamp::new(0));
        let threshold_minutes = 10;

        // when (操作) / then (期待する結果): ちょうど閾値の場合はまだアクティブ
        assert!(!room.is_idle(Timestamp::new(10 * 60_000), threshold_minutes));

        // when (操作) / then (期待する結果): 閾値を1ミリ秒でも超えたら非アクティブ
        assert!(room.is_idle(Timestamp::new(10 * 60_000 + 1), threshold_minutes));
    }

    #[test]
    fn test_touch_advances_last_activity() {
        // テスト項目: touch で lastActivityAt が前進する
        // given (前提条件):
        let mut room = test_room();
        let before = room.last_activity_at;

        // when (操作):
        room.touch(Timestamp::new(5_000));

        // then (期待する結果):
        assert!(room.last_activity_at > before);
        assert_eq!(room.last_activity_at.value(), 5_000);
    }
}
