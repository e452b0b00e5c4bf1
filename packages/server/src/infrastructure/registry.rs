//! Connection Registry 実装
//!
//! 生きている接続とルーム・参加者の対応を両方向から引けるインデックス。
//! グローバルなマップを持ち回る代わりに、この構造体を UseCase へ明示的に
//! 渡します（テスト時はフェイクのトランスポートで差し替え可能）。
//!
//! ## 整合性
//!
//! Registry は Room Store の参加者リストに対する厳密なキャッシュです。
//! bind / unbind は必ず Store の add_participant / remove_participant と
//! 同じイベント処理の中（同じルームロックの内側）で呼ばれる必要があります。
//! どちらか一方だけを更新すると、削除済み参加者への配信やその逆の取りこぼしが
//! 起こります。

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Participant, RoomId};

/// 接続に紐づくルームと参加者
#[derive(Debug, Clone)]
pub struct ConnectionBinding {
    pub room_id: RoomId,
    pub participant: Participant,
}

#[derive(Default)]
struct RegistryState {
    /// 接続 → (ルーム, 参加者)
    bindings: HashMap<ConnectionId, ConnectionBinding>,
    /// ルーム → 接続の集合（逆引きインデックス）
    room_connections: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RegistryState {
    fn detach(&mut self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let binding = self.bindings.remove(connection_id)?;
        if let Some(connections) = self.room_connections.get_mut(&binding.room_id) {
            connections.remove(connection_id);
            if connections.is_empty() {
                self.room_connections.remove(&binding.room_id);
            }
        }
        Some(binding)
    }
}

/// Connection Registry
///
/// 接続ハンドルは同時に高々1つのルーム・1人の参加者にしか結び付かない。
/// ルーム束縛が無ければ参加者束縛も無い（両方向の不変条件）。
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// 接続をルームと参加者に束縛する
    ///
    /// 既存の束縛がある場合（同じルームへの重複 join、別ルームへの join）は
    /// 置き換え、置き換えられた束縛を返す。
    pub async fn bind(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        participant: Participant,
    ) -> Option<ConnectionBinding> {
        let mut state = self.state.lock().await;
        let previous = state.detach(&connection_id);
        state.bindings.insert(
            connection_id,
            ConnectionBinding {
                room_id: room_id.clone(),
                participant,
            },
        );
        state
            .room_connections
            .entry(room_id)
            .or_default()
            .insert(connection_id);
        previous
    }

    /// 接続の束縛を解除し、解除された (ルーム, 参加者) を返す
    ///
    /// 束縛が無ければ None（冪等）。
    pub async fn unbind(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let mut state = self.state.lock().await;
        state.detach(connection_id)
    }

    /// 接続が束縛されているルームを返す
    pub async fn lookup_room(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let state = self.state.lock().await;
        state
            .bindings
            .get(connection_id)
            .map(|b| b.room_id.clone())
    }

    /// 接続に束縛されている参加者を返す
    pub async fn lookup_participant(&self, connection_id: &ConnectionId) -> Option<Participant> {
        let state = self.state.lock().await;
        state
            .bindings
            .get(connection_id)
            .map(|b| b.participant.clone())
    }

    /// 接続の束縛（ルームと参加者の組）を返す
    pub async fn lookup(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let state = self.state.lock().await;
        state.bindings.get(connection_id).cloned()
    }

    /// ルームに束縛されている接続のスナップショットを返す
    ///
    /// ブロードキャスト中のマップ変更でイテレーションが壊れないよう、
    /// 呼び出し時点のコピーを返す。
    pub async fn list_connections(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .room_connections
            .get(room_id)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    /// ルームの全束縛を解除し、解除された接続を返す（ルーム削除時）
    pub async fn unbind_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let mut state = self.state.lock().await;
        let connections: Vec<ConnectionId> = state
            .room_connections
            .remove(room_id)
            .map(|connections| connections.into_iter().collect())
            .unwrap_or_default();
        for connection_id in &connections {
            state.bindings.remove(connection_id);
        }
        connections
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
