//! UseCase: 非アクティブルームの回収処理（Idle Reaper）
//!
//! 固定間隔で実行され、最終アクティビティが閾値より古いルームを
//! DestroyRoomUseCase と同じ削除経路で破棄します。1つのルームの失敗は
//! ログに残すだけで、残りのルームの回収は継続します。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use utakata_shared::time::Clock;

use crate::domain::{RoomRepository, Timestamp};

use super::destroy_room::DestroyRoomUseCase;

/// 非アクティブルーム回収のユースケース
pub struct ReapIdleRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// 破棄経路の1本化のため、明示的な破棄と同じユースケースを使う
    destroy_room_usecase: Arc<DestroyRoomUseCase>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
    /// 非アクティブと判定する閾値（分）
    idle_threshold_minutes: i64,
}

impl ReapIdleRoomsUseCase {
    /// 新しい ReapIdleRoomsUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        destroy_room_usecase: Arc<DestroyRoomUseCase>,
        clock: Arc<dyn Clock>,
        idle_threshold_minutes: i64,
    ) -> Self {
        Self {
            repository,
            destroy_room_usecase,
            clock,
            idle_threshold_minutes,
        }
    }

    /// 1回分のスイープを実行
    ///
    /// # Returns
    ///
    /// 回収されたルームの数
    pub async fn execute(&self) -> usize {
        let now = Timestamp::new(self.clock.now_jst_millis());
        let idle_rooms = self
            .repository
            .list_inactive_rooms(now, self.idle_threshold_minutes)
            .await;

        if idle_rooms.is_empty() {
            tracing::debug!("Idle sweep found no rooms to reap");
            return 0;
        }

        let mut reaped = 0;
        for room_id in idle_rooms {
            match self.destroy_room_usecase.execute(&room_id).await {
                Ok(()) => {
                    tracing::info!("Reaped idle room '{}'", room_id);
                    reaped += 1;
                }
                Err(e) => {
                    // スイープは残りのルームに対して継続する
                    tracing::error!("Failed to reap idle room '{}': {}", room_id, e);
                }
            }
        }

        tracing::info!("Idle sweep reaped {} room(s)", reaped);
        reaped
    }
}

/// Idle Reaper を固定間隔で起動する
///
/// 返ってきた JoinHandle はサーバーのシャットダウン時に abort される。
pub fn spawn_idle_reaper(
    usecase: Arc<ReapIdleRoomsUseCase>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            usecase.execute().await;
        }
    })
}
