//! ルーム単位の排他ロック
//!
//! マルチスレッドの tokio ランタイム上では、1つのイベントに対する
//! {Store の変更, Registry の更新, ブロードキャスト} の一連の処理を
//! ルームごとに直列化する必要があります。このモジュールはルーム ID を
//! キーにした非同期ロックのテーブルを提供します。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

/// ルーム ID をキーにした非同期ロックのテーブル
pub struct RoomKeyLocks {
    locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomKeyLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// ルームのロックを獲得する
    ///
    /// ガードを drop するまで同じルームに対する他のイベント処理はブロックする。
    /// テーブル自体のロックはエントリ取得の間だけ保持し、ルームロックの
    /// 獲得待ちでテーブル全体が詰まらないようにする。
    pub async fn acquire(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// ルームのロックエントリを破棄する（ルーム削除時）
    ///
    /// 獲得中のガードは Arc が生かすため安全に drop できる。削除後に同じ
    /// ルーム ID で acquire されても、ルーム自体が Store から消えているので
    /// 後続処理は not-found で終わる。
    pub async fn remove(&self, room_id: &RoomId) {
        let mut locks = self.locks.lock().await;
        locks.remove(room_id);
    }
}

impl Default for RoomKeyLocks {
    fn default() -> Self {
        Self::new()
    }
}
