//! Connectivity port - オンライン状態の抽象化
//!
//! `navigator.onLine` と `online` イベントに相当します。
//! `is_online()` は呼んだ瞬間の値で、使う時点では古くなっている可能性があります。
//!
//! オンライン復帰はフラグではなくカウンタで通知します。受信側が別の処理中に
//! offline → online が起きても、カウンタが増えているので取りこぼしません。

use tokio::sync::watch;

pub trait Connectivity: Send + Sync {
    /// Point-in-time connectivity flag.
    fn is_online(&self) -> bool;

    /// Receiver of the number of times connectivity was regained. Every
    /// `false -> true` transition increments it by one.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
