//! App - アプリケーション層
//!
//! ports と DraftStore を組み合わせて同期処理を実装します。
//!
//! # 主要コンポーネント
//! - **sync_pass**: 1 回の同期パス（未同期ドラフトを順に送信）
//! - **SyncLoop**: タイマーとオンライン復帰でパスを起動するサービス（start/stop）
//! - **SyncStatus**: 直近パスの結果

pub mod status;
pub mod sync_loop;
pub mod sync_pass;

pub use self::status::{FailedPush, SkipReason, SyncReport, SyncStatus};
pub use self::sync_loop::{SyncLoop, SyncLoopConfig, Trigger};
pub use self::sync_pass::sync_pass;
