//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **FileBlobStorage**: ディレクトリ上のファイルで localStorage を模す（本番用）
//! - **InMemoryBlobStorage**: テスト用。容量制限で QuotaExceeded を再現できる
//! - **ManualConnectivity**: watch チャネルでオンライン状態を切り替える
//! - **LoggingPush**: リモート送信のスタブ（ログを出して成功を返す）
//! - **ScriptedPush**: 失敗させる task_id を指定できる送信（開発用・テスト用）

pub mod file_storage;
pub mod inmem_storage;
pub mod logging_push;
pub mod manual_connectivity;
pub mod scripted_push;

pub use self::file_storage::FileBlobStorage;
pub use self::inmem_storage::InMemoryBlobStorage;
pub use self::logging_push::LoggingPush;
pub use self::manual_connectivity::ManualConnectivity;
pub use self::scripted_push::ScriptedPush;
