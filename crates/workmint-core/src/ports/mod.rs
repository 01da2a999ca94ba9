//! Ports - 抽象化レイヤー
//!
//! ブラウザ由来の外部要素をすべて trait で切り出します。
//!
//! # 対応関係
//! - localStorage → `BlobStorage`
//! - `navigator.onLine` と `online` イベント → `Connectivity`
//! - サーバへの進捗送信（スタブ） → `RemotePush`
//! - `Date.now()` → `Clock`

pub mod blob_storage;
pub mod clock;
pub mod connectivity;
pub mod remote_push;

pub use self::blob_storage::BlobStorage;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::connectivity::Connectivity;
pub use self::remote_push::RemotePush;
