//! workmint-core
//!
//! Offline draft tracking for WorkMint task progress.
//!
//! 作業者が入力した進捗数量をローカルに保存し、オンラインのときに
//! バックグラウンドでサーバへ送ります。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, DraftRecord, 保存形式 DraftSnapshot, エラー）
//! - **ports**: 抽象化レイヤー（BlobStorage, Connectivity, RemotePush, Clock）
//! - **impls**: 実装（FileBlobStorage, InMemoryBlobStorage, ManualConnectivity, LoggingPush, ScriptedPush）
//! - **store**: DraftStore（ローカルドラフトの読み書き）
//! - **app**: 同期パスと SyncLoop（start/stop を持つサービス）
//! - **config**: TOML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod store;

pub use app::{SyncLoop, SyncLoopConfig, SyncReport, SyncStatus};
pub use config::WorkmintConfig;
pub use domain::{DraftRecord, StoreError, TaskId};
pub use store::DraftStore;
