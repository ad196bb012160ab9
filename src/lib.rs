//! TraceLens CLI
//!
//! 画像を解析サービス (`POST /api/v1/analyze`) に送り、
//! 返ってきたレポートをタブごとに端末へ表示・JSONで保存する。

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod transport;
