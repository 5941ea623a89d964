//! 核心模块 - 配置与服务状态
//!
//! - [`Config`] - 环境变量配置
//! - [`LedgerState`] - 服务组装

pub mod config;
pub mod state;

pub use config::Config;
pub use state::LedgerState;
