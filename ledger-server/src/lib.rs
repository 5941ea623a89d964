//! Branch Ledger - 分店库存账本与通用撤销
//!
//! # 架构概述
//!
//! - **审计日志** (`audit`): 可撤销操作的追加式日志、撤销注册表与调度
//! - **库存** (`inventory`): 变动记录器与库存派生引擎
//! - **财务** (`finance`): 支出、收银流水 (审计尽力写入)
//! - **报表** (`reports`): 月结
//! - **数据库** (`db`): 嵌入式 SQLite (sqlx)
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态
//! ├── auth/          # 操作者与分店范围
//! ├── audit/         # 审计日志、撤销
//! ├── inventory/     # 记录器、派生引擎
//! ├── finance/       # 支出、收银流水
//! ├── reports/       # 月结
//! ├── utils/         # 错误、日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod finance;
pub mod inventory;
pub mod reports;
pub mod utils;

// Re-export 公共类型
pub use audit::{AuditJournal, UndoDispatcher, UndoOutcome, UndoRegistry};
pub use auth::{Actor, Role};
pub use core::{Config, LedgerState};
pub use db::DbService;
pub use inventory::{MovementRecorder, StockDerivationEngine};
pub use utils::{LedgerError, LedgerResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, AppError, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
