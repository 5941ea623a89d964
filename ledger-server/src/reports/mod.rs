//! 报表模块
//!
//! 月结：冻结当月财务汇总并清理当月明细。库存报表由
//! [`StockDerivationEngine`](crate::inventory::StockDerivationEngine) 提供。

pub mod period_close;

pub use period_close::{close_month, monthly_reports};
