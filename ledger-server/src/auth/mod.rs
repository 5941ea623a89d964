//! 身份与分店范围
//!
//! 认证由外部完成，核心只接收已认证的 [`Actor`] 并据此解析分店范围。

mod actor;

pub use actor::{Actor, Role};
