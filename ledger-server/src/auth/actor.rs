//! 操作者上下文

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;

use crate::utils::validation::validate_id;
use crate::utils::{LedgerError, LedgerResult};

/// 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 总部管理员，可跨分店操作
    SuperAdmin,
    /// 分店管理员，只能操作本分店
    BranchAdmin,
}

/// 已认证的操作者
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    /// 显示名 (写入审计记录)
    pub name: String,
    pub role: Role,
    /// 所属分店 (总部管理员为 None)
    pub branch_id: Option<i64>,
}

impl Actor {
    pub fn new(id: i64, name: impl Into<String>, role: Role, branch_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            branch_id,
        }
    }

    pub fn super_admin(id: i64, name: impl Into<String>) -> Self {
        Self::new(id, name, Role::SuperAdmin, None)
    }

    pub fn branch_admin(id: i64, name: impl Into<String>, branch_id: i64) -> Self {
        Self::new(id, name, Role::BranchAdmin, Some(branch_id))
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// 解析本次操作的分店
    ///
    /// - 分店管理员固定为本分店，请求其他分店返回 Forbidden
    /// - 总部管理员必须显式指定分店
    pub fn resolve_branch(&self, requested: Option<i64>) -> LedgerResult<i64> {
        match self.role {
            Role::SuperAdmin => {
                let branch_id = requested.ok_or_else(|| {
                    LedgerError::Validation(
                        ErrorCode::BranchNotSelected,
                        "branch_id is required for cross-branch users".into(),
                    )
                })?;
                validate_id(branch_id, "branch_id")?;
                Ok(branch_id)
            }
            Role::BranchAdmin => {
                let own = self.branch_id.ok_or_else(|| {
                    LedgerError::forbidden(format!("User {} has no branch assigned", self.id))
                })?;
                match requested {
                    Some(other) if other != own => Err(LedgerError::forbidden(format!(
                        "User {} cannot act on branch {other}",
                        self.id
                    ))),
                    _ => Ok(own),
                }
            }
        }
    }

    /// 是否可以操作属于 `record_branch` 的记录
    ///
    /// 不属于任何分店的记录只有总部管理员可以操作。
    pub fn can_act_on(&self, record_branch: Option<i64>) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::BranchAdmin => self.branch_id.is_some() && self.branch_id == record_branch,
        }
    }

    pub fn ensure_can_act_on(&self, record_branch: Option<i64>) -> LedgerResult<()> {
        if self.can_act_on(record_branch) {
            Ok(())
        } else {
            Err(LedgerError::forbidden(format!(
                "User {} cannot act on records of branch {}",
                self.id,
                record_branch.map_or_else(|| "-".to_string(), |b| b.to_string())
            )))
        }
    }
}
