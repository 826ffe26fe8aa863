// ==========================================
// 物料需求计划求解器 - 求解错误类型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 7. 错误处理
// 工具: thiserror 派生宏
// ==========================================
// 红线: 错误类别在抛出点分类, 封闭枚举, 不做类型反射
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// SolveErrorKind - 错误类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveErrorKind {
    MissingState,   // 前置条件缺失 (队列/求解器引用)
    MalformedInput, // 外部输入非法
    Capacity,       // 产能约束失败
    Material,       // 物料约束失败
    Data,           // 数据质量问题
    Internal,       // 内部逻辑错误
    Unknown,        // 未分类
}

impl fmt::Display for SolveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveErrorKind::MissingState => write!(f, "MISSING_STATE"),
            SolveErrorKind::MalformedInput => write!(f, "MALFORMED_INPUT"),
            SolveErrorKind::Capacity => write!(f, "CAPACITY"),
            SolveErrorKind::Material => write!(f, "MATERIAL"),
            SolveErrorKind::Data => write!(f, "DATA"),
            SolveErrorKind::Internal => write!(f, "INTERNAL"),
            SolveErrorKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ==========================================
// SolveError - 求解错误
// ==========================================
#[derive(Error, Debug)]
pub enum SolveError {
    // ===== 前置条件/输入错误 (传播给调用方) =====
    #[error("求解状态缺失: {0}")]
    MissingState(String),

    #[error("输入非法: {0}")]
    MalformedInput(String),

    // ===== 实体求解失败 (在最小单元内遏制) =====
    #[error("产能约束失败: {0}")]
    Capacity(String),

    #[error("物料约束失败: {0}")]
    Material(String),

    #[error("数据质量问题: {0}")]
    Data(String),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SolveError {
    /// 错误类别 (日志诊断用)
    pub fn kind(&self) -> SolveErrorKind {
        match self {
            SolveError::MissingState(_) => SolveErrorKind::MissingState,
            SolveError::MalformedInput(_) => SolveErrorKind::MalformedInput,
            SolveError::Capacity(_) => SolveErrorKind::Capacity,
            SolveError::Material(_) => SolveErrorKind::Material,
            SolveError::Data(_) => SolveErrorKind::Data,
            SolveError::Internal(_) => SolveErrorKind::Internal,
            SolveError::Other(_) => SolveErrorKind::Unknown,
        }
    }
}

/// Result 类型别名
pub type SolveResult<T> = Result<T, SolveError>;
