// ==========================================
// 物料需求计划求解器 - 领域类型定义
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 0. 基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计划类型 (Plan Type)
// ==========================================
// 约束计划尊重全部已启用约束; 无约束计划只做需求展开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Constrained,
    Unconstrained,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Constrained => write!(f, "CONSTRAINED"),
            PlanType::Unconstrained => write!(f, "UNCONSTRAINED"),
        }
    }
}

impl Default for PlanType {
    fn default() -> Self {
        PlanType::Constrained
    }
}

// ==========================================
// 约束位掩码 (Constraints)
// ==========================================
// 控制哪些约束类别参与求解, 默认全部启用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints(pub u8);

impl Constraints {
    pub const LEAD_TIME: Constraints = Constraints(1);
    pub const MATERIAL: Constraints = Constraints(2);
    pub const CAPACITY: Constraints = Constraints(4);
    pub const FENCE: Constraints = Constraints(8);
    pub const ALL: Constraints = Constraints(15);
    pub const NONE: Constraints = Constraints(0);

    /// 是否启用了指定约束类别
    pub fn contains(&self, other: Constraints) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints::ALL
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "NONE");
        }
        let mut first = true;
        for (bit, name) in [
            (Constraints::LEAD_TIME, "LEAD_TIME"),
            (Constraints::MATERIAL, "MATERIAL"),
            (Constraints::CAPACITY, "CAPACITY"),
            (Constraints::FENCE, "FENCE"),
        ] {
            if self.contains(bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// ==========================================
// 缓冲类型 (Buffer Kind)
// ==========================================
// 采购型缓冲无论是否设有最小库存, 都参与安全库存补货
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BufferKind {
    Default,
    Procure,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Default => write!(f, "DEFAULT"),
            BufferKind::Procure => write!(f, "PROCURE"),
        }
    }
}

// ==========================================
// 求解模式 (Solve Mode)
// ==========================================
// 外部求解逻辑依据此模式区分需求驱动与安全库存补货两条路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveMode {
    DemandDriven,
    SafetyStock,
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMode::DemandDriven => write!(f, "DEMAND_DRIVEN"),
            SolveMode::SafetyStock => write!(f, "SAFETY_STOCK"),
        }
    }
}

// ==========================================
// 安全库存哨兵值
// ==========================================

/// 请求数量为 -1 时表示"补货到安全库存目标", 不是真实需求量
pub const SAFETY_STOCK_QTY: f64 = -1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_default_is_all() {
        let c = Constraints::default();
        assert!(c.contains(Constraints::LEAD_TIME));
        assert!(c.contains(Constraints::MATERIAL));
        assert!(c.contains(Constraints::CAPACITY));
        assert!(c.contains(Constraints::FENCE));
    }

    #[test]
    fn test_constraints_display() {
        assert_eq!(Constraints::NONE.to_string(), "NONE");
        assert_eq!(
            Constraints(Constraints::LEAD_TIME.0 | Constraints::CAPACITY.0).to_string(),
            "LEAD_TIME|CAPACITY"
        );
        assert_eq!(
            Constraints::ALL.to_string(),
            "LEAD_TIME|MATERIAL|CAPACITY|FENCE"
        );
    }
}
