// ==========================================
// 物料需求计划求解器 - 需求领域模型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 1. 数据模型
// ==========================================
// 用途: 宿主应用创建, 求解核心只读并排序
// 红线: 求解期间身份不可变, 交付量只经命令日志写入
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Demand - 需求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    // ===== 身份 =====
    pub name: String,     // 需求唯一标识
    pub item: String,     // 物料项

    // ===== 需求量与交期 =====
    pub quantity: f64,          // 请求数量
    pub due: NaiveDateTime,     // 交货期
    pub priority: i32,          // 优先级 (数值越小越优先)

    // ===== 图分析输出 (外部赋值, 求解期间稳定) =====
    pub cluster: usize, // 所属集群编号
}

impl Demand {
    pub fn new(
        name: impl Into<String>,
        item: impl Into<String>,
        quantity: f64,
        due: NaiveDateTime,
        priority: i32,
        cluster: usize,
    ) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
            quantity,
            due,
            priority,
            cluster,
        }
    }
}
