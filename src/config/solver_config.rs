// ==========================================
// 物料需求计划求解器 - 求解参数配置
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 6. 配置面
// ==========================================
// 职责: 求解核心消费的纯值配置, 加载机制由宿主负责
// ==========================================

use crate::domain::types::{Constraints, PlanType};
use serde::{Deserialize, Serialize};

// ==========================================
// SolverConfig - 求解器配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    // ===== 迭代控制 =====
    pub iteration_threshold: f64, // 迭代努力阈值: 低于该量的短缺不再细分
    pub iteration_accuracy: f64,  // 迭代精度阈值 (百分比)
    pub iteration_max: u32,       // 单实体最大迭代次数 (0 = 不限)

    // ===== 延迟与约束 =====
    pub lazy_delay_minutes: i64,     // 懒惰延迟 (分钟): 失败后重试的时间步进
    pub constraints: Constraints,    // 启用的约束类别位掩码
    pub plan_type: PlanType,         // 约束计划 / 无约束计划

    // ===== 执行模式 =====
    pub autocommit: bool,             // 单元工作自动提交
    pub plan_safety_stock_first: bool, // 安全库存先于需求求解
    pub rotate_resources: bool,       // 替代资源轮转

    // ===== 日志 =====
    pub log_level: u8, // 0 = 静默, >0 输出求解过程日志
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iteration_threshold: 1.0,
            iteration_accuracy: 0.01,
            iteration_max: 0,
            lazy_delay_minutes: 24 * 60,
            constraints: Constraints::ALL,
            plan_type: PlanType::Constrained,
            autocommit: true,
            plan_safety_stock_first: false,
            rotate_resources: true,
            log_level: 0,
        }
    }
}

impl SolverConfig {
    /// 是否输出求解过程日志
    pub fn verbose(&self) -> bool {
        self.log_level > 0
    }

    /// 懒惰延迟的时间表示
    pub fn lazy_delay(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lazy_delay_minutes)
    }

    /// 约束计划标志 (求解循环前重算)
    pub fn constrained_planning(&self) -> bool {
        self.plan_type == PlanType::Constrained
    }
}
