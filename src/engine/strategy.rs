// ==========================================
// 物料需求计划求解器 - 求解策略接口
// ==========================================
// 职责: 定义实体求解 trait, 实现依赖倒置
// 说明: 核心只负责"解哪些实体、按什么顺序、在什么事务纪律下",
//       单实体内部的约束传播 (批量、提前期、产能检查) 由外部实现
// 约定: 实现者失败返回 Err 前必须已回滚本单元的未提交变更
// ==========================================

use crate::domain::buffer::Buffer;
use crate::domain::demand::Demand;
use crate::engine::context::PlanningContext;
use crate::engine::error::{SolveError, SolveResult};

// ==========================================
// 求解策略 Trait
// ==========================================

/// 实体求解能力
///
/// 递归求解过程中可读写 `PlanningContext` 的草稿字段,
/// 并向其命令日志追加计划变更; 提交/回滚由核心统一控制
pub trait SolveStrategy: Send + Sync {
    /// 求解单个需求 (需求驱动路径)
    fn solve_demand(&self, demand: &Demand, ctx: &mut PlanningContext) -> SolveResult<()> {
        let _ = ctx;
        Err(SolveError::Internal(format!(
            "策略未实现需求求解: {}",
            demand.name
        )))
    }

    /// 求解单个缓冲 (安全库存路径, 或清扫路径)
    fn solve_buffer(&self, buffer: &Buffer, ctx: &mut PlanningContext) -> SolveResult<()> {
        let _ = ctx;
        Err(SolveError::Internal(format!(
            "策略未实现缓冲求解: {}",
            buffer.name
        )))
    }
}

// ==========================================
// 空操作策略
// ==========================================

/// 不产生任何计划变更的策略 (占位/测试用)
pub struct NoOpStrategy;

impl SolveStrategy for NoOpStrategy {
    fn solve_demand(&self, _demand: &Demand, _ctx: &mut PlanningContext) -> SolveResult<()> {
        Ok(())
    }

    fn solve_buffer(&self, _buffer: &Buffer, _ctx: &mut PlanningContext) -> SolveResult<()> {
        Ok(())
    }
}
