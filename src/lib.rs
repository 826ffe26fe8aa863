// ==========================================
// 物料需求计划求解器 - 核心库
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md
// 系统定位: 集群化的 MRP 规划核心 (编排 + 事务 + 并发纪律)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与共享计划存储
pub mod domain;

// 配置层 - 求解参数
pub mod config;

// 引擎层 - 编排、事务、失败遏制
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BufferKind, Constraints, PlanType, SolveMode, SAFETY_STOCK_QTY};

// 领域实体
pub use domain::{
    Buffer, Demand, MinimumCalendar, Operation, OperationPlan, PlanModel, Resource, SetupMatrix,
};

// 配置
pub use config::SolverConfig;

// 引擎
pub use engine::{
    CommandLog, MrpSolver, NoOpStrategy, PlanCommand, PlanningContext, SolveError, SolveErrorKind,
    SolveResult, SolveState, SolveStrategy, WorkerPool,
};

// ==========================================
// 进程级一次性初始化
// ==========================================

use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// 初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    Initialized,
    AlreadyInitialized,
}

/// 进程生命周期内由宿主应用调用一次
///
/// 重复调用返回显式状态而非静默告警
pub fn initialize() -> InitStatus {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return InitStatus::AlreadyInitialized;
    }
    InitStatus::Initialized
}

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料需求计划求解器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_initialize_reports_repeat_calls() {
        // 两次调用中至多一次返回 Initialized
        let first = initialize();
        let second = initialize();
        assert_eq!(second, InitStatus::AlreadyInitialized);
        let _ = first;
    }
}
