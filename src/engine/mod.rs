// ==========================================
// 物料需求计划求解器 - 引擎层
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4. 组件设计
// ==========================================
// 职责: 求解编排、事务纪律与失败遏制;
//       单实体内部的约束传播由外部策略实现
// ==========================================

pub mod command;
pub mod context;
pub mod error;
pub mod ordering;
pub mod orchestrator;
pub mod safety_stock;
pub mod strategy;
pub mod worker_pool;

// 重导出核心类型
pub use command::{CommandLog, PlanCommand};
pub use context::{Motive, PlanningContext, SolveState};
pub use error::{SolveError, SolveErrorKind, SolveResult};
pub use ordering::{demand_comparison, sort_demands};
pub use orchestrator::MrpSolver;
pub use strategy::{NoOpStrategy, SolveStrategy};
pub use worker_pool::{PoolTask, WorkerPool};
