// ==========================================
// 物料需求计划求解器 - 领域层
// ==========================================
// 职责: 实体定义与共享计划存储, 不含求解规则
// ==========================================

pub mod buffer;
pub mod demand;
pub mod model;
pub mod operation;
pub mod resource;
pub mod types;

pub use buffer::{Buffer, MinimumCalendar};
pub use demand::Demand;
pub use model::{PlanBatch, PlanModel};
pub use operation::{Operation, OperationPlan};
pub use resource::{Resource, SetupMatrix, SetupRule};
pub use types::{BufferKind, Constraints, PlanType, SolveMode, SAFETY_STOCK_QTY};
