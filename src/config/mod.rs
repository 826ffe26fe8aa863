// ==========================================
// 物料需求计划求解器 - 配置层
// ==========================================

pub mod solver_config;

pub use solver_config::SolverConfig;
