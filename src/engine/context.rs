// ==========================================
// 物料需求计划求解器 - 规划上下文
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4.2 需求驱动求解
// ==========================================
// 职责: 单个集群的求解状态 + 需求驱动主循环
// 生命周期: 随集群任务创建, 任务结束即销毁, 不跨集群共享
// 失败遏制: 实体级失败 (策略返回 Err) 在单个需求内遏制;
//           结构性失败 (panic) 在集群边界遏制并悲观重置整个集群
// ==========================================

use crate::config::solver_config::SolverConfig;
use crate::domain::demand::Demand;
use crate::domain::model::PlanModel;
use crate::domain::types::SolveMode;
use crate::engine::command::CommandLog;
use crate::engine::error::{SolveError, SolveResult};
use crate::engine::ordering::sort_demands;
use crate::engine::strategy::{NoOpStrategy, SolveStrategy};
use chrono::NaiveDateTime;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

// ==========================================
// Motive - 当前求解动因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Motive {
    Demand(String),
    Buffer(String),
    Resource(String),
}

// ==========================================
// SolveState - 递归求解草稿字段
// ==========================================
// 深层嵌套的求解调用通过上下文显式传递读写这些字段,
// 不使用任何全局状态
#[derive(Debug, Clone)]
pub struct SolveState {
    pub requested_qty: f64,              // 请求数量 (-1 为安全库存哨兵)
    pub requested_date: NaiveDateTime,   // 请求日期
    pub accepted_cost: f64,              // 已接受成本
    pub accepted_penalty: f64,           // 已接受惩罚
    pub cur_demand: Option<String>,      // 当前需求
    pub motive: Option<Motive>,          // 当前动因实体
    pub cur_owner_plan: Option<Uuid>,    // 当前归属工序计划
}

impl Default for SolveState {
    fn default() -> Self {
        Self {
            requested_qty: 0.0,
            requested_date: NaiveDateTime::MIN,
            accepted_cost: 0.0,
            accepted_penalty: 0.0,
            cur_demand: None,
            motive: None,
            cur_owner_plan: None,
        }
    }
}

impl SolveState {
    /// 清空草稿字段 (每个工作单元开始时调用)
    pub fn reset(&mut self) {
        *self = SolveState::default();
    }
}

// ==========================================
// PlanningContext - 规划上下文
// ==========================================
pub struct PlanningContext {
    cluster: usize,
    model: Arc<PlanModel>,
    config: Arc<SolverConfig>,
    strategy: Option<Arc<dyn SolveStrategy>>,
    cleanup: Arc<dyn SolveStrategy>,
    demands: Option<Vec<Arc<Demand>>>,

    // ===== 事务与草稿状态 =====
    pub commands: CommandLog,
    pub state: SolveState,
    pub iteration_count: u32,
    pub constrained_planning: bool,
    pub safety_stock_planning: bool,
}

impl PlanningContext {
    pub fn new(cluster: usize, model: Arc<PlanModel>, config: Arc<SolverConfig>) -> Self {
        let constrained = config.constrained_planning();
        Self {
            cluster,
            model,
            config,
            strategy: None,
            cleanup: Arc::new(NoOpStrategy),
            demands: None,
            commands: CommandLog::new(),
            state: SolveState::default(),
            iteration_count: 0,
            constrained_planning: constrained,
            safety_stock_planning: false,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn SolveStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_cleanup(mut self, cleanup: Arc<dyn SolveStrategy>) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// 装入本集群的需求队列 (一次性, 处理期间只出不进)
    pub fn set_demands(&mut self, demands: Vec<Arc<Demand>>) {
        self.demands = Some(demands);
    }

    // ==========================================
    // 访问器
    // ==========================================

    pub fn cluster(&self) -> usize {
        self.cluster
    }

    pub fn model(&self) -> &Arc<PlanModel> {
        &self.model
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// 当前求解路径 (外部策略据此区分需求驱动与安全库存补货)
    pub fn mode(&self) -> SolveMode {
        if self.safety_stock_planning {
            SolveMode::SafetyStock
        } else {
            SolveMode::DemandDriven
        }
    }

    pub(crate) fn cleanup_strategy(&self) -> Arc<dyn SolveStrategy> {
        self.cleanup.clone()
    }

    pub(crate) fn strategy(&self) -> SolveResult<Arc<dyn SolveStrategy>> {
        self.strategy
            .clone()
            .ok_or_else(|| SolveError::MissingState("缺少求解策略引用".to_string()))
    }

    /// 登记一次迭代, 超出单实体迭代预算时报错
    ///
    /// 迭代计数只约束单个实体的求解努力, 每个需求/缓冲开始时归零
    pub fn record_iteration(&mut self) -> SolveResult<()> {
        self.iteration_count += 1;
        let max = self.config.iteration_max;
        if max > 0 && self.iteration_count > max {
            return Err(SolveError::Internal(format!(
                "迭代次数超限: {} > {}",
                self.iteration_count, max
            )));
        }
        Ok(())
    }

    // ==========================================
    // 集群求解主循环
    // ==========================================

    /// 求解本集群的全部需求与安全库存
    ///
    /// # 前置条件
    /// 已装入需求队列且已设置求解策略, 否则返回 MissingState
    ///
    /// # 失败遏制
    /// - 单个需求求解失败: 记日志并回滚该单元, 继续下一个需求
    /// - 结构性失败 (panic 逃出实体级遏制): 记日志, 删除本集群
    ///   全部工序计划并清空队列, 不向调用方传播
    pub fn solve_cluster(&mut self) -> SolveResult<()> {
        // 前置检查: 缺队列或缺策略快速失败, 不做任何求解
        if self.demands.is_none() {
            return Err(SolveError::MissingState(format!(
                "集群 {} 缺少需求队列",
                self.cluster
            )));
        }
        let strategy = self.strategy()?;

        if self.config.verbose() {
            info!(cluster = self.cluster, "开始求解集群");
        }

        let body = catch_unwind(AssertUnwindSafe(|| {
            self.solve_cluster_body(strategy.clone())
        }));

        if let Err(payload) = body {
            // 只有超出单个需求/缓冲遏制范围的结构性问题才会走到这里;
            // 单实体的失败已在上面的循环内各自回滚
            error!(
                cluster = self.cluster,
                message = %panic_message(payload.as_ref()),
                "求解集群时捕获结构性失败, 放弃整个集群的计划"
            );

            // 悲观恢复: 宁可整群重置, 不留可能不一致的半套计划;
            // 交付登记与计划一并作废, 不得声称已满足而无计划背书
            self.commands.rollback();
            self.model.delete_cluster_plans(self.cluster);
            self.model.delete_cluster_deliveries(self.cluster);
            self.demands = Some(Vec::new());
            self.safety_stock_planning = false;
        }

        if self.config.verbose() {
            info!(cluster = self.cluster, "集群求解结束");
        }
        Ok(())
    }

    fn solve_cluster_body(&mut self, strategy: Arc<dyn SolveStrategy>) {
        // 排序本集群需求, 稳定排序保证跨平台可复现
        let mut queue = self.demands.take().unwrap_or_default();
        sort_demands(&mut queue);

        // 配置为"安全库存优先"时先跑补货遍历
        if self.config.plan_safety_stock_first {
            self.constrained_planning = self.config.constrained_planning();
            self.solve_safety_stock();
        }

        // 逐个求解需求
        self.safety_stock_planning = false;
        self.constrained_planning = self.config.constrained_planning();
        for demand in &queue {
            self.iteration_count = 0;
            self.state.reset();
            self.state.cur_demand = Some(demand.name.clone());
            self.state.motive = Some(Motive::Demand(demand.name.clone()));

            // 自动提交模式下上一单元收尾后日志必为空, 非空即泄漏;
            // 非自动提交模式下日志合法地累积已成功单元的命令
            if self.config.autocommit && !self.commands.is_clean() {
                warn!(
                    cluster = self.cluster,
                    leaked = self.commands.pending_len(),
                    "检测到上一单元泄漏的未提交命令, 已强制回滚"
                );
                self.commands.rollback();
            }

            let mark = self.commands.mark();
            match strategy.solve_demand(demand, self) {
                Ok(()) => {
                    if self.config.autocommit {
                        self.commands.commit(&self.model);
                    }
                }
                Err(e) => {
                    // 单个坏需求不许中止整个集群;
                    // 回滚以本单元水位为界, 此前已成功单元的命令保持不动
                    error!(
                        cluster = self.cluster,
                        demand = %demand.name,
                        kind = %e.kind(),
                        error = %e,
                        "求解需求时捕获失败, 继续下一个需求"
                    );
                    self.commands.rollback_to(mark);
                }
            }
        }

        // 清空需求队列: 无论成败, 所有需求都已消费
        self.demands = Some(Vec::new());

        // 未配置"安全库存优先"时在需求之后跑补货遍历
        if !self.config.plan_safety_stock_first {
            self.solve_safety_stock();
        }

        // 非自动提交模式下, 集群收尾统一提交一次,
        // 保证全量重算总能产出计划
        if !self.config.autocommit && !self.commands.is_clean() {
            self.commands.commit(&self.model);
        }
    }
}

/// 提取 panic 载荷中的可读消息 (载荷类别在此归一)
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知类型的崩溃载荷".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_max(iteration_max: u32) -> PlanningContext {
        let mut config = SolverConfig::default();
        config.iteration_max = iteration_max;
        PlanningContext::new(0, Arc::new(PlanModel::new()), Arc::new(config))
    }

    #[test]
    fn test_record_iteration_enforces_budget() {
        let mut ctx = ctx_with_max(2);
        assert!(ctx.record_iteration().is_ok());
        assert!(ctx.record_iteration().is_ok());
        assert!(matches!(
            ctx.record_iteration(),
            Err(SolveError::Internal(_))
        ));
    }

    #[test]
    fn test_record_iteration_zero_means_unbounded() {
        let mut ctx = ctx_with_max(0);
        for _ in 0..10_000 {
            assert!(ctx.record_iteration().is_ok());
        }
    }

    #[test]
    fn test_mode_follows_safety_stock_flag() {
        let mut ctx = ctx_with_max(0);
        assert_eq!(ctx.mode(), SolveMode::DemandDriven);
        ctx.safety_stock_planning = true;
        assert_eq!(ctx.mode(), SolveMode::SafetyStock);
    }
}
