// ==========================================
// 物料需求计划求解器 - 集群编排器
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4.4 Cluster Orchestrator / 4.5 增量求解
// ==========================================
// 职责: 按集群切分问题, 驱动每集群一个规划上下文,
//       控制并行度, 并提供单需求增量求解与显式提交/回滚
// ==========================================

use crate::config::solver_config::SolverConfig;
use crate::domain::demand::Demand;
use crate::domain::model::PlanModel;
use crate::engine::context::{Motive, PlanningContext};
use crate::engine::error::{SolveError, SolveResult};
use crate::engine::strategy::{NoOpStrategy, SolveStrategy};
use crate::engine::worker_pool::{PoolTask, WorkerPool};
use std::sync::Arc;
use tracing::{error, info};

// ==========================================
// MrpSolver - 集群编排器
// ==========================================
pub struct MrpSolver {
    model: Arc<PlanModel>,
    config: SolverConfig,
    strategy: Arc<dyn SolveStrategy>,
    cleanup: Arc<dyn SolveStrategy>,
    session: Option<PlanningContext>,
}

impl MrpSolver {
    /// # 参数
    /// - model: 共享计划模型
    /// - config: 求解参数
    /// - strategy: 需求驱动求解策略 (外部协作方)
    pub fn new(model: Arc<PlanModel>, config: SolverConfig, strategy: Arc<dyn SolveStrategy>) -> Self {
        Self {
            model,
            config,
            strategy,
            cleanup: Arc::new(NoOpStrategy),
            session: None,
        }
    }

    /// 设置过量清扫策略 (面向删除的求解器, 外部协作方)
    pub fn with_cleanup(mut self, cleanup: Arc<dyn SolveStrategy>) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }

    pub fn model(&self) -> &Arc<PlanModel> {
        &self.model
    }

    // ==========================================
    // 全量重算
    // ==========================================

    /// 全量重算: 删除既有计划, 按集群并行求解, 最后重算换型
    ///
    /// 单个坏需求或坏集群不会令整体中止 (失败在各自边界内遏制),
    /// 本调用总是正常返回
    pub fn plan_all(&mut self) {
        let cluster_count = self.model.number_of_clusters() + 1;

        // 1. 需求按集群入桶, 越界集群编号落入末位溢出桶 (单趟, 串行)
        let mut buckets: Vec<Vec<Arc<Demand>>> =
            (0..cluster_count).map(|_| Vec::new()).collect();
        for demand in self.model.demands() {
            let index = demand.cluster.min(cluster_count - 1);
            buckets[index].push(demand.clone());
        }

        // 2. 删除既有工序计划 (全量重算前置, 单趟串行比逐集群扫描便宜)
        if self.config.verbose() {
            info!("删除既有计划");
        }
        self.model.delete_all_plans();
        self.model.clear_deliveries();

        // 3. 并行度: 过程日志开启或关闭自动提交时串行,
        //    以换取可复现的日志与副作用顺序; 否则一核一工
        let max_parallel = if self.config.verbose() || !self.config.autocommit {
            1
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        };
        let pool = WorkerPool::new(max_parallel);

        // 4. 每集群一个规划上下文与任务
        let config = Arc::new(self.config.clone());
        let tasks: Vec<PoolTask> = buckets
            .into_iter()
            .enumerate()
            .map(|(cluster, demands)| {
                let mut ctx = PlanningContext::new(cluster, self.model.clone(), config.clone())
                    .with_strategy(self.strategy.clone())
                    .with_cleanup(self.cleanup.clone());
                ctx.set_demands(demands);
                Box::new(move || {
                    if let Err(e) = ctx.solve_cluster() {
                        error!(cluster, error = %e, "集群任务前置条件失败");
                    }
                }) as PoolTask
            })
            .collect();

        // 5. 运行并阻塞到全部集群完成
        pool.execute(tasks);

        // 6. 后处理: 设有换型矩阵的资源重算实际换型序列 (串行, 在并行窗口之外)
        self.update_setups();
    }

    /// 对设有换型矩阵的资源重算已落实计划的换型序列
    fn update_setups(&self) {
        for resource in self.model.resources() {
            let Some(matrix) = &resource.setup_matrix else {
                continue;
            };
            let mut plans = self.model.resource_plans(&resource.name);
            // 与计划标识无关的全序, 两次重算结果一致
            plans.sort_by(|a, b| {
                (a.start, a.end, a.operation.as_str())
                    .cmp(&(b.start, b.end, b.operation.as_str()))
            });

            let mut current = String::new();
            for plan in plans {
                let Some(target) = self
                    .model
                    .operation(&plan.operation)
                    .and_then(|op| op.setup.clone())
                else {
                    continue;
                };
                let realized = matrix.lookup(&current, &target).map(str::to_string);
                self.model.set_plan_setup(plan.id, realized);
                current = target;
            }
        }
    }

    // ==========================================
    // 增量单需求求解
    // ==========================================

    /// 增量求解单个需求, 不丢弃其余计划
    ///
    /// 切换为非自动提交模式, 变更停留在会话命令日志中,
    /// 由调用方检视后显式 commit() 或 rollback()
    ///
    /// # 错误
    /// - MalformedInput: 需求名未注册, 不做任何变更
    /// - 实体求解失败原样传播, 未提交命令保留待调用方回滚
    pub fn solve_demand(&mut self, name: &str) -> SolveResult<()> {
        let demand = self.model.demand(name).ok_or_else(|| {
            SolveError::MalformedInput(format!("solve 参数必须是已注册的需求: {}", name))
        })?;

        self.config.autocommit = false;

        let mut ctx = self.session.take().unwrap_or_else(|| {
            PlanningContext::new(demand.cluster, self.model.clone(), Arc::new(self.config.clone()))
                .with_strategy(self.strategy.clone())
                .with_cleanup(self.cleanup.clone())
        });

        ctx.iteration_count = 0;
        ctx.state.reset();
        ctx.state.cur_demand = Some(demand.name.clone());
        ctx.state.motive = Some(Motive::Demand(demand.name.clone()));

        let strategy = self.strategy.clone();
        let result = strategy.solve_demand(&demand, &mut ctx);
        self.session = Some(ctx);
        result
    }

    /// 提交会话命令日志
    ///
    /// 先对受影响缓冲做下游过量清扫, 再一次性落实全部变更
    pub fn commit(&mut self) -> SolveResult<()> {
        let Some(mut ctx) = self.session.take() else {
            return Ok(());
        };

        let cleanup = self.cleanup.clone();
        for name in ctx.commands.touched_buffers() {
            if let Some(buffer) = self.model.buffer(&name) {
                if let Err(e) = cleanup.solve_buffer(&buffer, &mut ctx) {
                    self.session = Some(ctx);
                    return Err(e);
                }
            }
        }

        ctx.commands.commit(&self.model);
        self.session = Some(ctx);
        Ok(())
    }

    /// 丢弃会话命令日志中全部未提交变更
    pub fn rollback(&mut self) {
        if let Some(ctx) = &mut self.session {
            ctx.commands.rollback();
        }
    }

    /// 会话中待提交的命令数 (调用方检视用)
    pub fn pending_commands(&self) -> usize {
        self.session
            .as_ref()
            .map(|ctx| ctx.commands.pending_len())
            .unwrap_or(0)
    }
}
