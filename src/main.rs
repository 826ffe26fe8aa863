// ==========================================
// 物料需求计划求解器 - 演示入口
// ==========================================
// 用途: 构建一个两集群玩具模型, 用按单补货策略跑一次全量重算
// ==========================================

use chrono::{Duration, NaiveDate};
use mrp_solver::{
    Buffer, BufferKind, Demand, MrpSolver, Operation, OperationPlan, PlanModel, PlanningContext,
    SolveResult, SolveStrategy, SolverConfig, SAFETY_STOCK_QTY,
};
use std::sync::Arc;
use tracing::info;

// ==========================================
// LotForLot - 按单补货演示策略
// ==========================================
// 每个需求生成一个等量工序计划, 安全库存哨兵按最小库存补货
struct LotForLot;

impl SolveStrategy for LotForLot {
    fn solve_demand(&self, demand: &Demand, ctx: &mut PlanningContext) -> SolveResult<()> {
        ctx.record_iteration()?;
        let start = demand.due - Duration::days(1);
        let plan = OperationPlan::new(format!("make_{}", demand.item), demand.quantity, start, demand.due)
            .for_demand(&demand.name);
        ctx.commands.create_plan(plan);
        ctx.commands.record_delivery(&demand.name, demand.quantity);
        Ok(())
    }

    fn solve_buffer(&self, buffer: &Buffer, ctx: &mut PlanningContext) -> SolveResult<()> {
        ctx.record_iteration()?;
        if ctx.state.requested_qty != SAFETY_STOCK_QTY || buffer.minimum <= 0.0 {
            return Ok(());
        }
        let today = NaiveDate::from_ymd_opt(2026, 9, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let plan = OperationPlan::new(
            format!("make_{}", buffer.item),
            buffer.minimum,
            today,
            today + Duration::days(1),
        )
        .for_buffer(&buffer.name);
        ctx.commands.create_plan(plan);
        Ok(())
    }
}

fn main() {
    // 初始化日志系统
    mrp_solver::logging::init();

    info!("==================================================");
    info!("{}", mrp_solver::APP_NAME);
    info!("系统版本: {}", mrp_solver::VERSION);
    info!("==================================================");

    let _ = mrp_solver::initialize();

    // 构建玩具模型: 两个独立集群
    let mut model = PlanModel::new();
    let due = NaiveDate::from_ymd_opt(2026, 9, 10)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    model.add_operation(Operation::new("make_widget", 0));
    model.add_operation(Operation::new("make_gadget", 1));
    model.add_demand(Demand::new("d-widget-a", "widget", 10.0, due, 1, 0));
    model.add_demand(Demand::new("d-widget-b", "widget", 5.0, due + Duration::days(2), 2, 0));
    model.add_demand(Demand::new("d-gadget", "gadget", 7.0, due, 1, 1));
    model.add_buffer(
        Buffer::new("buf-widget", "widget", 0)
            .with_minimum(3.0)
            .with_kind(BufferKind::Procure),
    );

    let mut config = SolverConfig::default();
    config.plan_safety_stock_first = true;
    config.log_level = 1;

    let mut solver = MrpSolver::new(Arc::new(model), config, Arc::new(LotForLot));
    solver.plan_all();

    let mut plans = solver.model().all_plans();
    plans.sort_by(|a, b| (a.start, a.operation.clone()).cmp(&(b.start, b.operation.clone())));
    info!(plan_count = plans.len(), "全量重算完成");
    for plan in &plans {
        info!(
            operation = %plan.operation,
            quantity = plan.quantity,
            start = %plan.start,
            end = %plan.end,
            demand = plan.demand.as_deref().unwrap_or("-"),
            buffer = plan.buffer.as_deref().unwrap_or("-"),
            "工序计划"
        );
    }

    // 计划结果以 JSON 输出, 便于下游工具消费
    match serde_json::to_string_pretty(&plans) {
        Ok(report) => println!("{}", report),
        Err(e) => info!(error = %e, "计划结果序列化失败"),
    }
}
