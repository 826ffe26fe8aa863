// ==========================================
// 增量单需求求解测试
// ==========================================
// 职责: 验证非自动提交会话、显式提交/回滚与输入校验
// ==========================================


#[cfg(test)]
mod incremental_test {
    use crate::test_helpers::{demand, dt, CleanupRecorder, RecordingStrategy};
    use mrp_solver::{
        Buffer, MrpSolver, Operation, OperationPlan, PlanModel, SolveError, SolverConfig,
    };
    use std::sync::Arc;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn incremental_solver() -> (Arc<PlanModel>, Arc<CleanupRecorder>, MrpSolver) {
        let mut model = PlanModel::new();
        model.add_operation(Operation::new("op0", 0));
        model.add_demand(demand("d", 1, 3, 5.0, 0));
        model.add_buffer(Buffer::new("buf-0", "item", 0));
        let model = Arc::new(model);

        let cleanup = Arc::new(CleanupRecorder::new());
        let solver = MrpSolver::new(
            model.clone(),
            SolverConfig::default(),
            Arc::new(RecordingStrategy::new()),
        )
        .with_cleanup(cleanup.clone());
        (model, cleanup, solver)
    }

    // ==========================================
    // 测试1: 非需求参数立即拒绝
    // ==========================================

    #[test]
    fn test_unknown_demand_rejected_without_mutation() {
        let (model, _cleanup, mut solver) = incremental_solver();
        let result = solver.solve_demand("no-such-demand");
        assert!(matches!(result, Err(SolveError::MalformedInput(_))));
        assert_eq!(model.plan_count(), 0);
        assert_eq!(solver.pending_commands(), 0);
    }

    // ==========================================
    // 测试2: 变更停留在会话日志, 提交前不可见
    // ==========================================

    #[test]
    fn test_mutations_pending_until_commit() {
        let (model, cleanup, mut solver) = incremental_solver();

        solver.solve_demand("d").unwrap();

        // 切换到非自动提交模式, 变更待检视
        assert!(!solver.config().autocommit);
        assert!(solver.pending_commands() > 0);
        assert_eq!(model.plan_count(), 0);

        solver.commit().unwrap();

        // 提交先清扫受影响缓冲, 再落实变更
        assert_eq!(cleanup.events(), vec!["cleanup:buf-0"]);
        assert_eq!(solver.pending_commands(), 0);
        assert_eq!(model.plan_count(), 1);
        assert_eq!(model.delivered("d"), 5.0);
    }

    // ==========================================
    // 测试3: 回滚丢弃全部未提交变更
    // ==========================================

    #[test]
    fn test_rollback_discards_session_log() {
        let (model, _cleanup, mut solver) = incremental_solver();

        solver.solve_demand("d").unwrap();
        assert!(solver.pending_commands() > 0);

        solver.rollback();

        assert_eq!(solver.pending_commands(), 0);
        assert_eq!(model.plan_count(), 0);
    }

    // ==========================================
    // 测试4: 增量求解不丢弃既有计划
    // ==========================================

    #[test]
    fn test_incremental_solve_keeps_existing_plans() {
        let (model, _cleanup, mut solver) = incremental_solver();

        // 既有计划 (来自先前的全量重算)
        model.insert_plan(OperationPlan::new("op0", 9.0, dt(1), dt(2)));
        assert_eq!(model.plan_count(), 1);

        solver.solve_demand("d").unwrap();
        solver.commit().unwrap();

        assert_eq!(model.plan_count(), 2);
    }

    // ==========================================
    // 测试5: 空会话提交/回滚是无操作
    // ==========================================

    #[test]
    fn test_commit_and_rollback_on_empty_session() {
        let (_model, _cleanup, mut solver) = incremental_solver();
        solver.commit().unwrap();
        solver.rollback();
        assert_eq!(solver.pending_commands(), 0);
    }
}
