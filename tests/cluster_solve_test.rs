// ==========================================
// 集群求解测试
// ==========================================
// 职责: 验证失败遏制、集群独立性与全量重算的可复现性
// ==========================================


#[cfg(test)]
mod cluster_solve_test {
    use crate::test_helpers::{canonical_plans, demand, RecordingStrategy};
    use mrp_solver::{
        Demand, MrpSolver, Operation, PlanModel, PlanningContext, SolveError, SolverConfig,
    };
    use std::sync::Arc;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 构建两集群测试模型 (集群 N 的工序名为 opN)
    fn two_cluster_model(demands: Vec<Demand>) -> Arc<PlanModel> {
        let mut model = PlanModel::new();
        model.add_operation(Operation::new("op0", 0));
        model.add_operation(Operation::new("op1", 1));
        for d in demands {
            model.add_demand(d);
        }
        Arc::new(model)
    }

    // ==========================================
    // 测试1: 单需求失败隔离
    // ==========================================

    #[test]
    fn test_per_demand_failure_isolation() {
        let model = two_cluster_model(vec![
            demand("a", 1, 3, 5.0, 0),
            demand("bad", 2, 4, 2.0, 0),
            demand("c", 3, 5, 7.0, 0),
        ]);
        let strategy = Arc::new(RecordingStrategy::new().fail_demand("bad"));

        let mut solver = MrpSolver::new(model.clone(), SolverConfig::default(), strategy.clone());
        solver.plan_all();

        // 坏需求之后的兄弟需求仍被尝试, 顺序确定
        let demand_events: Vec<String> = strategy
            .events()
            .into_iter()
            .filter(|e| e.starts_with("demand:"))
            .collect();
        assert_eq!(demand_events, vec!["demand:a", "demand:bad", "demand:c"]);

        // 坏需求不留任何半套变更 (替身在失败前故意追加了未提交命令)
        let plans = model.all_plans();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.demand.as_deref() != Some("bad")));
        assert_eq!(model.delivered("a"), 5.0);
        assert_eq!(model.delivered("bad"), 0.0);
        assert_eq!(model.delivered("c"), 7.0);
    }

    // ==========================================
    // 测试2: 集群级结构失败的悲观重置
    // ==========================================

    #[test]
    fn test_cluster_failure_containment() {
        mrp_solver::logging::init_test();
        let model = two_cluster_model(vec![
            demand("good-first", 1, 3, 5.0, 0),
            demand("boom", 2, 4, 2.0, 0),
            demand("other-cluster", 1, 3, 9.0, 1),
        ]);
        let strategy = Arc::new(RecordingStrategy::new().panic_demand("boom"));

        let mut solver = MrpSolver::new(model.clone(), SolverConfig::default(), strategy.clone());
        solver.plan_all();

        // 结构性失败逃出实体级遏制: 本集群即使已有成功提交也整群清空
        assert!(model.cluster_plans(0).is_empty());

        // 交付登记与计划一并作废, 不留无计划背书的已满足声明
        assert_eq!(model.delivered("good-first"), 0.0);
        assert_eq!(model.delivered("boom"), 0.0);

        // 其他集群不受影响
        let cluster1 = model.cluster_plans(1);
        assert_eq!(cluster1.len(), 1);
        assert_eq!(cluster1[0].demand.as_deref(), Some("other-cluster"));
        assert_eq!(model.delivered("other-cluster"), 9.0);
    }

    // ==========================================
    // 测试3: 集群独立性
    // ==========================================

    #[test]
    fn test_cluster_independence() {
        let model = two_cluster_model(vec![
            demand("c0-a", 1, 3, 5.0, 0),
            demand("c0-b", 2, 4, 2.0, 0),
            demand("c1-a", 1, 3, 9.0, 1),
        ]);
        let strategy = Arc::new(RecordingStrategy::new());

        let mut solver = MrpSolver::new(model.clone(), SolverConfig::default(), strategy);
        solver.plan_all();

        // 每个计划都归属其需求所在集群的工序, 无跨集群变更
        for plan in model.all_plans() {
            let demand_name = plan.demand.clone().unwrap();
            let demand_cluster = model.demand(&demand_name).unwrap().cluster;
            assert_eq!(model.operation_cluster(&plan.operation), Some(demand_cluster));
        }
        assert_eq!(model.cluster_plans(0).len(), 2);
        assert_eq!(model.cluster_plans(1).len(), 1);
    }

    // ==========================================
    // 测试4: 全量重算幂等
    // ==========================================

    #[test]
    fn test_full_replan_is_idempotent() {
        let model = two_cluster_model(vec![
            demand("a", 2, 5, 10.0, 0),
            demand("b", 1, 3, 7.0, 0),
            demand("c", 1, 3, 3.0, 1),
        ]);
        let strategy = Arc::new(RecordingStrategy::new());
        let mut solver = MrpSolver::new(model.clone(), SolverConfig::default(), strategy);

        solver.plan_all();
        let first = canonical_plans(&model.all_plans());
        solver.plan_all();
        let second = canonical_plans(&model.all_plans());

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    // ==========================================
    // 测试5: 串行模式下处理顺序可复现
    // ==========================================

    #[test]
    fn test_serialized_mode_is_deterministic() {
        let model = two_cluster_model(vec![
            demand("c1-x", 1, 4, 1.0, 1),
            demand("c0-y", 2, 3, 2.0, 0),
            demand("c0-z", 1, 3, 2.0, 0),
        ]);
        let strategy = Arc::new(RecordingStrategy::new());
        let mut config = SolverConfig::default();
        config.log_level = 1; // 过程日志开启 => 并行度强制为 1

        let mut solver = MrpSolver::new(model, config, strategy.clone());

        solver.plan_all();
        let first = strategy.events();
        strategy.clear_events();
        solver.plan_all();
        let second = strategy.events();

        assert_eq!(first, second);
        // 集群按编号顺序, 集群内按排序键顺序
        let demand_events: Vec<String> = first
            .into_iter()
            .filter(|e| e.starts_with("demand:"))
            .collect();
        assert_eq!(
            demand_events,
            vec!["demand:c0-z", "demand:c0-y", "demand:c1-x"]
        );
    }

    // ==========================================
    // 测试6: 前置条件快速失败
    // ==========================================

    #[test]
    fn test_missing_queue_or_strategy_fails_fast() {
        let model = two_cluster_model(vec![]);
        let config = Arc::new(SolverConfig::default());

        // 缺需求队列
        let mut ctx = PlanningContext::new(0, model.clone(), config.clone())
            .with_strategy(Arc::new(RecordingStrategy::new()));
        assert!(matches!(
            ctx.solve_cluster(),
            Err(SolveError::MissingState(_))
        ));

        // 缺求解策略
        let mut ctx = PlanningContext::new(0, model, config);
        ctx.set_demands(Vec::new());
        assert!(matches!(
            ctx.solve_cluster(),
            Err(SolveError::MissingState(_))
        ));
    }

    // ==========================================
    // 测试7: 关闭自动提交的全量重算仍产出完整计划
    // ==========================================

    #[test]
    fn test_plan_all_without_autocommit_still_completes() {
        let model = two_cluster_model(vec![
            demand("a", 1, 3, 5.0, 0),
            demand("b", 1, 3, 9.0, 1),
        ]);
        let strategy = Arc::new(RecordingStrategy::new());
        let mut config = SolverConfig::default();
        config.autocommit = false; // 并行度强制为 1, 集群收尾统一提交

        let mut solver = MrpSolver::new(model.clone(), config, strategy);
        solver.plan_all();

        assert_eq!(model.all_plans().len(), 2);
    }

    // ==========================================
    // 测试8: 非自动提交下同集群多需求全部存活
    // ==========================================

    #[test]
    fn test_non_autocommit_keeps_all_demands_in_one_cluster() {
        let model = two_cluster_model(vec![
            demand("a", 1, 3, 5.0, 0),
            demand("b", 2, 4, 2.0, 0),
            demand("c", 3, 5, 7.0, 0),
        ]);
        let strategy = Arc::new(RecordingStrategy::new());
        let mut config = SolverConfig::default();
        config.autocommit = false;

        let mut solver = MrpSolver::new(model.clone(), config, strategy);
        solver.plan_all();

        // 先求解的需求不得被后续单元的开场检查误回滚
        assert_eq!(model.all_plans().len(), 3);
        assert_eq!(model.delivered("a"), 5.0);
        assert_eq!(model.delivered("b"), 2.0);
        assert_eq!(model.delivered("c"), 7.0);
    }

    // ==========================================
    // 测试9: 非自动提交下失败需求只回滚自身单元
    // ==========================================

    #[test]
    fn test_non_autocommit_failure_spares_staged_siblings() {
        let model = two_cluster_model(vec![
            demand("a", 1, 3, 5.0, 0),
            demand("bad", 2, 4, 2.0, 0),
            demand("c", 3, 5, 7.0, 0),
        ]);
        let strategy = Arc::new(RecordingStrategy::new().fail_demand("bad"));
        let mut config = SolverConfig::default();
        config.autocommit = false;

        let mut solver = MrpSolver::new(model.clone(), config, strategy);
        solver.plan_all();

        // 坏需求的泄漏命令以其单元水位为界回滚, 不波及已累积的兄弟单元
        let plans = model.all_plans();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.demand.as_deref() != Some("bad")));
        assert_eq!(model.delivered("a"), 5.0);
        assert_eq!(model.delivered("bad"), 0.0);
        assert_eq!(model.delivered("c"), 7.0);
    }

    // ==========================================
    // 测试10: 迭代预算按需求遏制
    // ==========================================

    #[test]
    fn test_iteration_budget_contained_per_demand() {
        let model = two_cluster_model(vec![
            demand("a", 1, 3, 5.0, 0),
            demand("hog", 2, 4, 2.0, 0),
            demand("c", 3, 5, 7.0, 0),
        ]);
        let strategy = Arc::new(RecordingStrategy::new().exhaust_demand("hog"));
        let mut config = SolverConfig::default();
        config.iteration_max = 4;

        let mut solver = MrpSolver::new(model.clone(), config, strategy);
        solver.plan_all();

        // 超预算的需求以 Internal 失败收尾, 兄弟需求不受影响
        let plans = model.all_plans();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.demand.as_deref() != Some("hog")));
        assert_eq!(model.delivered("hog"), 0.0);
        assert_eq!(model.delivered("a"), 5.0);
        assert_eq!(model.delivered("c"), 7.0);
    }
}
