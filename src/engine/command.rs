// ==========================================
// 物料需求计划求解器 - 命令日志
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 3. 命令日志
// ==========================================
// 职责: 记录一个工作单元 (一个需求 / 一个安全库存缓冲) 的
//       全部计划变更, 原子提交或整体丢弃
// 红线: 未提交命令只存在于日志中, 模型永远看不到半套变更;
//       单个规划上下文同时只允许一个打开的工作单元
// ==========================================

use crate::domain::model::PlanModel;
use crate::domain::operation::OperationPlan;
use chrono::NaiveDateTime;
use uuid::Uuid;

// ==========================================
// PlanCommand - 计划变更命令
// ==========================================
#[derive(Debug, Clone)]
pub enum PlanCommand {
    /// 创建工序计划
    CreatePlan(OperationPlan),
    /// 删除工序计划 (既有或本单元内新建均可)
    DeletePlan(Uuid),
    /// 修改工序计划的数量与起止时间
    UpdatePlan {
        id: Uuid,
        quantity: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// 登记需求交付量
    RecordDelivery { demand: String, quantity: f64 },
}

// ==========================================
// CommandLog - 命令日志
// ==========================================
#[derive(Debug, Default)]
pub struct CommandLog {
    pending: Vec<PlanCommand>,
    committed_units: u64,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 命令追加 (外部求解逻辑调用)
    // ==========================================

    pub fn add(&mut self, command: PlanCommand) {
        self.pending.push(command);
    }

    /// 追加创建命令并返回计划标识
    pub fn create_plan(&mut self, plan: OperationPlan) -> Uuid {
        let id = plan.id;
        self.pending.push(PlanCommand::CreatePlan(plan));
        id
    }

    pub fn delete_plan(&mut self, id: Uuid) {
        self.pending.push(PlanCommand::DeletePlan(id));
    }

    pub fn update_plan(
        &mut self,
        id: Uuid,
        quantity: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) {
        self.pending.push(PlanCommand::UpdatePlan {
            id,
            quantity,
            start,
            end,
        });
    }

    pub fn record_delivery(&mut self, demand: impl Into<String>, quantity: f64) {
        self.pending.push(PlanCommand::RecordDelivery {
            demand: demand.into(),
            quantity,
        });
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn pending(&self) -> &[PlanCommand] {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 上一个工作单元是否已正常收尾 (无泄漏的未提交命令)
    pub fn is_clean(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn committed_units(&self) -> u64 {
        self.committed_units
    }

    /// 待提交命令涉及的缓冲 (去重, 保持首次出现顺序)
    ///
    /// 用途: 增量提交前的下游过量清扫
    pub fn touched_buffers(&self) -> Vec<String> {
        let mut buffers: Vec<String> = Vec::new();
        for command in &self.pending {
            if let PlanCommand::CreatePlan(plan) = command {
                if let Some(buffer) = &plan.buffer {
                    if !buffers.iter().any(|b| b == buffer) {
                        buffers.push(buffer.clone());
                    }
                }
            }
        }
        buffers
    }

    /// 本单元内已追加但尚未提交的新建计划
    pub fn pending_plans(&self) -> impl Iterator<Item = &OperationPlan> {
        self.pending.iter().filter_map(|c| match c {
            PlanCommand::CreatePlan(plan) => Some(plan),
            _ => None,
        })
    }

    // ==========================================
    // 提交 / 回滚
    // ==========================================

    /// 将全部待提交命令在单个写锁临界区内应用到共享存储并清空日志
    ///
    /// 并发读者要么看到提交前的存储, 要么看到提交后的存储,
    /// 永远看不到半套变更
    pub fn commit(&mut self, model: &PlanModel) {
        let mut batch = model.batch();
        for command in self.pending.drain(..) {
            match command {
                PlanCommand::CreatePlan(plan) => batch.insert_plan(plan),
                PlanCommand::DeletePlan(id) => batch.remove_plan(id),
                PlanCommand::UpdatePlan {
                    id,
                    quantity,
                    start,
                    end,
                } => batch.update_plan(id, quantity, start, end),
                PlanCommand::RecordDelivery { demand, quantity } => {
                    batch.record_delivery(&demand, quantity)
                }
            }
        }
        self.committed_units += 1;
    }

    /// 丢弃本单元全部未提交命令
    pub fn rollback(&mut self) {
        self.pending.clear();
    }

    /// 当前日志水位 (工作单元边界标记)
    ///
    /// 非自动提交模式下日志可累积多个已成功单元的命令,
    /// 回滚必须以水位为界, 不得波及此前的单元
    pub fn mark(&self) -> usize {
        self.pending.len()
    }

    /// 丢弃指定水位之后追加的命令, 水位之前的保持不动
    pub fn rollback_to(&mut self, mark: usize) {
        self.pending.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::demand::Demand;
    use crate::domain::operation::Operation;
    use chrono::NaiveDate;

    fn dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn model_with_op() -> PlanModel {
        let mut model = PlanModel::new();
        model.add_operation(Operation::new("op", 0));
        model.add_demand(Demand::new("d", "item", 5.0, dt(), 1, 0));
        model
    }

    #[test]
    fn test_rollback_leaves_store_untouched() {
        let model = model_with_op();
        let mut log = CommandLog::new();
        log.create_plan(OperationPlan::new("op", 5.0, dt(), dt()));
        log.record_delivery("d", 5.0);
        assert_eq!(log.pending_len(), 2);

        log.rollback();

        assert!(log.is_clean());
        assert_eq!(model.plan_count(), 0);
        assert_eq!(model.delivered("d"), 0.0);
    }

    #[test]
    fn test_commit_applies_all_commands() {
        let model = model_with_op();
        let mut log = CommandLog::new();
        let id = log.create_plan(OperationPlan::new("op", 5.0, dt(), dt()));
        log.update_plan(id, 3.0, dt(), dt());
        log.record_delivery("d", 3.0);

        // 提交前模型不可见任何变更
        assert_eq!(model.plan_count(), 0);

        log.commit(&model);

        assert!(log.is_clean());
        assert_eq!(log.committed_units(), 1);
        assert_eq!(model.plan_count(), 1);
        assert_eq!(model.all_plans()[0].quantity, 3.0);
        assert_eq!(model.delivered("d"), 3.0);
    }

    #[test]
    fn test_create_then_delete_in_same_unit_nets_out() {
        let model = model_with_op();
        let mut log = CommandLog::new();
        let id = log.create_plan(OperationPlan::new("op", 5.0, dt(), dt()));
        log.delete_plan(id);
        log.commit(&model);
        assert_eq!(model.plan_count(), 0);
    }

    #[test]
    fn test_rollback_to_mark_spares_earlier_commands() {
        let mut log = CommandLog::new();
        log.create_plan(OperationPlan::new("op", 1.0, dt(), dt()));
        let mark = log.mark();
        log.create_plan(OperationPlan::new("op", 2.0, dt(), dt()));
        log.record_delivery("d", 2.0);

        log.rollback_to(mark);

        assert_eq!(log.pending_len(), 1);
        assert!(matches!(
            log.pending()[0],
            PlanCommand::CreatePlan(ref p) if p.quantity == 1.0
        ));
    }

    #[test]
    fn test_commit_is_atomic_to_concurrent_readers() {
        let model = std::sync::Arc::new(model_with_op());
        let mut log = CommandLog::new();
        for _ in 0..50 {
            log.create_plan(OperationPlan::new("op", 1.0, dt(), dt()));
        }

        // 读者只会看到提交前 (0) 或提交后 (50) 的存储, 没有中间态
        let reader = {
            let model = model.clone();
            std::thread::spawn(move || loop {
                let n = model.plan_count();
                if n > 0 {
                    return n;
                }
                std::thread::yield_now();
            })
        };

        log.commit(&model);

        assert_eq!(reader.join().unwrap(), 50);
    }

    #[test]
    fn test_touched_buffers_dedup_keeps_order() {
        let mut log = CommandLog::new();
        log.create_plan(OperationPlan::new("op", 1.0, dt(), dt()).for_buffer("b2"));
        log.create_plan(OperationPlan::new("op", 1.0, dt(), dt()).for_buffer("b1"));
        log.create_plan(OperationPlan::new("op", 1.0, dt(), dt()).for_buffer("b2"));
        assert_eq!(log.touched_buffers(), vec!["b2".to_string(), "b1".to_string()]);
    }
}
