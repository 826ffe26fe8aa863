// ==========================================
// 物料需求计划求解器 - 计划模型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 1. 数据模型 / 5. 并发模型
// ==========================================
// 职责: 实体注册表 + 共享工序计划存储
// 红线: 集群编号/层级由外部图分析赋值, 模型只读取
// 并发: 并行求解阶段各集群只触碰本集群的计划,
//       存储用读写锁保护, 临界区仅限提交瞬间
// ==========================================

use crate::domain::buffer::Buffer;
use crate::domain::demand::Demand;
use crate::domain::operation::{Operation, OperationPlan};
use crate::domain::resource::Resource;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use uuid::Uuid;

// ==========================================
// PlanStore - 工序计划存储
// ==========================================
#[derive(Debug, Default)]
pub struct PlanStore {
    plans: RwLock<HashMap<Uuid, OperationPlan>>,
    delivered: RwLock<HashMap<String, f64>>,
}

// ==========================================
// PlanModel - 计划模型
// ==========================================
#[derive(Debug, Default)]
pub struct PlanModel {
    demands: Vec<Arc<Demand>>,
    buffers: Vec<Arc<Buffer>>,
    operations: Vec<Arc<Operation>>,
    resources: Vec<Arc<Resource>>,
    operation_clusters: HashMap<String, usize>,
    store: PlanStore,
}

impl PlanModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================
    // 实体注册 (构建阶段, 求解前完成)
    // ==========================================

    pub fn add_demand(&mut self, demand: Demand) -> Arc<Demand> {
        let demand = Arc::new(demand);
        self.demands.push(demand.clone());
        demand
    }

    pub fn add_buffer(&mut self, buffer: Buffer) -> Arc<Buffer> {
        let buffer = Arc::new(buffer);
        self.buffers.push(buffer.clone());
        buffer
    }

    pub fn add_operation(&mut self, operation: Operation) -> Arc<Operation> {
        let operation = Arc::new(operation);
        self.operation_clusters
            .insert(operation.name.clone(), operation.cluster);
        self.operations.push(operation.clone());
        operation
    }

    pub fn add_resource(&mut self, resource: Resource) -> Arc<Resource> {
        let resource = Arc::new(resource);
        self.resources.push(resource.clone());
        resource
    }

    // ==========================================
    // 实体访问
    // ==========================================

    pub fn demands(&self) -> &[Arc<Demand>] {
        &self.demands
    }

    pub fn buffers(&self) -> &[Arc<Buffer>] {
        &self.buffers
    }

    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    pub fn demand(&self, name: &str) -> Option<Arc<Demand>> {
        self.demands.iter().find(|d| d.name == name).cloned()
    }

    pub fn buffer(&self, name: &str) -> Option<Arc<Buffer>> {
        self.buffers.iter().find(|b| b.name == name).cloned()
    }

    /// 工序所属集群 (未注册的工序返回 None)
    pub fn operation_cluster(&self, operation: &str) -> Option<usize> {
        self.operation_clusters.get(operation).copied()
    }

    pub fn operation(&self, name: &str) -> Option<Arc<Operation>> {
        self.operations.iter().find(|o| o.name == name).cloned()
    }

    // ==========================================
    // 集群/层级服务 (外部图分析的只读视图)
    // ==========================================

    /// 集群数量 (最大集群编号 + 1)
    pub fn number_of_clusters(&self) -> usize {
        self.demands
            .iter()
            .map(|d| d.cluster)
            .chain(self.buffers.iter().map(|b| b.cluster))
            .chain(self.operations.iter().map(|o| o.cluster))
            .chain(self.resources.iter().map(|r| r.cluster))
            .max()
            .map(|max| max + 1)
            .unwrap_or(0)
    }

    /// 层级数量 (最大非负层级 + 1)
    pub fn number_of_levels(&self) -> usize {
        self.buffers
            .iter()
            .map(|b| b.level_bucket())
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }

    // ==========================================
    // 工序计划存储操作
    // ==========================================

    pub fn insert_plan(&self, plan: OperationPlan) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        plans.insert(plan.id, plan);
    }

    pub fn remove_plan(&self, id: Uuid) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        plans.remove(&id);
    }

    pub fn update_plan(
        &self,
        id: Uuid,
        quantity: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        if let Some(plan) = plans.get_mut(&id) {
            plan.quantity = quantity;
            plan.start = start;
            plan.end = end;
        }
    }

    pub fn set_plan_setup(&self, id: Uuid, setup: Option<String>) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        if let Some(plan) = plans.get_mut(&id) {
            plan.setup = setup;
        }
    }

    pub fn plan_count(&self) -> usize {
        self.store.plans.read().expect("计划存储锁中毒").len()
    }

    pub fn all_plans(&self) -> Vec<OperationPlan> {
        self.store
            .plans
            .read()
            .expect("计划存储锁中毒")
            .values()
            .cloned()
            .collect()
    }

    /// 指定集群的全部工序计划 (按工序归属判定)
    pub fn cluster_plans(&self, cluster: usize) -> Vec<OperationPlan> {
        self.store
            .plans
            .read()
            .expect("计划存储锁中毒")
            .values()
            .filter(|p| self.operation_cluster(&p.operation) == Some(cluster))
            .cloned()
            .collect()
    }

    /// 指定资源上的全部工序计划
    pub fn resource_plans(&self, resource: &str) -> Vec<OperationPlan> {
        self.store
            .plans
            .read()
            .expect("计划存储锁中毒")
            .values()
            .filter(|p| p.resource.as_deref() == Some(resource))
            .cloned()
            .collect()
    }

    // ==========================================
    // 批量删除 (全量重算前置 / 集群灾难恢复)
    // ==========================================

    /// 删除模型中全部工序计划 (全量重算的前置步骤)
    pub fn delete_all_plans(&self) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        plans.clear();
    }

    /// 删除指定集群全部工序计划 (集群级失败的悲观回退)
    pub fn delete_cluster_plans(&self, cluster: usize) {
        let mut plans = self.store.plans.write().expect("计划存储锁中毒");
        plans.retain(|_, p| self.operation_clusters.get(&p.operation) != Some(&cluster));
    }

    /// 删除指定集群全部需求的交付登记
    ///
    /// 与 delete_cluster_plans 配套使用: 集群计划整体作废后,
    /// 其需求的交付量不得继续声称已满足
    pub fn delete_cluster_deliveries(&self, cluster: usize) {
        let mut delivered = self.store.delivered.write().expect("交付登记锁中毒");
        for demand in &self.demands {
            if demand.cluster == cluster {
                delivered.remove(&demand.name);
            }
        }
    }

    // ==========================================
    // 批量应用 (命令日志提交专用)
    // ==========================================

    /// 打开一个批量写入窗口, 整批变更在同一临界区内落实
    ///
    /// 锁序固定为先计划后交付; 其余方法每次只持单把锁, 不会反序
    pub fn batch(&self) -> PlanBatch<'_> {
        PlanBatch {
            plans: self.store.plans.write().expect("计划存储锁中毒"),
            delivered: self.store.delivered.write().expect("交付登记锁中毒"),
        }
    }

    // ==========================================
    // 交付量登记 (外部求解逻辑经命令日志写入)
    // ==========================================

    pub fn record_delivery(&self, demand: &str, quantity: f64) {
        let mut delivered = self.store.delivered.write().expect("交付登记锁中毒");
        *delivered.entry(demand.to_string()).or_insert(0.0) += quantity;
    }

    pub fn delivered(&self, demand: &str) -> f64 {
        self.store
            .delivered
            .read()
            .expect("交付登记锁中毒")
            .get(demand)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn clear_deliveries(&self) {
        let mut delivered = self.store.delivered.write().expect("交付登记锁中毒");
        delivered.clear();
    }
}

// ==========================================
// PlanBatch - 批量写入窗口
// ==========================================
// 窗口存活期间持有计划与交付两把写锁,
// 并发读者要么看到整批变更之前, 要么看到之后
pub struct PlanBatch<'a> {
    plans: RwLockWriteGuard<'a, HashMap<Uuid, OperationPlan>>,
    delivered: RwLockWriteGuard<'a, HashMap<String, f64>>,
}

impl PlanBatch<'_> {
    pub fn insert_plan(&mut self, plan: OperationPlan) {
        self.plans.insert(plan.id, plan);
    }

    pub fn remove_plan(&mut self, id: Uuid) {
        self.plans.remove(&id);
    }

    pub fn update_plan(&mut self, id: Uuid, quantity: f64, start: NaiveDateTime, end: NaiveDateTime) {
        if let Some(plan) = self.plans.get_mut(&id) {
            plan.quantity = quantity;
            plan.start = start;
            plan.end = end;
        }
    }

    pub fn record_delivery(&mut self, demand: &str, quantity: f64) {
        *self.delivered.entry(demand.to_string()).or_insert(0.0) += quantity;
    }
}
