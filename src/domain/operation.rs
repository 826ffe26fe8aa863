// ==========================================
// 物料需求计划求解器 - 工序领域模型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 1. 数据模型
// ==========================================
// 用途: Operation 为静态工序定义; OperationPlan 为其排定实例,
//       是求解器创建/删除的唯一可变产物
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Operation - 工序
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,          // 工序唯一标识
    pub cluster: usize,        // 所属集群编号 (外部赋值)
    pub setup: Option<String>, // 本工序要求的换型状态 (参与换型矩阵后处理)
}

impl Operation {
    pub fn new(name: impl Into<String>, cluster: usize) -> Self {
        Self {
            name: name.into(),
            cluster,
            setup: None,
        }
    }

    pub fn with_setup(mut self, setup: impl Into<String>) -> Self {
        self.setup = Some(setup.into());
        self
    }
}

// ==========================================
// OperationPlan - 工序计划
// ==========================================
// 命令日志跟踪其创建/删除/修改, 以便单元失败时撤销
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationPlan {
    // ===== 身份 =====
    pub id: Uuid,          // 计划实例标识
    pub operation: String, // 所属工序名

    // ===== 排定内容 =====
    pub quantity: f64,           // 计划数量
    pub start: NaiveDateTime,    // 开始时间
    pub end: NaiveDateTime,      // 结束时间

    // ===== 归因 =====
    pub demand: Option<String>,   // 触发需求 (安全库存补货为 None)
    pub buffer: Option<String>,   // 补货目标缓冲
    pub resource: Option<String>, // 占用资源

    // ===== 换型 (后处理阶段回写) =====
    pub setup: Option<String>, // 实际换型状态
}

impl OperationPlan {
    pub fn new(
        operation: impl Into<String>,
        quantity: f64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation: operation.into(),
            quantity,
            start,
            end,
            demand: None,
            buffer: None,
            resource: None,
            setup: None,
        }
    }

    pub fn for_demand(mut self, demand: impl Into<String>) -> Self {
        self.demand = Some(demand.into());
        self
    }

    pub fn for_buffer(mut self, buffer: impl Into<String>) -> Self {
        self.buffer = Some(buffer.into());
        self
    }

    pub fn on_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}
