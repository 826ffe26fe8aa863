// ==========================================
// 物料需求计划求解器 - 缓冲领域模型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 1. 数据模型 / 4.3 安全库存
// ==========================================
// 用途: 库存点, 可携带固定或日历化的最小库存目标
// ==========================================

use crate::domain::types::BufferKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MinimumCalendar - 时变最小库存日历
// ==========================================
// 桶按生效时间升序存放, value_at 取最后一个已生效桶
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinimumCalendar {
    pub buckets: Vec<(NaiveDateTime, f64)>,
}

impl MinimumCalendar {
    pub fn new(mut buckets: Vec<(NaiveDateTime, f64)>) -> Self {
        buckets.sort_by_key(|(from, _)| *from);
        Self { buckets }
    }

    /// 指定时刻生效的最小库存值
    ///
    /// # 返回
    /// - 0.0: 该时刻尚无任何桶生效
    pub fn value_at(&self, date: NaiveDateTime) -> f64 {
        self.buckets
            .iter()
            .take_while(|(from, _)| *from <= date)
            .last()
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }

    /// 日历中是否存在非零最小库存
    pub fn has_nonzero(&self) -> bool {
        self.buckets.iter().any(|(_, value)| *value != 0.0)
    }
}

// ==========================================
// Buffer - 缓冲
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buffer {
    // ===== 身份 =====
    pub name: String, // 缓冲唯一标识
    pub item: String, // 物料项

    // ===== 安全库存策略 =====
    pub kind: BufferKind,                          // 缓冲类型 (采购型强制参与补货)
    pub minimum: f64,                              // 固定最小库存 (0 = 未设置)
    pub minimum_calendar: Option<MinimumCalendar>, // 时变最小库存

    // ===== 图分析输出 (外部赋值, 求解期间稳定) =====
    pub cluster: usize, // 所属集群编号
    pub level: i32,     // 拓扑层级 (负值视为 0)
}

impl Buffer {
    pub fn new(name: impl Into<String>, item: impl Into<String>, cluster: usize) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
            kind: BufferKind::Default,
            minimum: 0.0,
            minimum_calendar: None,
            cluster,
            level: 0,
        }
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = minimum;
        self
    }

    pub fn with_kind(mut self, kind: BufferKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_minimum_calendar(mut self, calendar: MinimumCalendar) -> Self {
        self.minimum_calendar = Some(calendar);
        self
    }

    /// 是否参与安全库存补货遍历
    ///
    /// 条件: 固定最小库存非零, 或设有非零日历, 或为采购型缓冲
    pub fn has_safety_stock(&self) -> bool {
        self.minimum != 0.0
            || self
                .minimum_calendar
                .as_ref()
                .map(|c| c.has_nonzero())
                .unwrap_or(false)
            || self.kind == BufferKind::Procure
    }

    /// 安全库存遍历使用的层级桶下标 (负层级归入 0)
    pub fn level_bucket(&self) -> usize {
        if self.level >= 0 {
            self.level as usize
        } else {
            0
        }
    }
}
