// ==========================================
// 物料需求计划求解器 - 需求排序
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4.1 Demand Ordering
// ==========================================
// 职责: 集群内需求的确定性全序
// 排序键: 1) 优先级升序 2) 交期升序 3) 数量升序
// 红线: 必须稳定排序, 相同键保持输入顺序, 保证跨平台可复现;
//       不允许随机化或基于哈希的次序
// ==========================================

use crate::domain::demand::Demand;
use std::cmp::Ordering;
use std::sync::Arc;

/// 比较两个需求的求解先后
///
/// # 返回
/// Ordering::Less 表示 a 先于 b 求解
pub fn demand_comparison(a: &Demand, b: &Demand) -> Ordering {
    // 1. 优先级升序 (数值小者优先)
    match a.priority.cmp(&b.priority) {
        Ordering::Equal => {}
        other => return other,
    }

    // 2. 交期升序 (早交期优先)
    match a.due.cmp(&b.due) {
        Ordering::Equal => {}
        other => return other,
    }

    // 3. 数量升序 (量小者优先)
    a.quantity.partial_cmp(&b.quantity).unwrap_or(Ordering::Equal)
}

/// 对需求队列施加排序 (sort_by 为稳定排序)
pub fn sort_demands(demands: &mut [Arc<Demand>]) {
    demands.sort_by(|a, b| demand_comparison(a, b));
}
