// ==========================================
// 物料需求计划求解器 - 安全库存补货遍历
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4.3 Safety-Stock Pass
// ==========================================
// 职责: 独立于需求拉动, 为设有最小库存策略 (或采购型) 的缓冲补货
// 顺序: 按拓扑层级升序逐桶处理, 保证上游先于下游;
//       层内按缓冲名称排序, 保证跨平台确定性
// 事务: 每个缓冲一个工作单元, 成功提交, 失败回滚后继续下一个
// ==========================================

use crate::domain::buffer::Buffer;
use crate::domain::types::{BufferKind, SAFETY_STOCK_QTY};
use crate::engine::context::{Motive, PlanningContext};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{error, info};

impl PlanningContext {
    /// 对本集群执行一次安全库存补货遍历
    ///
    /// 整个遍历期间 safety_stock_planning 标志为 true,
    /// 嵌套求解调用据此区分补货路径与需求驱动路径;
    /// 遍历结束 (任何路径) 后标志复位为 false
    pub fn solve_safety_stock(&mut self) {
        self.safety_stock_planning = true;

        let model = self.model().clone();
        let verbose = self.config().verbose();
        if verbose {
            info!(
                cluster = self.cluster(),
                constraints = %self.config().constraints,
                "开始安全库存补货遍历"
            );
        }

        // 1. 收集本集群参与补货的缓冲, 按层级分桶 (负层级归入 0)
        let mut buckets: Vec<Vec<Arc<Buffer>>> =
            (0..model.number_of_levels() + 1).map(|_| Vec::new()).collect();
        for buffer in model.buffers() {
            if buffer.cluster == self.cluster() && buffer.has_safety_stock() {
                buckets[buffer.level_bucket()].push(buffer.clone());
            }
        }
        for bucket in &mut buckets {
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let strategy = match self.strategy() {
            Ok(s) => s,
            Err(e) => {
                error!(cluster = self.cluster(), error = %e, "补货遍历缺少求解策略, 跳过");
                self.safety_stock_planning = false;
                return;
            }
        };
        let cleanup = self.cleanup_strategy();

        // 2. 层级升序逐缓冲求解, 每个缓冲独立提交/回滚
        for bucket in buckets {
            for buffer in bucket {
                self.state.reset();
                // 数量 -1 是缓冲求解器的安全库存哨兵
                self.state.requested_qty = SAFETY_STOCK_QTY;
                self.state.requested_date = NaiveDateTime::MIN;
                self.state.motive = Some(Motive::Buffer(buffer.name.clone()));
                self.iteration_count = 0;

                let mark = self.commands.mark();
                let result = strategy.solve_buffer(&buffer, self).and_then(|_| {
                    // 非采购型缓冲补货后立即做过量清扫
                    if buffer.kind != BufferKind::Procure {
                        cleanup.solve_buffer(&buffer, self)
                    } else {
                        Ok(())
                    }
                });

                match result {
                    Ok(()) => self.commands.commit(&model),
                    Err(e) => {
                        error!(
                            cluster = self.cluster(),
                            buffer = %buffer.name,
                            kind = %e.kind(),
                            error = %e,
                            "缓冲补货失败, 回滚该缓冲单元并继续"
                        );
                        // 回滚以本缓冲水位为界, 不波及此前累积的命令
                        self.commands.rollback_to(mark);
                    }
                }
            }
        }

        if verbose {
            info!(cluster = self.cluster(), "安全库存补货遍历结束");
        }
        self.safety_stock_planning = false;
    }
}
