// ==========================================
// 物料需求计划求解器 - 有界工作线程池
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 5. 并发模型
// ==========================================
// 职责: 以受控并行度执行一批独立任务并等待全部完成
// 说明: 并行度 1 不是特殊代码路径, 只是配置值;
//       任务自身保证不向池外抛出 panic (集群边界已遏制)
// ==========================================

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

/// 池任务: 一次性执行的闭包
pub type PoolTask = Box<dyn FnOnce() + Send + 'static>;

// ==========================================
// WorkerPool - 有界工作线程池
// ==========================================
pub struct WorkerPool {
    max_parallel: usize,
}

impl WorkerPool {
    /// # 参数
    /// - max_parallel: 最大并行度 (0 按 1 处理)
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// 执行全部任务并阻塞等待完成
    ///
    /// 任务经共享队列分发给至多 max_parallel 个工作线程,
    /// 发送端关闭后工作线程自然退出
    pub fn execute(&self, tasks: Vec<PoolTask>) {
        if tasks.is_empty() {
            return;
        }

        let workers = self.max_parallel.min(tasks.len());
        let (tx, rx) = mpsc::channel::<PoolTask>();
        for task in tasks {
            // 本地通道发送不会失败, 接收端在本函数内存活
            let _ = tx.send(task);
        }
        drop(tx);

        let rx = Arc::new(Mutex::new(rx));
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = rx.clone();
            handles.push(thread::spawn(move || loop {
                let task = {
                    let guard = rx.lock().expect("任务队列锁中毒");
                    guard.recv()
                };
                match task {
                    Ok(task) => task(),
                    Err(_) => break,
                }
            }));
        }

        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_all_tasks_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<PoolTask> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }) as PoolTask
            })
            .collect();
        WorkerPool::new(4).execute(tasks);
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_parallelism_never_exceeds_cap() {
        let active = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<PoolTask> = (0..6)
            .map(|_| {
                let active = active.clone();
                let high_water = high_water.clone();
                Box::new(move || {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    active.fetch_sub(1, Ordering::SeqCst);
                }) as PoolTask
            })
            .collect();
        WorkerPool::new(2).execute(tasks);
        assert!(high_water.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_serialized_pool_runs_in_submission_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<PoolTask> = (0..5)
            .map(|i| {
                let order = order.clone();
                Box::new(move || {
                    order.lock().unwrap().push(i);
                }) as PoolTask
            })
            .collect();
        WorkerPool::new(1).execute(tasks);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
