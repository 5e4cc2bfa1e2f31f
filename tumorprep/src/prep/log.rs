use std::time::{Duration, Instant};
use tracing::info;

/// 分段累计计时器。
#[derive(Clone, Debug)]
pub struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器，视为已经调用过一次`self.start()`。
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 累计自上一次`self.start()`以来的时间。
    #[inline]
    pub fn elapsed(&mut self) {
        self.consumed += self.since.elapsed();
    }

    #[inline]
    pub fn total(&self) -> Duration {
        self.consumed
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 一次数据集扫描的统计。
#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    /// 遍历到的病例目录数。
    pub patients: usize,
    /// 成功提取（可能为0张切片）的病例数。
    pub extracted: usize,
    /// 因缺少模态或标注而跳过的病例数。
    pub skipped: usize,
    /// 提取的样本数。
    pub samples: usize,
    /// 因退化切片而被排除的深度索引数。
    pub degenerate: usize,
    /// 体数据解码耗时。
    pub load_timer: AccTimer,
    /// 切片归一化与组装耗时。
    pub assemble_timer: AccTimer,
}

impl ScanReport {
    pub fn summary(&self) {
        info!(
            patients = self.patients,
            extracted = self.extracted,
            skipped = self.skipped,
            samples = self.samples,
            degenerate = self.degenerate,
            load_ms = self.load_timer.total().as_millis() as u64,
            assemble_ms = self.assemble_timer.total().as_millis() as u64,
            "dataset scan finished"
        );
    }
}
