//! 分发指标收集模块
//!
//! 记录分发循环的批次、阻塞、失败与进度指标，并提供在线统计工具。

use contracts::ProgressIndex;
use metrics::{counter, gauge, histogram};

/// 记录一次批次提交
pub fn record_batch_submitted(processor: &str, size: usize) {
    counter!(
        "batch_dispatch_batches_submitted_total",
        "processor" => processor.to_string()
    )
    .increment(1);

    histogram!(
        "batch_dispatch_batch_size",
        "processor" => processor.to_string()
    )
    .record(size as f64);
}

/// 记录批次成功
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_completed;
///
/// record_batch_completed("archive", 25, 12.5);
/// ```
pub fn record_batch_completed(processor: &str, size: usize, latency_ms: f64) {
    counter!(
        "batch_dispatch_batches_completed_total",
        "processor" => processor.to_string()
    )
    .increment(1);

    counter!(
        "batch_dispatch_items_processed_total",
        "processor" => processor.to_string()
    )
    .increment(size as u64);

    histogram!(
        "batch_dispatch_process_latency_ms",
        "processor" => processor.to_string()
    )
    .record(latency_ms);
}

/// 记录 Blocked 重试
pub fn record_blocked(processor: &str) {
    counter!(
        "batch_dispatch_blocked_total",
        "processor" => processor.to_string()
    )
    .increment(1);
}

/// 记录分发终止
///
/// `reason` 取值：`failed` / `cancelled` / `deadline` / `stalled` / `invalid_resume`
pub fn record_interrupted(processor: &str, reason: &'static str) {
    counter!(
        "batch_dispatch_interrupted_total",
        "processor" => processor.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// 记录当前进度 (-1 表示尚无确认)
pub fn record_progress(processor: &str, progress: ProgressIndex) {
    gauge!(
        "batch_dispatch_progress_index",
        "processor" => processor.to_string()
    )
    .set(progress.as_i64() as f64);
}

/// 统计摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// 当前摘要
    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(RunningStats::default().summary().to_string(), "N/A");

        let mut stats = RunningStats::default();
        stats.push(10.0);
        stats.push(20.0);
        let output = stats.summary().to_string();
        assert!(output.contains("mean=15.000"), "got: {output}");
        assert!(output.contains("(n=2)"), "got: {output}");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        // 未安装 recorder 时宏调用应静默
        record_batch_submitted("test", 3);
        record_batch_completed("test", 3, 1.5);
        record_blocked("test");
        record_interrupted("test", "cancelled");
        record_progress("test", ProgressIndex::at(2));
    }
}
