//! 归并指标收集模块

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// 最多保留的耗时样本数
const MAX_DURATION_SAMPLES: usize = 1000;

/// 指标数据
#[derive(Debug, Clone, Default)]
pub struct ReconcileMetrics {
    pub passes_total: u64,
    pub passes_failed: u64,
    pub instances_skipped: u64,
    pub revisions_resolved: u64,
    pub events_notified: u64,
    pub pass_duration_ms: Vec<u64>,
}

impl ReconcileMetrics {
    /// 最近一轮的耗时
    pub fn last_pass_duration_ms(&self) -> Option<u64> {
        self.pass_duration_ms.last().copied()
    }
}

/// 单轮归并的统计
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    pub skipped: usize,
    pub resolved: usize,
    pub notified: usize,
}

/// 指标收集器
#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ReconcileMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(ReconcileMetrics::default())),
        }
    }

    /// 记录一轮成功的归并
    pub async fn record_pass(&self, stats: PassStats, duration: Duration) {
        let mut metrics = self.metrics.write().await;
        metrics.passes_total += 1;
        metrics.instances_skipped += stats.skipped as u64;
        metrics.revisions_resolved += stats.resolved as u64;
        metrics.events_notified += stats.notified as u64;
        Self::push_duration(&mut metrics, duration);
    }

    /// 记录一轮失败的归并
    pub async fn record_failure(&self, duration: Duration) {
        let mut metrics = self.metrics.write().await;
        metrics.passes_total += 1;
        metrics.passes_failed += 1;
        Self::push_duration(&mut metrics, duration);
    }

    /// 记录订阅时的即时推送
    pub async fn record_notified(&self, events: usize) {
        let mut metrics = self.metrics.write().await;
        metrics.events_notified += events as u64;
    }

    pub async fn get_metrics(&self) -> ReconcileMetrics {
        self.metrics.read().await.clone()
    }

    fn push_duration(metrics: &mut ReconcileMetrics, duration: Duration) {
        metrics.pass_duration_ms.push(duration.as_millis() as u64);
        if metrics.pass_duration_ms.len() > MAX_DURATION_SAMPLES {
            metrics.pass_duration_ms.remove(0);
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
