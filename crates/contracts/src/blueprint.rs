//! DispatchBlueprint - Config Loader 输出
//!
//! 描述一次分发任务的完整配置：分发器退避策略、下游处理器及其限流参数。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::Limits;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的分发配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 分发器设置
    #[serde(default)]
    pub dispatcher: DispatcherSettings,

    /// 下游处理器
    pub processor: ProcessorConfig,
}

/// 分发器设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherSettings {
    /// Blocked 之后的固定重试间隔 (毫秒)，必须 > 0
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// 连续空批次上限 (None = 不限制)
    #[serde(default)]
    pub max_empty_batches: Option<u32>,
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl DispatcherSettings {
    /// 以固定重试间隔创建
    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self {
            retry_delay_ms: retry_delay.as_millis() as u64,
            ..Self::default()
        }
    }

    /// 重试间隔
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            max_empty_batches: None,
        }
    }
}

/// 处理器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    /// 仅记录日志
    Log,
    /// 按行追加写入文件
    File,
}

/// 处理器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// 处理器名称 (日志/指标标签)
    pub name: String,

    /// 处理器类型
    pub kind: ProcessorKind,

    /// 单批最大条目数，必须 > 0
    pub max_batch_size: usize,

    /// 两批之间的最小间隔 (毫秒)
    #[serde(default)]
    pub min_period_ms: u64,

    /// 是否在处理器前强制执行配额 (超限返回 Blocked)
    #[serde(default)]
    pub enforce_quota: bool,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ProcessorConfig {
    /// 配置中声明的限流参数
    pub fn limits(&self) -> Limits {
        Limits::new(self.max_batch_size, Duration::from_millis(self.min_period_ms))
    }
}
