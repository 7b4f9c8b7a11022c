//! 重载策略
//!
//! 每个加载后的来源持有一个策略：
//! - `Invariant`：永不重载
//! - `FileChanged`：超过最小检查间隔后比较文件修改时间，变新则重载

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug)]
pub enum ReloadStrategy {
    Invariant,
    FileChanged(FileChangedStrategy),
}

impl ReloadStrategy {
    /// 以秒为单位的延迟创建文件变更策略
    pub fn file_changed(path: impl Into<PathBuf>, delay_secs: u64) -> Self {
        ReloadStrategy::FileChanged(FileChangedStrategy::new(
            path,
            Duration::from_secs(delay_secs),
        ))
    }

    /// 是否需要重载；检查间隔未到时直接返回 false
    pub fn reloading_required(&mut self) -> bool {
        match self {
            ReloadStrategy::Invariant => false,
            ReloadStrategy::FileChanged(strategy) => strategy.reloading_required(),
        }
    }

    /// 重载成功后调用
    pub fn reloading_performed(&mut self) {
        if let ReloadStrategy::FileChanged(strategy) = self {
            strategy.reloading_performed();
        }
    }

    pub fn refresh_delay(&self) -> Option<Duration> {
        match self {
            ReloadStrategy::Invariant => None,
            ReloadStrategy::FileChanged(strategy) => Some(strategy.refresh_delay),
        }
    }
}

/// 基于文件修改时间的重载策略
#[derive(Debug)]
pub struct FileChangedStrategy {
    path: PathBuf,
    refresh_delay: Duration,
    last_modified: Option<SystemTime>,
    last_checked: Instant,
}

impl FileChangedStrategy {
    pub fn new(path: impl Into<PathBuf>, refresh_delay: Duration) -> Self {
        let path = path.into();
        let last_modified = modified_time(&path);
        Self {
            path,
            refresh_delay,
            last_modified,
            last_checked: Instant::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 检查间隔是否已到（"stale" 状态）
    pub fn is_stale(&self) -> bool {
        self.last_checked.elapsed() >= self.refresh_delay
    }

    pub fn reloading_required(&mut self) -> bool {
        if !self.is_stale() {
            return false;
        }
        let changed = self.has_changed();
        self.last_checked = Instant::now();
        changed
    }

    pub fn reloading_performed(&mut self) {
        self.last_modified = modified_time(&self.path);
    }

    /// 文件不存在时视为未变化
    fn has_changed(&self) -> bool {
        match (modified_time(&self.path), self.last_modified) {
            (None, _) => {
                log::debug!("file does not exist: {}", self.path.display());
                false
            }
            (Some(_), None) => true,
            (Some(current), Some(last)) => current > last,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
