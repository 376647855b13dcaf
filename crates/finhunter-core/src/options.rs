//! 扫描选项与统计信息（模块）
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// 每文件默认读取上限（字节）
pub const DEFAULT_MAX_BYTES: u64 = 5_000_000;

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 单文件最大读取字节数；超出部分不读取（限定最坏情况的内存与耗时）
    pub max_bytes: u64,
    /// 包含扩展名集合（小写、不含点）；None 表示使用默认集合
    pub include_exts: Option<HashSet<String>>,
    /// 排除扩展名集合（小写、不含点）；None 表示使用默认集合
    pub exclude_exts: Option<HashSet<String>>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 整体超时；到期后放弃尚未开始的文件，已完成文件的结果保留
    pub timeout: Option<Duration>,
    /// 调参文件路径（TOML）；为空则使用内置默认常量
    pub tuning_path: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            include_exts: None,
            exclude_exts: None,
            threads: None,
            timeout: None,
            tuning_path: None,
        }
    }
}

/// 默认包含的文本类扩展名
pub(crate) fn default_include_exts() -> HashSet<String> {
    ["md", "txt", "yml", "yaml"].iter().map(|s| s.to_string()).collect()
}

/// 默认排除的扩展名（版本控制、图片、文档产物）
pub(crate) fn default_exclude_exts() -> HashSet<String> {
    ["git", "pdf", "png", "jpg", "jpeg"].iter().map(|s| s.to_string()).collect()
}

/// 归一化扩展名：去前导点、转小写（CLI 允许 ".md" 与 "md" 两种写法）
pub fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub files_scanned: usize,
    /// 被跳过的文件数（二进制、不可读、超限等）
    pub files_skipped: usize,
    /// 因整体超时而未开始扫描的文件数
    pub files_abandoned: usize,
    pub findings_total: usize,
}
