//! 错误分类（对外暴露）
//!
//! 策略：
//! - 配置级失败（根目录无效、调参文件损坏、模式编译失败）在扫描开始前即返回错误；
//! - 文件级失败（不可读、消失、二进制、解码失败）一律就地恢复，绝不中止整体扫描。
use std::path::PathBuf;
use thiserror::Error;

/// 扫描器的致命错误类型；单文件故障不会出现在这里
#[derive(Error, Debug)]
pub enum ScanError {
    /// 扫描根路径不存在或不是目录（启动前检查）
    #[error("invalid scan root: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// 模式编译失败（内置或调参文件提供的正则），启动前致命
    #[error("invalid pattern '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// 调参文件（TOML）读取或解析失败，启动前致命
    #[error("tuning file error: {0}")]
    Tuning(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
