//! 敏感金融数据扫描库
//!
//! 设计要点：
//! - 数据单向流动：读取 → 检测 → 校验 → 配对 → 误报过滤 → 去重打码 → 报告；
//! - 凡存在校验和的类别（信用卡/IBAN/ABA），结构匹配后必须通过对应校验；
//! - 无校验和的国家类格式靠近邻窗口内的伴随账号字段成立；
//! - 文件级并行、无跨文件共享状态；单次调用之外不保留任何状态；
//! - 单文件故障就地恢复，只有配置级失败会在扫描开始前报错。

// 模块化拆分：一个关注点一个文件
mod context;
mod correlate;
mod detectors;
mod engine;
mod error;
mod filter;
mod findings;
mod mask;
mod options;
mod report;
mod scan;
mod tuning;
mod types;
pub mod validators;

// 对外暴露的最小 API 面
pub use error::{Result, ScanError};
pub use options::{normalize_ext, ScanOptions, ScanStats, DEFAULT_MAX_BYTES};
pub use report::{write_csv, write_json};
pub use scan::scan_directory;
pub use types::{FindingKind, OutputRecord, ScanReport};
