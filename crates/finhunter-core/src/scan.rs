//! 扫描主流程与并行调度
//!
//! 稳定性保证：
//! - 文件级：先收集文件并按路径排序，结果按文件索引重排后拼接，顺序可复现
//!   （调用方仍不应依赖具体顺序）
//! - 文件内：命中项按 (start_offset 升序, value 长度降序, value 字典序升序) 排序
//! 并行模型：每个 worker 独占一个文件从读取到过滤的全过程，结果经有界通道
//! 汇入单一收集端；文件之间没有共享可变状态。
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::context::ContextVocab;
use crate::detectors::DetectorSet;
use crate::engine::{read_text_file, scan_text};
use crate::error::{Result, ScanError};
use crate::filter::FalsePositiveFilter;
use crate::options::{default_exclude_exts, default_include_exts, ScanOptions, ScanStats};
use crate::report::records_for_file;
use crate::tuning::{load_tuning, Tuning};
use crate::types::{OutputRecord, ScanReport};

/// 单文件扫描结局（通道消息的一部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    /// 正常扫描完成（含零命中）
    Scanned,
    /// 被跳过：二进制、不可读或读取中途失败
    Skipped,
    /// 截止时间已过，未开始扫描
    Abandoned,
}

/// 扫描目录并返回完整报告
/// 配置级失败（根路径无效、调参文件损坏、模式编译失败）在任何扫描开始前返回错误
pub fn scan_directory(root: &Path, opts: &ScanOptions) -> Result<ScanReport> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }

    // 启动期构建：调参、检测器、词表、误报过滤器（失败即致命）
    let tuning = Arc::new(load_tuning(opts.tuning_path.as_deref())?);
    let detectors = Arc::new(DetectorSet::compile()?);
    let vocab = Arc::new(ContextVocab::build_from(&tuning));
    let fpf = Arc::new(FalsePositiveFilter::compile(&tuning)?);

    // 遍历并按扩展名筛选（无限深度；遍历本身无序，收集后排序保证可复现）
    let include = opts.include_exts.clone().unwrap_or_else(default_include_exts);
    let exclude = opts.exclude_exts.clone().unwrap_or_else(default_exclude_exts);
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !include.is_empty() && !include.contains(&ext) {
            continue;
        }
        if exclude.contains(&ext) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    info!(files = files.len(), root = %root.display(), "starting scan");

    let deadline = opts.timeout.map(|d| Instant::now() + d);
    let threads = opts.threads.unwrap_or_else(num_cpus::get);

    let mut stats = ScanStats::default();
    let records = if threads > 1 {
        scan_parallel(
            &files, opts, &tuning, &detectors, &vocab, &fpf, deadline, &mut stats, threads,
        )
    } else {
        scan_serial(&files, opts, &tuning, &detectors, &vocab, &fpf, deadline, &mut stats)
    };

    stats.findings_total = records.len();
    let complete = stats.files_abandoned == 0;
    info!(
        files_scanned = stats.files_scanned,
        findings = stats.findings_total,
        complete,
        "scan finished"
    );
    Ok(ScanReport { records, stats, complete })
}

/// 扫描单个文件：读取/解码 → 检测管线 → 输出记录
/// 返回 None 表示按二进制跳过；错误由调用方按“跳过并告警”处理
fn scan_one_file(
    path: &Path,
    max_bytes: u64,
    tuning: &Tuning,
    detectors: &DetectorSet,
    vocab: &ContextVocab,
    fpf: &FalsePositiveFilter,
) -> anyhow::Result<Option<Vec<OutputRecord>>> {
    let text = match read_text_file(path, max_bytes, tuning)? {
        Some(t) => t,
        None => return Ok(None),
    };
    let findings = scan_text(&text, detectors, vocab, fpf, tuning);
    Ok(Some(records_for_file(path, &text, findings, tuning)))
}

/// 串行路径（threads == 1）
#[allow(clippy::too_many_arguments)]
fn scan_serial(
    files: &[PathBuf],
    opts: &ScanOptions,
    tuning: &Tuning,
    detectors: &DetectorSet,
    vocab: &ContextVocab,
    fpf: &FalsePositiveFilter,
    deadline: Option<Instant>,
    stats: &mut ScanStats,
) -> Vec<OutputRecord> {
    let mut records = Vec::new();
    for path in files {
        // 超时检查只在文件之间进行（协作式取消，绝不打断匹配中途）
        if deadline.is_some_and(|d| Instant::now() > d) {
            stats.files_abandoned += 1;
            continue;
        }
        match scan_one_file(path, opts.max_bytes, tuning, detectors, vocab, fpf) {
            Ok(Some(recs)) => {
                stats.files_scanned += 1;
                records.extend(recs);
            }
            Ok(None) => stats.files_skipped += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                stats.files_skipped += 1;
            }
        }
    }
    records
}

/// 并行调度：
/// - 建索引后使用 Rayon 线程池并行扫描
/// - 单线程收集端按 idx 重排拼接，保证输出顺序可复现
#[allow(clippy::too_many_arguments)]
fn scan_parallel(
    files: &[PathBuf],
    opts: &ScanOptions,
    tuning: &Arc<Tuning>,
    detectors: &Arc<DetectorSet>,
    vocab: &Arc<ContextVocab>,
    fpf: &Arc<FalsePositiveFilter>,
    deadline: Option<Instant>,
    stats: &mut ScanStats,
    threads: usize,
) -> Vec<OutputRecord> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    // 通道用于 worker → collector 传递结果
    type Msg = (usize, Vec<OutputRecord>, FileOutcome);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let files_vec: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    let tuning = Arc::clone(tuning);
    let detectors = Arc::clone(detectors);
    let vocab = Arc::clone(vocab);
    let fpf = Arc::clone(fpf);
    let max_bytes = opts.max_bytes;

    // 收集端保持在当前线程；扫描在后台线程内建 Rayon 池执行
    let scan_thread = std::thread::spawn(move || {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("build rayon pool");
        pool.install(|| {
            files_vec.par_iter().for_each(|(idx, path)| {
                // 超时检查只在文件开始前进行；已开始的文件跑完为止
                if deadline.is_some_and(|d| Instant::now() > d) {
                    let _ = tx.send((*idx, Vec::new(), FileOutcome::Abandoned));
                    return;
                }
                match scan_one_file(path, max_bytes, &tuning, &detectors, &vocab, &fpf) {
                    Ok(Some(recs)) => {
                        let _ = tx.send((*idx, recs, FileOutcome::Scanned));
                    }
                    Ok(None) => {
                        let _ = tx.send((*idx, Vec::new(), FileOutcome::Skipped));
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable file");
                        let _ = tx.send((*idx, Vec::new(), FileOutcome::Skipped));
                    }
                }
            });
        });
        // 循环结束后所有 Sender 随之释放，Receiver 收到关闭信号
    });

    // 收集端：维护 next_idx 与缓存，按序拼接
    let mut records: Vec<OutputRecord> = Vec::new();
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, (Vec<OutputRecord>, FileOutcome)> = BTreeMap::new();

    let absorb = |recs: Vec<OutputRecord>, outcome: FileOutcome, records: &mut Vec<OutputRecord>, stats: &mut ScanStats| {
        match outcome {
            FileOutcome::Scanned => stats.files_scanned += 1,
            FileOutcome::Skipped => stats.files_skipped += 1,
            FileOutcome::Abandoned => stats.files_abandoned += 1,
        }
        records.extend(recs);
    };

    while let Ok((idx, recs, outcome)) = rx.recv() {
        buffer.insert(idx, (recs, outcome));
        while let Some((recs, outcome)) = buffer.remove(&next_idx) {
            absorb(recs, outcome, &mut records, stats);
            next_idx += 1;
        }
    }

    let _ = scan_thread.join();

    // 最终冲刷残余（理论上缓冲应已清空）
    while let Some((recs, outcome)) = buffer.remove(&next_idx) {
        absorb(recs, outcome, &mut records, stats);
        next_idx += 1;
    }

    records
}
