use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finhunter_core::{normalize_ext, scan_directory, write_csv, write_json, ScanOptions};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "finhunter", version, about = "敏感金融数据扫描器（信用卡/IBAN/银行账号）")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描目录并输出命中报告
    Scan {
        /// 待扫描的根目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件；缺省写到标准输出
        #[arg(long)]
        output: Option<PathBuf>,

        /// 输出格式：json（结构化）或 csv（表格）
        #[arg(long, default_value = "json", value_parser = ["json", "csv"])]
        format: String,

        /// 单文件最大读取字节数
        #[arg(long, default_value_t = finhunter_core::DEFAULT_MAX_BYTES)]
        max_bytes: u64,

        /// 仅扫描这些扩展名（可重复，如 --include-ext md --include-ext txt）
        #[arg(long)]
        include_ext: Vec<String>,

        /// 排除这些扩展名（可重复）
        #[arg(long)]
        exclude_ext: Vec<String>,

        /// 线程数（"auto"=CPU 核心数；1 走串行）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 整体超时（毫秒）；到期后放弃未开始的文件并在报告中标记不完整
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// 调参文件路径（TOML）；缺省使用内置常量
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// 有命中时以退出码 1 结束（CI 集成用）
        #[arg(long)]
        exit_code: bool,

        /// 抑制全部输出，仅设置退出码
        #[arg(long)]
        quiet: bool,

        /// 在输出中附带原始命中值（默认只输出打码值）
        #[arg(long)]
        reveal_raw: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            format,
            max_bytes,
            include_ext,
            exclude_ext,
            threads,
            timeout_ms,
            tuning,
            exit_code,
            quiet,
            reveal_raw,
        } => {
            // quiet 模式下连告警也不打印，只保留退出码语义
            init_tracing(quiet);
            info!(input = %input.display(), format = %format, "starting scan");

            let opts = ScanOptions {
                max_bytes,
                include_exts: to_ext_set(&include_ext),
                exclude_exts: to_ext_set(&exclude_ext),
                threads: parse_threads(&threads),
                timeout: timeout_ms.map(Duration::from_millis),
                tuning_path: tuning,
            };
            let report = scan_directory(&input, &opts).context("scan failed")?;

            if !quiet {
                // 以缓冲方式写输出（文件或标准输出）
                let mut out: Box<dyn Write> = match &output {
                    Some(path) => Box::new(BufWriter::new(
                        File::create(path).context("create output file")?,
                    )),
                    None => Box::new(BufWriter::new(std::io::stdout())),
                };
                match format.as_str() {
                    "csv" => write_csv(&mut out, &report.records, reveal_raw)?,
                    _ => write_json(&mut out, &report.records, reveal_raw)?,
                }
                out.flush().ok();

                if !report.complete {
                    eprintln!(
                        "warning: scan timed out, {} file(s) not scanned",
                        report.stats.files_abandoned
                    );
                }
                if !report.clean() && !exit_code {
                    eprintln!(
                        "warning: found {} potential sensitive data item(s)",
                        report.records.len()
                    );
                }
            }

            info!(
                files_scanned = report.stats.files_scanned,
                findings = report.stats.findings_total,
                complete = report.complete,
                "scan finished"
            );

            if exit_code && !report.clean() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let default = if quiet { "off" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数："auto" 表示自动（等于 CPU 核数）；其他为具体数值
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

/// 归一化扩展名参数；空列表表示使用库内默认集合
fn to_ext_set(exts: &[String]) -> Option<HashSet<String>> {
    if exts.is_empty() {
        return None;
    }
    Some(exts.iter().map(|e| normalize_ext(e)).collect())
}
