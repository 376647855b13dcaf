//! 报告生成（行号定位、上下文片段、JSON/CSV 序列化）
//!
//! 行号与片段必须在单文件扫描过程中、解码文本仍然在手时完成折算；
//! 文本缓冲在文件扫描结束后即释放，记录里只留独立拷贝。
use std::io::Write;
use std::path::Path;

use crate::correlate::{ceil_char_boundary, floor_char_boundary};
use crate::error::Result;
use crate::findings::Finding;
use crate::mask::mask_value;
use crate::tuning::Tuning;
use crate::types::OutputRecord;

/// 行起点索引：对解码文本扫描一次换行边界，之后按起始偏移二分定位行号
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' && i + 1 < text.len() {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 返回包含该偏移的行（1 起始）；混合行尾（\n 与 \r\n）下同样稳定，
    /// 因为索引建立在已解码文本上且只以 \n 作为行界
    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}

/// 将窗口内的换行展平为空格（CR 与 LF 都替换，字节长度不变）
pub(crate) fn flatten_newlines(s: &str) -> String {
    s.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect()
}

/// 以固定半径截取命中附近的上下文片段
pub(crate) fn snippet(text: &str, start: usize, end: usize, radius: usize) -> String {
    let lo = floor_char_boundary(text, start.saturating_sub(radius));
    let hi = ceil_char_boundary(text, end.saturating_add(radius).min(text.len()));
    flatten_newlines(&text[lo..hi])
}

/// 将单文件的命中折算成输出记录（打码、行号、片段都在此处固化）
pub(crate) fn records_for_file(
    path: &Path,
    text: &str,
    findings: Vec<Finding>,
    tuning: &Tuning,
) -> Vec<OutputRecord> {
    let index = LineIndex::new(text);
    findings
        .into_iter()
        .map(|f| OutputRecord {
            file: path.to_path_buf(),
            line: index.line_of(f.start_offset),
            start: f.start_offset,
            end: f.end_offset,
            kind: f.kind,
            value_masked: mask_value(f.kind, &f.value),
            context: snippet(text, f.start_offset, f.end_offset, tuning.snippet_radius),
            value_raw: f.value,
        })
        .collect()
}

/// 结构化输出：固定字段顺序的 JSON 数组
/// reveal_raw 为 false 时 value_raw 一律写成 null
pub fn write_json(out: &mut dyn Write, records: &[OutputRecord], reveal_raw: bool) -> Result<()> {
    let views: Vec<_> = records.iter().map(|r| r.view(reveal_raw)).collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}

/// 表格输出：带表头的 CSV，与 JSON 携带同一组字段
/// reveal_raw 为 false 时 value_raw 列为空
pub fn write_csv(out: &mut dyn Write, records: &[OutputRecord], reveal_raw: bool) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["file", "line", "start", "end", "type", "value_masked", "value_raw", "context"])?;
    for r in records {
        let file = r.file.display().to_string();
        let line = r.line.to_string();
        let start = r.start.to_string();
        let end = r.end.to_string();
        let raw = if reveal_raw { r.value_raw.as_str() } else { "" };
        wtr.write_record([
            file.as_str(),
            line.as_str(),
            start.as_str(),
            end.as_str(),
            r.kind.as_str(),
            r.value_masked.as_str(),
            raw,
            r.context.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FindingKind;

    #[test]
    fn line_index_over_mixed_endings() {
        let text = "first\r\nsecond\nthird";
        let idx = LineIndex::new(text);
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(5), 1); // \r 仍属第一行
        assert_eq!(idx.line_of(7), 2);
        assert_eq!(idx.line_of(14), 3);
        assert_eq!(idx.line_of(text.len() - 1), 3);
    }

    #[test]
    fn snippet_flattens_newlines() {
        let text = "a\nb\r\nc 12345678 d\ne";
        let s = snippet(text, 7, 15, 40);
        assert!(!s.contains('\n'));
        assert!(!s.contains('\r'));
        assert!(s.contains("12345678"));
    }

    #[test]
    fn json_hides_raw_by_default() {
        let rec = OutputRecord {
            file: "x.md".into(),
            line: 1,
            start: 0,
            end: 16,
            kind: FindingKind::CreditCard,
            value_masked: "************1486".to_string(),
            value_raw: "4539578763621486".to_string(),
            context: "ctx".to_string(),
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &[rec.clone()], false).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("\"value_raw\": null"));
        assert!(!s.contains("4539578763621486"));
        assert!(s.contains("\"type\": \"CREDIT_CARD\""));

        let mut buf = Vec::new();
        write_json(&mut buf, &[rec], true).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("4539578763621486"));
    }

    #[test]
    fn csv_shape_and_quoting() {
        let rec = OutputRecord {
            file: "dir/notes.md".into(),
            line: 3,
            start: 10,
            end: 18,
            kind: FindingKind::AccountLike,
            value_masked: "****5678".to_string(),
            value_raw: "12345678".to_string(),
            context: "has, comma".to_string(),
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &[rec], false).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let mut lines = s.lines();
        assert_eq!(
            lines.next().unwrap(),
            "file,line,start,end,type,value_masked,value_raw,context"
        );
        let row = lines.next().unwrap();
        // 含逗号的字段按标准规则加引号；raw 列默认留空
        assert!(row.contains("\"has, comma\""));
        assert!(row.contains("ACCOUNT_LIKE"));
        assert!(!row.contains("12345678"));
        assert!(row.contains("****5678"));
    }
}
