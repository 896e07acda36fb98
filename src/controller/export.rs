use super::table::Column;
use crate::model::TableRow;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<resource>_<YYYY-MM-DD>.csv`
pub fn export_file_name(resource: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", resource, date.format("%Y-%m-%d"))
}

fn wrap_csv_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// 生成 CSV 文本：首行为列标题，每个值都加引号，行之间用 CRLF
pub fn csv_content<R: TableRow>(columns: &[Column], rows: &[R]) -> String {
    let header = columns
        .iter()
        .map(|c| wrap_csv_value(c.label))
        .collect::<Vec<_>>()
        .join(",");
    let mut lines = vec![header];
    for row in rows {
        let line = columns
            .iter()
            .map(|c| wrap_csv_value(&row.cell(c.field).to_export_string()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\r\n")
}

/// 把当前已加载的行写入 `dir` 下的 CSV 文件，返回文件路径
pub fn export_csv<R: TableRow>(
    dir: &Path,
    resource: &str,
    date: NaiveDate,
    columns: &[Column],
    rows: &[R],
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(export_file_name(resource, date));
    std::fs::write(&path, csv_content(columns, rows)).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
