use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// 表格列定义（展示与 CSV 导出共用）
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
    pub field: &'static str,
    pub sortable: bool,
    pub align: Align,
}

impl Column {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field: name,
            sortable: true,
            align: Align::Left,
        }
    }

    /// 右对齐的数值列
    pub const fn numeric(name: &'static str, label: &'static str) -> Self {
        Self {
            align: Align::Right,
            ..Self::new(name, label)
        }
    }
}

/// 分页状态，完全由客户端持有
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub rows_per_page: u32,
    pub sort_by: Option<String>,
    pub descending: bool,
    /// 服务端返回的总条数
    pub rows_number: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            rows_per_page: 10,
            sort_by: Some("updated_at".to_string()),
            descending: true,
            rows_number: 10,
        }
    }
}

impl Pagination {
    pub fn page_count(&self) -> u32 {
        if self.rows_per_page == 0 {
            return 1;
        }
        let pages = self.rows_number.div_ceil(self.rows_per_page as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.clamp(1, self.page_count()),
            ..self.clone()
        }
    }

    /// 切换排序列；同一列再次选择时翻转方向
    pub fn with_sort(&self, field: &str, descending: Option<bool>) -> Self {
        let same = self.sort_by.as_deref() == Some(field);
        let descending = descending.unwrap_or(if same { !self.descending } else { false });
        Self {
            sort_by: Some(field.to_string()),
            descending,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_rows_per_page(&self, rows: u32) -> Self {
        Self {
            rows_per_page: rows.max(1),
            page: 1,
            ..self.clone()
        }
    }
}

/// 列表的可变状态：搜索词 + 分页
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub search: String,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, PartialEq)]
struct FilterQuery<'a> {
    limit: u32,
    offset: u64,
    sortby: &'a str,
    direction: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

/// 把表格状态转成分页接口的 query string
///
/// 传入的 `override_pagination` 会先写回表格状态（翻页/排序请求），再参与拼接。
pub fn prepare_filter_query(table: &mut TableState, override_pagination: Option<Pagination>) -> String {
    if let Some(p) = override_pagination {
        // 总数以服务端为准
        let rows_number = table.pagination.rows_number;
        table.pagination = Pagination { rows_number, ..p };
    }
    let p = &table.pagination;
    let search = table.search.trim();
    let query = FilterQuery {
        limit: p.rows_per_page,
        offset: (p.page.max(1) as u64 - 1) * p.rows_per_page as u64,
        sortby: p.sort_by.as_deref().unwrap_or(""),
        direction: if p.descending { "desc" } else { "asc" },
        search: if search.is_empty() { None } else { Some(search) },
    };
    serde_urlencoded::to_string(&query).unwrap_or_default()
}

/// 加载中标记：持有期间计数 +1，离开作用域自动 -1
pub struct LoadingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    pub fn acquire(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
