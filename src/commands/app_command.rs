use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Regions,
    Methods,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Regions => "regions",
            TableKind::Methods => "methods",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "region" | "regions" => Some(TableKind::Regions),
            "method" | "methods" => Some(TableKind::Methods),
            _ => None,
        }
    }
}

/// 列表页上的操作
#[derive(Debug, Clone, PartialEq)]
pub enum TableOp {
    List,
    Search(String),
    Page(u32),
    NextPage,
    PrevPage,
    Rows(u32),
    Sort {
        field: String,
        descending: Option<bool>,
    },
    New,
    Edit(String),
    Save,
    Delete(String),
    Export,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Load,
    Table { table: TableKind, op: TableOp },
    SettingsShow,
    SettingsSave,
    Currencies,
    AvailableRegions,
    Quote {
        region: String,
        weight: i64,
        method: Option<String>,
    },
    Help,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "可用命令: regions|methods list|new|edit <id>|delete <id>|export|page <n>|rows <n>|sort <field> [asc|desc]|search [text] | settings | currencies | available | quote <region> <weight> [method] | reload | help | quit";

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        if let Some(table) = TableKind::parse(parts[0]) {
            return Ok(parse_table_op(table, &parts[1..]));
        }

        match parts[0] {
            "settings" => match parts.get(1).copied() {
                None | Some("show") => Ok(AppCommand::SettingsShow),
                Some("save") => Ok(AppCommand::SettingsSave),
                Some(other) => Ok(AppCommand::Unknown(format!(
                    "未知的 settings 子命令: {}",
                    other
                ))),
            },
            "currencies" => Ok(AppCommand::Currencies),
            "available" => Ok(AppCommand::AvailableRegions),
            "quote" => Ok(parse_quote(&parts[1..])),
            "reload" | "load" => Ok(AppCommand::Load),
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

fn parse_table_op(table: TableKind, args: &[&str]) -> AppCommand {
    let usage = || {
        AppCommand::Unknown(format!(
            "用法: {} list|new|edit <id>|delete <id>|export|page <n>|rows <n>|sort <field> [asc|desc]|search [text]",
            table.name()
        ))
    };
    let op = match args.first().copied() {
        None | Some("list") => TableOp::List,
        Some("new") => TableOp::New,
        Some("save") => TableOp::Save,
        Some("export") => TableOp::Export,
        Some("next") => TableOp::NextPage,
        Some("prev") => TableOp::PrevPage,
        Some("edit") => match args.get(1) {
            Some(id) => TableOp::Edit(id.to_string()),
            None => return usage(),
        },
        Some("delete") | Some("rm") => match args.get(1) {
            Some(id) => TableOp::Delete(id.to_string()),
            None => return usage(),
        },
        Some("page") => match args.get(1).and_then(|s| s.parse::<u32>().ok()) {
            Some(n) => TableOp::Page(n),
            None => return usage(),
        },
        Some("rows") => match args.get(1).and_then(|s| s.parse::<u32>().ok()) {
            Some(n) if n > 0 => TableOp::Rows(n),
            _ => return usage(),
        },
        Some("sort") => {
            let Some(field) = args.get(1) else {
                return usage();
            };
            let descending = match args.get(2).map(|s| s.to_ascii_lowercase()) {
                Some(d) if d == "desc" => Some(true),
                Some(d) if d == "asc" => Some(false),
                Some(_) => return usage(),
                None => None,
            };
            TableOp::Sort {
                field: field.to_string(),
                descending,
            }
        }
        Some("search") => TableOp::Search(args[1..].join(" ")),
        Some(_) => return usage(),
    };
    AppCommand::Table { table, op }
}

/// `quote <region...> <weight> [method...]`，区域名可以包含空格
fn parse_quote(args: &[&str]) -> AppCommand {
    let usage = || AppCommand::Unknown("用法: quote <region> <weight> [method]".to_string());
    let Some(weight_idx) = args.iter().position(|s| s.parse::<i64>().is_ok()) else {
        return usage();
    };
    if weight_idx == 0 {
        return usage();
    }
    let weight = match args[weight_idx].parse::<i64>() {
        Ok(w) => w,
        Err(_) => return usage(),
    };
    let method = args[weight_idx + 1..].join(" ");
    AppCommand::Quote {
        region: args[..weight_idx].join(" "),
        weight,
        method: if method.is_empty() { None } else { Some(method) },
    }
}
