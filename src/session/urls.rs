/// 设置相关路径
pub const PATH_SETTINGS: &str = "/shipping/api/v1/settings";

/// 运费区域相关路径
pub const PATH_REGIONS: &str = "/shipping/api/v1/regions";

/// 配送方式相关路径
pub const PATH_METHODS: &str = "/shipping/api/v1/methods";

/// 公共数据：可用区域 + 方式 + 规则
pub const PATH_GET_REGIONS: &str = "/shipping/api/v1/get_regions";

/// 运费试算
pub const PATH_CALCULATE_PRICE: &str = "/shipping/api/v1/calculate_price";

/// 宿主提供的法币列表
pub const PATH_CURRENCIES: &str = "/api/v1/currencies";

pub fn path_entry(base: &str, id: &str) -> String {
    format!("{}/{}", base, id)
}

pub fn path_paginated(base: &str, query: &str) -> String {
    format!("{}/paginated?{}", base, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_and_paginated_paths() {
        assert_eq!(path_entry(PATH_REGIONS, "42"), "/shipping/api/v1/regions/42");
        assert_eq!(
            path_paginated(PATH_METHODS, "limit=10"),
            "/shipping/api/v1/methods/paginated?limit=10"
        );
    }
}
