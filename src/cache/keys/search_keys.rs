/// 图片搜索缓存键前缀
const SEARCH_PREFIX: &str = "unsplash:search";

/// 图片搜索结果缓存键
///
/// 查询文本经过长度前缀编码，含有 `:` 的查询不会与其他参数组合冲突
pub fn search_results(query: &str, per_page: u32, page: u32, orientation: &str) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}",
        SEARCH_PREFIX,
        query.len(),
        query,
        per_page,
        page,
        orientation
    )
}
