/// 缓存键生成
/// 负责构建完整编码请求身份的缓存键
pub mod search_keys;

pub use search_keys::*;
