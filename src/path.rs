//! 路径拼接：控制器前缀 + 方法路径 => 规范化的绝对路径。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SLASH_RUN: Regex = Regex::new(r"/+").unwrap();
}

/// 将类级别的前缀与方法级别的路径片段拼接为一个规范化的绝对路径。
///
/// 规则：
/// 1. 两个输入各自去掉首尾的 `/`。
/// 2. 以 `/前缀/片段` 的形式拼接。
/// 3. 连续的 `/` 折叠为一个。
/// 4. 去掉结尾的 `/`，结果为空时返回根路径 `/`。
///
/// ```
/// use hermite::path::compose;
///
/// assert_eq!(compose("posts", "{id}"), "/posts/{id}");
/// assert_eq!(compose("/posts/", ""), "/posts");
/// assert_eq!(compose("", ""), "/");
/// ```
pub fn compose(base: &str, method_path: &str) -> String {
    let joined = format!(
        "/{}/{}",
        base.trim_matches('/'),
        method_path.trim_matches('/')
    );
    let collapsed = SLASH_RUN.replace_all(&joined, "/");
    let trimmed = collapsed.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
