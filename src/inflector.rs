//! 命名变换工具
//!
//! 表名、外键名和一对多关系别名都由模型名推导

use convert_case::{Case, Casing};

/// 驼峰转下划线：`UserGroup` -> `user_group`
pub fn underscore(word: &str) -> String {
    word.to_case(Case::Snake)
}

/// 下划线转驼峰：`author_id` -> `AuthorId`
pub fn camelize(word: &str) -> String {
    word.to_case(Case::Pascal)
}

/// 英文复数形式，保留原有大小写
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_ascii_lowercase();
    if lower.ends_with("ss")
        || lower.ends_with("sh")
        || lower.ends_with("ch")
        || lower.ends_with('x')
        || lower.ends_with('z')
    {
        return format!("{}es", word);
    }
    if lower.ends_with('s') {
        return word.to_string();
    }
    if lower.ends_with('y') && word.len() > 1 {
        let before = lower.as_bytes()[lower.len() - 2];
        if !matches!(before, b'a' | b'e' | b'i' | b'o' | b'u') {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{}s", word)
}

/// 模型名转表名：`UserGroup` -> `user_groups`
pub fn tableize(model: &str) -> String {
    pluralize(&underscore(model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_and_camelize() {
        assert_eq!(underscore("UserGroup"), "user_group");
        assert_eq!(underscore("Author"), "author");
        assert_eq!(camelize("author_id"), "AuthorId");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Post"), "Posts");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("users"), "users");
    }

    #[test]
    fn test_tableize() {
        assert_eq!(tableize("User"), "users");
        assert_eq!(tableize("UserGroup"), "user_groups");
        assert_eq!(tableize("Category"), "categories");
    }
}
