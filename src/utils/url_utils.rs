// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 规范化提交的目标URL
///
/// 强制https协议、去掉www.前缀与路径末尾的斜杠。
/// 输入缺少协议时默认按https解析。
pub fn normalize_url(input: &str) -> Result<String, ParseError> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let mut parsed = Url::parse(&candidate)?;

    if parsed.scheme() == "http" {
        // set_scheme only fails for incompatible scheme pairs
        let _ = parsed.set_scheme("https");
    }

    if let Some(host) = parsed.host_str() {
        if let Some(stripped) = host.strip_prefix("www.") {
            let stripped = stripped.to_string();
            parsed
                .set_host(Some(&stripped))
                .map_err(|_| ParseError::EmptyHost)?;
        }
    }

    let mut normalized = parsed.to_string();
    if normalized.ends_with('/') && parsed.query().is_none() && parsed.fragment().is_none() {
        normalized.pop();
    }

    Ok(normalized)
}

/// 判断链接是否站内链接（同源或相对路径）
pub fn is_internal_link(base: &Url, href: &str) -> bool {
    if href.starts_with('/') && !href.starts_with("//") {
        return true;
    }
    match resolve_url(base, href) {
        Ok(resolved) => resolved.host_str() == base.host_str(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "http://t.co/c").unwrap().as_str(),
            "http://t.co/c"
        );
    }

    #[test]
    fn test_resolve_root_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "/c").unwrap().as_str(),
            "http://example.com/c"
        );
    }

    #[test]
    fn test_normalize_forces_https() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_normalize_strips_www_and_trailing_slash() {
        assert_eq!(
            normalize_url("https://www.example.com/").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_normalize_bare_domain() {
        assert_eq!(
            normalize_url("example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_normalize_strips_path_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/pricing/").unwrap(),
            "https://example.com/pricing"
        );
    }

    #[test]
    fn test_internal_link_classification() {
        let base = Url::parse("https://example.com/a").unwrap();
        assert!(is_internal_link(&base, "/contact"));
        assert!(is_internal_link(&base, "https://example.com/about"));
        assert!(!is_internal_link(&base, "https://other.com/about"));
    }
}
