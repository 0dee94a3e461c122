// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// 验证错误类型
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// URL无效
    #[error("Invalid URL")]
    InvalidUrl,
    /// 邮箱格式无效
    #[error("Invalid email address")]
    InvalidEmail,
    /// 一次性邮箱域名
    #[error("Disposable email addresses are not accepted")]
    DisposableEmail,
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// 已知一次性邮箱域名模式
const DISPOSABLE_DOMAINS: [&str; 10] = [
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "throwaway.email",
    "yopmail.com",
    "getnada.com",
    "trashmail.com",
    "sharklasers.com",
];

/// 验证目标URL
///
/// 只做语法与协议检查；规范化由 `url_utils::normalize_url` 负责。
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    let parsed = Url::parse(&candidate).map_err(|_| ValidationError::InvalidUrl)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl);
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(())
}

/// 验证提交者邮箱
///
/// # 返回值
///
/// * `Ok(String)` - 小写化后的邮箱地址
/// * `Err(ValidationError)` - 格式无效或属于一次性邮箱域名
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let normalized = email.trim().to_lowercase();

    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail);
    }

    let domain = normalized
        .rsplit('@')
        .next()
        .ok_or(ValidationError::InvalidEmail)?;

    if DISPOSABLE_DOMAINS.iter().any(|d| domain == *d) {
        return Err(ValidationError::DisposableEmail);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("example.com").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert_eq!(
            validate_url("ftp://example.com"),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(validate_url("not a url"), Err(ValidationError::InvalidUrl));
    }

    #[test]
    fn test_validate_email_lowercases() {
        assert_eq!(
            validate_email("User@Example.COM").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_validate_email_rejects_bad_format() {
        assert_eq!(
            validate_email("not-an-email"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(validate_email("a@b"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_validate_email_rejects_disposable_domains() {
        assert_eq!(
            validate_email("someone@mailinator.com"),
            Err(ValidationError::DisposableEmail)
        );
    }
}
