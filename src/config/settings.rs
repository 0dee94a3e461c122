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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、服务器、SMTP、外部API与提取引擎的所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// SMTP邮件配置
    pub smtp: SmtpSettings,
    /// 页面速度审计API配置
    pub pagespeed: PageSpeedSettings,
    /// 视觉分析API配置
    pub vision: VisionSettings,
    /// 提取引擎配置
    pub extraction: ExtractionSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// SMTP邮件配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP服务器主机
    pub host: String,
    /// SMTP端口
    pub port: u16,
    /// 用户名（可选，未配置时走无认证连接）
    pub username: Option<String>,
    /// 密码
    pub password: Option<String>,
    /// 发件人地址
    pub from: String,
}

/// 页面速度审计API配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PageSpeedSettings {
    /// API密钥（缺失时性能支柱回退到本地启发式评分）
    pub api_key: Option<String>,
    /// API基础URL
    pub base_url: String,
    /// 单次调用硬超时（秒）
    pub timeout_secs: u64,
}

/// 视觉分析API配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct VisionSettings {
    /// API密钥（缺失时视觉适配器直接返回降级结果）
    pub api_key: Option<String>,
    /// 使用的多模态模型名称
    pub model: String,
    /// API基础URL
    pub base_url: String,
}

/// 提取引擎配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    /// 首次导航等待超时（秒，domcontentloaded级别）
    pub nav_timeout_secs: u64,
    /// 重试导航等待超时（秒，load级别）
    pub nav_retry_timeout_secs: u64,
    /// 是否整页截图
    pub full_page_screenshot: bool,
    /// 远程Chrome调试地址（可选，未配置时本地启动）
    pub remote_debugging_url: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default SMTP settings
            .set_default("smtp.host", "localhost")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.from", "reports@sitegrade.local")?
            // Default PageSpeed settings
            .set_default(
                "pagespeed.base_url",
                "https://www.googleapis.com/pagespeedonline/v5/runPagespeed",
            )?
            .set_default("pagespeed.timeout_secs", 60)?
            // Default Vision settings
            .set_default("vision.model", "gpt-4o-mini")?
            .set_default("vision.base_url", "https://api.openai.com/v1")?
            // Default Extraction settings
            .set_default("extraction.nav_timeout_secs", 15)?
            .set_default("extraction.nav_retry_timeout_secs", 20)?
            .set_default("extraction.full_page_screenshot", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SITEGRADE").separator("__"));

        builder.build()?.try_deserialize()
    }
}
