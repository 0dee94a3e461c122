// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 页面提取快照
///
/// 由提取引擎在单次分析运行开始时生成，之后不可变。
/// 所有支柱分析器共享同一份快照。截图以base64编码的JPEG存储。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedData {
    /// 目标URL
    pub url: String,
    /// 页面原始HTML
    pub html: String,
    /// 页面标题
    pub title: Option<String>,
    /// meta描述
    pub description: Option<String>,
    /// canonical链接
    pub canonical: Option<String>,
    /// 页面语言
    pub lang: Option<String>,
    /// 字符集
    pub charset: Option<String>,
    /// meta标签集合（name/property -> content）
    pub meta_tags: Vec<MetaTag>,
    /// 标题层级列表
    pub headings: Vec<Heading>,
    /// 图片列表（已解析为绝对URL，排除data URI）
    pub images: Vec<ImageInfo>,
    /// 链接列表
    pub links: Vec<LinkInfo>,
    /// 外部脚本URL列表
    pub scripts: Vec<String>,
    /// 外部样式表URL列表
    pub stylesheets: Vec<String>,
    /// Cookie列表
    pub cookies: Vec<CookieInfo>,
    /// 性能计时
    pub timings: PerformanceTimings,
    /// 视口尺寸
    pub viewport: Viewport,
    /// 整页截图（base64编码JPEG）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// meta标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaTag {
    /// name或property属性值
    pub name: String,
    /// content属性值
    pub content: String,
}

/// 标题元素
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    /// 层级（1-6）
    pub level: u8,
    /// 文本内容
    pub text: String,
    /// id属性
    pub id: Option<String>,
}

/// 图片信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    /// 绝对URL
    pub src: String,
    /// alt文本
    pub alt: Option<String>,
    /// 自然宽度（像素）
    pub width: u32,
    /// 自然高度（像素）
    pub height: u32,
}

/// 链接信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkInfo {
    /// 绝对URL
    pub href: String,
    /// 锚文本
    pub text: String,
    /// 是否站内链接（同源或相对路径）
    pub internal: bool,
}

/// Cookie信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieInfo {
    /// Cookie名称
    pub name: String,
    /// 所属域
    pub domain: String,
    /// 是否Secure
    pub secure: bool,
    /// 是否HttpOnly
    pub http_only: bool,
}

/// 性能计时
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerformanceTimings {
    /// 总加载时间（从导航开始到提取结束的墙钟时间，毫秒）
    pub load_time_ms: u64,
    /// DOM就绪时间（毫秒）
    pub dom_ready_ms: u64,
    /// 首次内容绘制（毫秒，尽力采集，默认0）
    pub first_contentful_paint_ms: u64,
}

/// 视口尺寸
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ExtractedData {
    /// 生成用于持久化的精简快照（不含HTML正文与截图）
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url,
            "title": self.title,
            "description": self.description,
            "lang": self.lang,
            "heading_count": self.headings.len(),
            "image_count": self.images.len(),
            "link_count": self.links.len(),
            "script_count": self.scripts.len(),
            "stylesheet_count": self.stylesheets.len(),
            "cookie_count": self.cookies.len(),
            "timings": self.timings,
        })
    }
}
