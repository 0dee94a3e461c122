// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 分析器模块
///
/// 实现七个独立的评分支柱分析器以及视觉分析适配器
pub mod analyzers;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现基于无头浏览器的页面数据提取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、邮件发送等
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和中间件
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现分析流水线的后台编排
pub mod workers;
