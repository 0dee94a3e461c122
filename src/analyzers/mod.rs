// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 支柱分析器集合
//!
//! 七个分析器共享同一契约：消费提取快照（及可选的视觉子结果），
//! 返回规范化的 `PillarResult`。分析器内部的依赖失败被就地转换为
//! `{analyzed:false, score:0, error}` 软失败，从不抛给编排器；
//! 单个支柱的降级不会阻塞其余支柱。

pub mod analytics;
pub mod compliance;
pub mod design;
pub mod performance;
pub mod responsiveness;
pub mod security;
pub mod seo;
pub mod vision;

/// 将累计扣分应用到100分基线，钳制在0
pub(crate) fn apply_penalties(penalties: u32) -> u32 {
    100u32.saturating_sub(penalties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_penalties_clamps_at_zero() {
        assert_eq!(apply_penalties(0), 100);
        assert_eq!(apply_penalties(35), 65);
        assert_eq!(apply_penalties(100), 0);
        assert_eq!(apply_penalties(250), 0);
    }
}
