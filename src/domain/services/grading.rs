// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::grade::Grade;

/// 将0-100的得分映射为字母等级
///
/// 阈值为97/93/90/87/83/80/77/73/70/67/60，非均匀分布，
/// 模拟学术评分而非线性分段。支柱级别的映射从不返回A+。
pub fn score_to_grade(score: u32) -> Grade {
    match score {
        97..=u32::MAX => Grade::A,
        93..=96 => Grade::AMinus,
        90..=92 => Grade::BPlus,
        87..=89 => Grade::B,
        83..=86 => Grade::BMinus,
        80..=82 => Grade::CPlus,
        77..=79 => Grade::C,
        73..=76 => Grade::CMinus,
        70..=72 => Grade::DPlus,
        67..=69 => Grade::D,
        60..=66 => Grade::DMinus,
        _ => Grade::F,
    }
}

/// 聚合多个支柱得分为一个整体等级
///
/// 各得分先映射为等级再取整数值求平均，平均值经第二张固定
/// 阈值表映射回等级。特例：当所有单项等级恰好都是A时返回A+。
/// 空输入返回F。纯函数，输入顺序无关。
pub fn overall_grade(scores: &[u32]) -> Grade {
    if scores.is_empty() {
        return Grade::F;
    }

    let grades: Vec<Grade> = scores.iter().map(|s| score_to_grade(*s)).collect();

    if grades.iter().all(|g| *g == Grade::A) {
        return Grade::APlus;
    }

    let sum: u32 = grades.iter().map(|g| g.value() as u32).sum();
    let average = sum as f64 / grades.len() as f64;

    value_to_grade(average)
}

/// 平均等级值映射回等级的第二张阈值表（半点分段）
fn value_to_grade(average: f64) -> Grade {
    if average >= 11.5 {
        Grade::A
    } else if average >= 10.5 {
        Grade::AMinus
    } else if average >= 9.5 {
        Grade::BPlus
    } else if average >= 8.5 {
        Grade::B
    } else if average >= 7.5 {
        Grade::BMinus
    } else if average >= 6.5 {
        Grade::CPlus
    } else if average >= 5.5 {
        Grade::C
    } else if average >= 4.5 {
        Grade::CMinus
    } else if average >= 3.5 {
        Grade::DPlus
    } else if average >= 2.5 {
        Grade::D
    } else if average >= 1.5 {
        Grade::DMinus
    } else {
        Grade::F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(score_to_grade(100), Grade::A);
        assert_eq!(score_to_grade(97), Grade::A);
        assert_eq!(score_to_grade(96), Grade::AMinus);
        assert_eq!(score_to_grade(93), Grade::AMinus);
        assert_eq!(score_to_grade(92), Grade::BPlus);
        assert_eq!(score_to_grade(90), Grade::BPlus);
        assert_eq!(score_to_grade(89), Grade::B);
        assert_eq!(score_to_grade(87), Grade::B);
        assert_eq!(score_to_grade(86), Grade::BMinus);
        assert_eq!(score_to_grade(83), Grade::BMinus);
        assert_eq!(score_to_grade(82), Grade::CPlus);
        assert_eq!(score_to_grade(80), Grade::CPlus);
        assert_eq!(score_to_grade(79), Grade::C);
        assert_eq!(score_to_grade(77), Grade::C);
        assert_eq!(score_to_grade(76), Grade::CMinus);
        assert_eq!(score_to_grade(73), Grade::CMinus);
        assert_eq!(score_to_grade(72), Grade::DPlus);
        assert_eq!(score_to_grade(70), Grade::DPlus);
        assert_eq!(score_to_grade(69), Grade::D);
        assert_eq!(score_to_grade(67), Grade::D);
        assert_eq!(score_to_grade(66), Grade::DMinus);
        assert_eq!(score_to_grade(60), Grade::DMinus);
        assert_eq!(score_to_grade(59), Grade::F);
        assert_eq!(score_to_grade(0), Grade::F);
    }

    #[test]
    fn test_grade_is_monotonic_and_total() {
        let mut previous = score_to_grade(0);
        for score in 1..=100 {
            let current = score_to_grade(score);
            assert!(
                current >= previous,
                "grade decreased at score {}: {} -> {}",
                score,
                previous,
                current
            );
            previous = current;
        }
    }

    #[test]
    fn test_all_a_yields_a_plus() {
        let scores = vec![100; 7];
        assert_eq!(overall_grade(&scores), Grade::APlus);

        // 97 is the lower A boundary
        let scores = vec![97, 98, 99, 100, 97, 97, 100];
        assert_eq!(overall_grade(&scores), Grade::APlus);
    }

    #[test]
    fn test_one_non_a_breaks_a_plus() {
        let scores = vec![100, 100, 100, 100, 100, 100, 96];
        let grade = overall_grade(&scores);
        assert_ne!(grade, Grade::APlus);
        assert_eq!(grade, Grade::A); // average (6*12 + 11) / 7 = 11.857
    }

    #[test]
    fn test_empty_input_yields_f() {
        assert_eq!(overall_grade(&[]), Grade::F);
    }

    #[test]
    fn test_order_independence() {
        let scores = vec![95, 42, 77, 100, 60, 88, 71];
        let mut permuted = scores.clone();
        permuted.reverse();
        assert_eq!(overall_grade(&scores), overall_grade(&permuted));

        let rotated: Vec<u32> = scores[3..].iter().chain(scores[..3].iter()).copied().collect();
        assert_eq!(overall_grade(&scores), overall_grade(&rotated));
    }

    #[test]
    fn test_idempotence() {
        let scores = vec![80, 65, 92];
        assert_eq!(overall_grade(&scores), overall_grade(&scores));
    }

    #[test]
    fn test_all_failing_scores() {
        assert_eq!(overall_grade(&[0, 0, 0]), Grade::F);
    }
}
