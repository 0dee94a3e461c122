// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::grade::Grade;
use crate::domain::models::pillar::PillarResult;
use crate::domain::services::grading::{overall_grade, score_to_grade};
use crate::domain::services::notification::EmailMessage;

/// 渲染分析完成报告邮件
///
/// 包含整体等级、各支柱等级表以及按支柱分组的建议摘要。
/// 只有 analyzed=true 的支柱参与整体等级计算。
pub fn render_completion_report(url: &str, results: &[PillarResult]) -> EmailMessage {
    let scores: Vec<u32> = results
        .iter()
        .filter(|r| r.analyzed)
        .map(|r| r.score)
        .collect();
    let overall = overall_grade(&scores);

    let mut html_rows = String::new();
    let mut text_rows = String::new();
    for result in results {
        let grade_label = if result.analyzed {
            score_to_grade(result.score).to_string()
        } else {
            "n/a".to_string()
        };
        html_rows.push_str(&format!(
            "<tr><td style=\"padding:6px 12px\">{}</td>\
             <td style=\"padding:6px 12px;text-align:center\">{}</td>\
             <td style=\"padding:6px 12px;text-align:center\">{}</td></tr>",
            result.pillar,
            if result.analyzed {
                result.score.to_string()
            } else {
                "-".to_string()
            },
            grade_label
        ));
        text_rows.push_str(&format!(
            "  {:<16} {:>5}  {}\n",
            result.pillar.to_string(),
            if result.analyzed {
                result.score.to_string()
            } else {
                "-".to_string()
            },
            grade_label
        ));
    }

    let digest = recommendation_digest(results);
    let mut html_digest = String::new();
    let mut text_digest = String::new();
    for (pillar, recommendations) in &digest {
        html_digest.push_str(&format!("<h3>{}</h3><ul>", pillar));
        text_digest.push_str(&format!("\n{}\n", pillar));
        for recommendation in recommendations {
            html_digest.push_str(&format!("<li>{}</li>", recommendation));
            text_digest.push_str(&format!("  - {}\n", recommendation));
        }
        html_digest.push_str("</ul>");
    }

    let html = format!(
        "<html><body style=\"font-family:sans-serif\">\
         <h1>Website audit report</h1>\
         <p>Audited site: <a href=\"{url}\">{url}</a></p>\
         <h2>Overall grade: {overall}</h2>\
         <table border=\"0\" cellspacing=\"0\">\
         <tr><th style=\"padding:6px 12px\">Pillar</th>\
         <th style=\"padding:6px 12px\">Score</th>\
         <th style=\"padding:6px 12px\">Grade</th></tr>\
         {html_rows}</table>\
         <h2>What's next</h2>{html_digest}\
         </body></html>",
        url = url,
        overall = overall,
        html_rows = html_rows,
        html_digest = html_digest
    );

    let text = format!(
        "Website audit report\n\nAudited site: {}\n\nOverall grade: {}\n\n{}\nWhat's next:\n{}",
        url, overall, text_rows, text_digest
    );

    EmailMessage {
        subject: format!("Your website audit is ready: grade {}", overall),
        html,
        text,
    }
}

/// 渲染分析失败通知邮件
pub fn render_failure_report(url: &str, error: &str) -> EmailMessage {
    let tips = [
        "Verify the URL is publicly reachable and not behind a login",
        "Check that the site does not block automated browsers",
        "Make sure the server responds within a reasonable time",
        "Try submitting again later if the site was temporarily down",
    ];

    let html_tips: String = tips
        .iter()
        .map(|t| format!("<li>{}</li>", t))
        .collect();
    let text_tips: String = tips.iter().map(|t| format!("  - {}\n", t)).collect();

    EmailMessage {
        subject: "Your website audit could not be completed".to_string(),
        html: format!(
            "<html><body style=\"font-family:sans-serif\">\
             <h1>Audit failed</h1>\
             <p>We could not complete the audit of <a href=\"{url}\">{url}</a>.</p>\
             <p>Reason: {error}</p>\
             <h2>Common fixes</h2><ul>{html_tips}</ul>\
             </body></html>",
            url = url,
            error = error,
            html_tips = html_tips
        ),
        text: format!(
            "Audit failed\n\nWe could not complete the audit of {}.\nReason: {}\n\nCommon fixes:\n{}",
            url, error, text_tips
        ),
    }
}

/// 按支柱分组的建议摘要，保留流水线顺序
fn recommendation_digest(results: &[PillarResult]) -> Vec<(String, Vec<String>)> {
    results
        .iter()
        .filter(|r| r.analyzed && !r.recommendations.is_empty())
        .map(|r| (r.pillar.to_string(), r.recommendations.clone()))
        .collect()
}
