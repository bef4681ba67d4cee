use termimad::crossterm::style::Color as CrosstermColor;
use termimad::*;
use crate::analyzer::Severity;
use crate::migration::ProjectReport;

/// 보고서를 Markdown 문서로 만든다
pub fn to_markdown(report: &ProjectReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;
    let meta = &report.metadata;

    output.push_str("# Angular 마이그레이션 보고서\n\n");
    output.push_str(&format!("- 프로젝트: `{}`\n", meta.project_path));
    output.push_str(&format!("- 모드: {}\n", meta.mode));
    output.push_str(&format!("- 생성일: {}\n", meta.generated_at.format("%Y-%m-%d %H:%M")));
    output.push_str(&format!("- 소요 시간: {}\n", meta.elapsed));
    if !meta.backends.is_empty() {
        output.push_str(&format!("- 감지된 백엔드: {}\n", meta.backends.join(", ")));
    }
    output.push('\n');

    // 요약
    output.push_str("## 요약\n\n");
    output.push_str("| 항목 | 값 |\n|---|---|\n");
    output.push_str(&format!("| 전체 파일 | {} |\n", summary.total_files));
    output.push_str(&format!("| 변환된 파일 | {} |\n", summary.modified_files));
    output.push_str(&format!("| 전체 이슈 | {} |\n", summary.total_issues));
    for severity in Severity::ALL {
        output.push_str(&format!("| └ {} | {} |\n", severity, summary.count(severity)));
    }
    output.push_str(&format!("| 적용된 변환 | {} |\n", summary.applied_transformations));
    output.push_str(&format!("| 대기 중인 변환 | {} |\n", summary.pending_transformations));
    output.push_str(&format!("| 건너뛴 변환 | {} |\n", summary.skipped_transformations));
    output.push_str(&format!("| 실패한 변환 | {} |\n", summary.failed_transformations));
    output.push('\n');

    if !report.recommendations.is_empty() {
        output.push_str("## 권장 사항\n\n");
        for rec in &report.recommendations {
            output.push_str(&format!("- {}\n", rec));
        }
        output.push('\n');
    }

    let files: Vec<_> = report
        .file_details
        .iter()
        .filter(|f| !f.issues.is_empty() || !f.transformations.is_empty())
        .collect();
    if !files.is_empty() {
        output.push_str("## 파일별 상세\n\n");
    }

    for file in files {
        output.push_str(&format!("### {} ({})\n\n", file.path, file.file_type()));

        if !file.issues.is_empty() {
            output.push_str("**이슈**:\n\n");
            for issue in &file.issues {
                let line = issue
                    .line_number
                    .map(|n| format!("L{}", n))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "- [{}] {} `{}` {}\n",
                    issue.severity, line, issue.kind, issue.message
                ));
                output.push_str(&format!("  - 제안: {}\n", issue.suggestion));
            }
            output.push('\n');
        }

        if !file.transformations.is_empty() {
            output.push_str("**변환**:\n\n");
            for record in &file.transformations {
                output.push_str(&format!("- `{}` {} ({})\n", record.kind, record.description, record.status));
            }
            output.push('\n');
        }
    }

    output
}

/// 터미널에서 Markdown을 보기 좋게 출력한다
pub struct MarkdownRenderer {
    skin: MadSkin,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(CrosstermColor::Cyan);
        skin.bold.set_fg(CrosstermColor::White);
        skin.inline_code.set_fg(CrosstermColor::Yellow);
        skin.bullet = StyledChar::from_fg_char(CrosstermColor::Green, '•');
        Self { skin }
    }

    pub fn render_markdown(&self, markdown: &str) {
        self.skin.print_text(markdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::fixtures;

    #[test]
    fn test_markdown_sections() {
        let md = to_markdown(&fixtures::report());

        assert!(md.starts_with("# Angular 마이그레이션 보고서"));
        assert!(md.contains("| 전체 파일 | 2 |"));
        assert!(md.contains("## 권장 사항"));
        assert!(md.contains("### src/app/a.component.html (template)"));
        assert!(md.contains("[suggestion] L1 `deprecated-api`"));
        assert!(md.contains("(pending)"));
        // 이슈도 변환도 없는 파일은 상세에서 빠진다
        assert!(!md.contains("src/styles.css"));
    }
}
