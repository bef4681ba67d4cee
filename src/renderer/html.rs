use tera::{Context, Tera};
use crate::migration::ProjectReport;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>Angular 마이그레이션 보고서</title>
<style>
  body { font-family: -apple-system, "Segoe UI", sans-serif; margin: 2rem; color: #222; }
  h1 { color: #c3002f; }
  table { border-collapse: collapse; margin-bottom: 1.5rem; }
  th, td { border: 1px solid #ddd; padding: 0.4rem 0.8rem; text-align: left; }
  th { background: #f5f5f5; }
  .error { color: #c62828; } .warning { color: #ef6c00; }
  .info { color: #1565c0; } .suggestion { color: #2e7d32; }
  code { background: #f3f3f3; padding: 0 0.2rem; }
  details { margin-bottom: 1rem; }
</style>
</head>
<body>
<h1>Angular 마이그레이션 보고서</h1>
<p>
  프로젝트 <code>{{ metadata.project_path }}</code> &middot; 모드 {{ metadata.mode }} &middot;
  {{ generated }} &middot; 소요 {{ metadata.elapsed }}
  {% if metadata.backends | length > 0 %}&middot; 백엔드 {{ metadata.backends | join(sep=", ") }}{% endif %}
</p>

<h2>요약</h2>
<table>
  <tr><th>전체 파일</th><td>{{ summary.total_files }}</td></tr>
  <tr><th>변환된 파일</th><td>{{ summary.modified_files }}</td></tr>
  <tr><th>전체 이슈</th><td>{{ summary.total_issues }}</td></tr>
  {% for severity, count in summary.issues_by_severity %}
  <tr><th class="{{ severity }}">&nbsp;&nbsp;{{ severity }}</th><td>{{ count }}</td></tr>
  {% endfor %}
  <tr><th>적용 / 대기 / 건너뜀 / 실패</th>
      <td>{{ summary.applied_transformations }} / {{ summary.pending_transformations }} / {{ summary.skipped_transformations }} / {{ summary.failed_transformations }}</td></tr>
</table>

{% if recommendations | length > 0 %}
<h2>권장 사항</h2>
<ul>
{% for rec in recommendations %}  <li>{{ rec }}</li>
{% endfor %}</ul>
{% endif %}

<h2>파일별 상세</h2>
{% for file in file_details %}{% if file.issues | length > 0 or file.transformations | length > 0 %}
<details>
  <summary><code>{{ file.path }}</code> ({{ file.type }}) &middot; 이슈 {{ file.issues | length }} &middot; 변환 {{ file.transformations | length }}</summary>
  {% if file.issues | length > 0 %}
  <table>
    <tr><th>심각도</th><th>줄</th><th>종류</th><th>메시지</th><th>제안</th></tr>
    {% for issue in file.issues %}
    <tr>
      <td class="{{ issue.severity }}">{{ issue.severity }}</td>
      <td>{% if issue.line_number %}{{ issue.line_number }}{% else %}-{% endif %}</td>
      <td>{{ issue.kind }}</td>
      <td>{{ issue.message }}<br><code>{{ issue.matched_text }}</code></td>
      <td>{{ issue.suggestion }}</td>
    </tr>
    {% endfor %}
  </table>
  {% endif %}
  {% if file.transformations | length > 0 %}
  <ul>
    {% for record in file.transformations %}<li><code>{{ record.kind }}</code> {{ record.description }} ({{ record.status }})</li>
    {% endfor %}
  </ul>
  {% endif %}
</details>
{% endif %}{% endfor %}
</body>
</html>
"#;

/// tera 템플릿으로 HTML 보고서를 만든다 (자동 이스케이프)
pub fn to_html(report: &ProjectReport) -> Result<String, tera::Error> {
    let mut context = Context::from_serialize(report)?;
    context.insert(
        "generated",
        &report.metadata.generated_at.format("%Y-%m-%d %H:%M").to_string(),
    );
    Tera::one_off(REPORT_TEMPLATE, &context, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::fixtures;

    #[test]
    fn test_html_escapes_template_content() {
        let html = to_html(&fixtures::report()).unwrap();

        assert!(html.contains("<h1>Angular 마이그레이션 보고서</h1>"));
        assert!(html.contains("a.component.html"));
        assert!(html.contains("*ngIf=&quot;x&quot;"));
        assert!(html.contains("Java (Maven)"));
        assert!(!html.contains("styles.css"));
    }
}
