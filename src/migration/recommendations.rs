use crate::analyzer::{AnalyzedFile, FileType, IssueKind, MigrationIssue, Severity};
use crate::migration::types::ReportSummary;

const JAVA_BACKENDS: &[&str] = &["Java (Maven)", "Java (Gradle)"];

fn count_files(files: &[AnalyzedFile], pred: impl Fn(&AnalyzedFile) -> bool) -> usize {
    files.iter().filter(|f| pred(f)).count()
}

fn is_legacy_directive(text: &str) -> bool {
    text.starts_with("*ng") || text.starts_with("[ngSwitch]")
}

fn is_java_backend(label: &str) -> bool {
    JAVA_BACKENDS.contains(&label)
}

/// Java 백엔드가 있으면 매니페스트에 연동 확인 이슈(info)를 붙인다
pub fn attach_backend_notes(files: Vec<AnalyzedFile>, backends: &[String]) -> Vec<AnalyzedFile> {
    let Some(label) = backends.iter().find(|b| is_java_backend(b)) else {
        return files;
    };

    files
        .into_iter()
        .map(|file| {
            if file.file_type() != FileType::DependencyManifest {
                return file;
            }
            file.with_issues(vec![MigrationIssue {
                kind: IssueKind::BackendIntegrationNote,
                severity: Severity::Info,
                message: format!("{label} 백엔드와 함께 빌드되는 프로젝트입니다"),
                suggestion: "outputPath와 개발 서버 프록시 설정이 백엔드 빌드와 맞는지 확인하세요".to_string(),
                line_number: None,
                matched_text: label.clone(),
            }])
        })
        .collect()
}

/// 파일 전체에 걸친 패턴으로 권장 사항을 만든다
pub fn generate(files: &[AnalyzedFile], summary: &ReportSummary, backends: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let manifest_mismatch = files.iter().any(|f| {
        f.file_type() == FileType::DependencyManifest
            && f.issues.iter().any(|i| {
                i.kind == IssueKind::VersionIncompatibility && i.severity == Severity::Error
            })
    });
    if manifest_mismatch {
        recommendations.push(
            "package.json의 Angular 버전이 목표와 다릅니다. 코드 변환 전에 ng update @angular/core @angular/cli로 버전부터 올리세요"
                .to_string(),
        );
    }

    let modules = count_files(files, |f| f.file_type() == FileType::ModuleDescriptor);
    if modules > 0 {
        recommendations.push(format!(
            "NgModule 래퍼가 {}개 파일에서 발견되었습니다. standalone 컴포넌트 구조로 전환하고 bootstrapApplication을 사용하세요",
            modules
        ));
    }

    let templates = count_files(files, |f| {
        f.file_type() == FileType::Template && f.issues.iter().any(|i| is_legacy_directive(&i.matched_text))
    });
    if templates > 0 {
        recommendations.push(format!(
            "{}개 템플릿에 구조 디렉티브(*ngIf, *ngFor, ngSwitch)가 남아 있습니다. 모든 템플릿을 @if/@for/@switch 블록으로 옮기세요",
            templates
        ));
    }

    let injections = count_files(files, |f| {
        f.issues.iter().any(|i| i.matched_text.starts_with("constructor"))
    });
    if injections > 0 {
        recommendations.push(format!(
            "{}개 파일이 생성자 주입을 사용합니다. inject() 함수로 통일하면 상속과 테스트가 단순해집니다",
            injections
        ));
    }

    let untyped = count_files(files, |f| f.issues.iter().any(|i| i.kind == IssueKind::UntypedConstruct));
    if untyped > 0 {
        recommendations.push(format!(
            "{}개 파일에 타입 없는 폼이 있습니다. FormGroup<T>로 폼 모델 타입을 명시하세요",
            untyped
        ));
    }

    if backends.iter().any(|b| is_java_backend(b)) {
        recommendations.push(
            "Java 백엔드가 감지되었습니다. 빌드 산출물 경로(outputPath)와 프록시 설정이 새 빌더(application)와 맞는지 확인하세요"
                .to_string(),
        );
    }

    let errors = summary.count(Severity::Error);
    if errors > 0 {
        recommendations.push(format!(
            "error 등급 이슈 {}건은 빌드를 깨뜨릴 수 있으니 가장 먼저 해결하세요",
            errors
        ));
    }

    if summary.failed_transformations > 0 {
        recommendations.push(format!(
            "쓰기에 실패한 변환이 {}건 있습니다. 파일 권한을 확인한 뒤 다시 실행하세요",
            summary.failed_transformations
        ));
    }

    if recommendations.is_empty() {
        recommendations.push("추가 조치가 필요하지 않습니다. 프로젝트가 최신 문법을 사용하고 있습니다".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind, severity: Severity, matched: &str) -> MigrationIssue {
        MigrationIssue {
            kind,
            severity,
            message: String::new(),
            suggestion: String::new(),
            line_number: Some(1),
            matched_text: matched.to_string(),
        }
    }

    #[test]
    fn test_clean_project_gets_single_note() {
        let files = vec![AnalyzedFile::new("src/styles.css", "body {}")];
        let summary = ReportSummary::from_files(&files);
        let recs = generate(&files, &summary, &[]);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("추가 조치가 필요하지 않습니다"));
    }

    #[test]
    fn test_cross_file_patterns() {
        let files = vec![
            AnalyzedFile::new("src/app/app.module.ts", "@NgModule({})"),
            AnalyzedFile::new("src/app/a.component.html", "<p *ngIf=\"x\"></p>").with_issues(vec![issue(
                IssueKind::DeprecatedApi,
                Severity::Suggestion,
                "*ngIf=\"x\"",
            )]),
            AnalyzedFile::new("package.json", "{}").with_issues(vec![issue(
                IssueKind::VersionIncompatibility,
                Severity::Error,
                "\"@angular/core\": \"5.2.0\"",
            )]),
        ];
        let summary = ReportSummary::from_files(&files);
        let recs = generate(&files, &summary, &["Java (Maven)".to_string()]);

        assert!(recs[0].contains("ng update"));
        assert!(recs.iter().any(|r| r.contains("NgModule 래퍼가 1개")));
        assert!(recs.iter().any(|r| r.contains("1개 템플릿")));
        assert!(recs.iter().any(|r| r.contains("Java 백엔드")));
        assert!(recs.iter().any(|r| r.contains("error 등급 이슈 1건")));
    }

    #[test]
    fn test_java_backend_note_lands_on_manifest() {
        let files = vec![
            AnalyzedFile::new("package.json", "{}"),
            AnalyzedFile::new("src/styles.css", "body {}"),
        ];

        let untouched = attach_backend_notes(files.clone(), &["Go".to_string()]);
        assert!(untouched.iter().all(|f| f.issues.is_empty()));

        let noted = attach_backend_notes(files, &["Java (Gradle)".to_string()]);
        let manifest = &noted[0];
        assert_eq!(manifest.issues.len(), 1);
        assert_eq!(manifest.issues[0].kind, IssueKind::BackendIntegrationNote);
        assert_eq!(manifest.issues[0].severity, Severity::Info);
        assert_eq!(manifest.issues[0].matched_text, "Java (Gradle)");
        assert!(noted[1].issues.is_empty());
    }
}
