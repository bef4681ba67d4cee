use std::fs;
use std::path::Path;
use std::sync::Arc;
use ng_migrator::config::{EngineSettings, ManifestSettings};
use ng_migrator::logging::MemoryLogger;
use ng_migrator::renderer::{self, ReportFormat};
use ng_migrator::writer::{FileModifier, SafeFileModifier};
use ng_migrator::{
    MigrationCoordinator, MigrationError, MigrationMode, MigrationOptions, ProjectReport, Severity,
    TransformationStatus,
};
use tempfile::TempDir;

const COMPONENT: &str = "import { Component } from '@angular/core';

@Component({
  selector: 'app-a',
  templateUrl: './a.component.html'
})
export class AComponent {
  constructor(private svc: MyService) {}
}
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn shop_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "package.json",
        "{\n  \"name\": \"shop\",\n  \"dependencies\": {\n    \"@angular/core\": \"5.2.0\",\n    \"rxjs\": \"5.5.0\"\n  }\n}\n",
    );
    write(root, "src/app/a.component.ts", COMPONENT);
    write(root, "src/app/legacy/b.component.ts", &COMPONENT.replace("AComponent", "BComponent"));
    write(root, "src/app/a.component.html", "<p *ngIf=\"ready\">hi</p>\n");
    write(root, "src/styles.css", "body { margin: 0; }\n");
    dir
}

fn engine() -> EngineSettings {
    EngineSettings { concurrency: 2, batch_delay_ms: 0 }
}

fn coordinator(options: MigrationOptions) -> MigrationCoordinator {
    MigrationCoordinator::new(options, engine(), ManifestSettings::default())
}

fn file<'a>(report: &'a ProjectReport, path: &str) -> &'a ng_migrator::AnalyzedFile {
    report
        .file_details
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("{path} 없음"))
}

#[tokio::test]
async fn empty_project_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/assets")).unwrap();
    fs::write(dir.path().join("src/assets/logo.svg"), "<svg/>").unwrap();

    let err = coordinator(MigrationOptions::new(MigrationMode::Analyze))
        .run(dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::NoMatchingFiles { .. }));
}

#[tokio::test]
async fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = coordinator(MigrationOptions::new(MigrationMode::Analyze))
        .run(&dir.path().join("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::ProjectNotFound { .. }));
}

#[tokio::test]
async fn excluded_file_is_detected_but_not_transformed() {
    let project = shop_project();
    let logger = Arc::new(MemoryLogger::new());
    let options = MigrationOptions {
        exclude: vec!["legacy".to_string()],
        ..MigrationOptions::new(MigrationMode::Migrate)
    };

    let report = coordinator(options)
        .with_writer(Arc::new(FileModifier::new(true).with_diff(false)))
        .with_logger(logger.clone())
        .run(project.path())
        .await
        .unwrap();

    let kept = file(&report, "src/app/a.component.ts");
    let excluded = file(&report, "src/app/legacy/b.component.ts");

    assert!(!kept.transformations.is_empty());
    assert!(kept.transformations.iter().all(|t| t.status == TransformationStatus::Applied));
    assert!(excluded.transformations.is_empty());
    assert!(!excluded.issues.is_empty());
    assert_eq!(excluded.issues.len(), kept.issues.len());

    let written = fs::read_to_string(project.path().join("src/app/a.component.ts")).unwrap();
    assert!(written.contains("private svc = inject(MyService);"));
    assert!(!written.contains("constructor("));
    let untouched = fs::read_to_string(project.path().join("src/app/legacy/b.component.ts")).unwrap();
    assert_eq!(untouched, COMPONENT.replace("AComponent", "BComponent"));

    let skipped: Vec<_> = logger
        .records()
        .into_iter()
        .filter(|r| r.message == "transform-skipped")
        .filter_map(|r| r.path)
        .collect();
    assert_eq!(skipped, vec!["src/app/legacy/b.component.ts"]);
}

#[tokio::test]
async fn dry_run_leaves_disk_untouched() {
    let project = shop_project();

    let report = coordinator(MigrationOptions::new(MigrationMode::DryRun))
        .run(project.path())
        .await
        .unwrap();

    assert!(report.summary.pending_transformations > 0);
    assert_eq!(report.summary.applied_transformations, 0);
    let template = file(&report, "src/app/a.component.html");
    assert!(template.content.contains("@if (ready) {"));
    assert_eq!(
        fs::read_to_string(project.path().join("src/app/a.component.html")).unwrap(),
        "<p *ngIf=\"ready\">hi</p>\n"
    );
}

#[tokio::test]
async fn summary_matches_file_details() {
    let project = shop_project();

    let report = coordinator(MigrationOptions::new(MigrationMode::DryRun))
        .run(project.path())
        .await
        .unwrap();
    let summary = &report.summary;

    assert_eq!(summary.total_files, 5);
    assert_eq!(summary.total_files, report.file_details.len());
    assert_eq!(
        summary.total_issues,
        report.file_details.iter().map(|f| f.issues.len()).sum::<usize>()
    );
    assert_eq!(summary.issues_by_severity.values().sum::<usize>(), summary.total_issues);
    assert_eq!(
        summary.modified_files,
        report.file_details.iter().filter(|f| !f.transformations.is_empty()).count()
    );
    assert_eq!(
        summary.total_transformations(),
        report.file_details.iter().map(|f| f.transformations.len()).sum::<usize>()
    );
    // 매니페스트의 코어 버전 불일치는 error 등급이다
    assert!(summary.count(Severity::Error) >= 1);
    assert!(!report.recommendations.is_empty());
}

#[tokio::test]
async fn manifest_round_trip_keeps_order_and_newline() {
    let project = shop_project();

    coordinator(MigrationOptions::new(MigrationMode::Migrate))
        .with_writer(Arc::new(FileModifier::new(true).with_diff(false)))
        .run(project.path())
        .await
        .unwrap();

    let manifest = fs::read_to_string(project.path().join("package.json")).unwrap();
    assert!(manifest.ends_with("}\n"));
    let doc: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let deps: Vec<_> = doc["dependencies"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(deps, vec!["@angular/core", "rxjs"]);
    assert_eq!(doc["dependencies"]["@angular/core"], "^20.0.0");
    assert_eq!(doc["dependencies"]["rxjs"], "~7.8.0");
    assert_eq!(doc["name"], "shop");
}

#[tokio::test]
async fn second_migration_changes_nothing() {
    let project = shop_project();
    let run = || {
        coordinator(MigrationOptions::new(MigrationMode::Migrate))
            .with_writer(Arc::new(FileModifier::new(true).with_diff(false)))
    };

    let first = run().run(project.path()).await.unwrap();
    assert!(first.summary.modified_files > 0);

    let second = run().run(project.path()).await.unwrap();
    assert_eq!(second.summary.modified_files, 0);
    assert!(second
        .file_details
        .iter()
        .flat_map(|f| f.transformations.iter())
        .all(|t| !t.changes_content()));
}

#[tokio::test]
async fn backup_keeps_original_content() {
    let project = shop_project();
    let backups = tempfile::tempdir().unwrap();
    let writer = SafeFileModifier::new(FileModifier::new(true).with_diff(false), backups.path());
    let backup_root = writer.backup_root().to_path_buf();

    coordinator(MigrationOptions::new(MigrationMode::Migrate))
        .with_writer(Arc::new(writer))
        .run(project.path())
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(backup_root.join("src/app/a.component.ts")).unwrap(),
        COMPONENT
    );
    assert_eq!(
        fs::read_to_string(backup_root.join("src/app/a.component.html")).unwrap(),
        "<p *ngIf=\"ready\">hi</p>\n"
    );
    // 바뀌지 않은 파일은 백업하지 않는다
    assert!(!backup_root.join("src/styles.css").exists());
}

#[tokio::test]
async fn reports_are_written_in_every_format() {
    let project = shop_project();
    let report = coordinator(MigrationOptions::new(MigrationMode::Analyze))
        .run(project.path())
        .await
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    for format in ReportFormat::ALL {
        let path = renderer::write_report(&report, format, out.path()).unwrap();
        assert_eq!(path.extension().unwrap(), format.extension());
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("a.component.ts"), "{format} 보고서에 파일 경로가 없음");
    }
}
