use futures::stream::{self, StreamExt};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use crate::analyzer::{
    AnalyzedFile, BackendDetector, FileDiscovery, FileType, PatternDetector, SourceFile, WalkdirDiscovery,
};
use crate::config::{EngineSettings, ManifestSettings};
use crate::error::Result;
use crate::logging::{Component, LogLevel, LogRecord, SharedLogger, TracingLogger};
use crate::migration::recommendations;
use crate::migration::types::{MigrationMode, MigrationOptions, ProjectReport, ReportMetadata, ReportSummary};
use crate::transformer::{TransformationStatus, Transformer};
use crate::writer::{ChangeWriter, FileChange, WriteOutcome};

/// 파일 하나에 대한 분류 → 감지 → 변환. 워커 스레드에서 실행된다.
struct FilePipeline {
    options: MigrationOptions,
    detector: PatternDetector,
    transformer: Transformer,
    logger: SharedLogger,
}

impl FilePipeline {
    fn state(&self, path: &str, state: &str) {
        self.logger.log(
            LogRecord::new(LogLevel::Debug, Component::Coordinator, state).with_path(path),
        );
    }

    fn process(&self, source: SourceFile) -> AnalyzedFile {
        let file = AnalyzedFile::new(source.path, source.content);
        self.logger.log(
            LogRecord::new(LogLevel::Debug, Component::Classifier, "classified")
                .with_path(&file.path)
                .with_payload(json!({ "type": file.file_type().as_str() })),
        );

        let issues = match self.detector.detect(&file) {
            Ok(issues) => issues,
            Err(err) => {
                self.logger.log(
                    LogRecord::new(LogLevel::Warn, Component::Detector, format!("감지 실패: {err}"))
                        .with_path(&file.path),
                );
                Vec::new()
            }
        };
        let file = file.with_issues(issues);
        self.state(&file.path, "detected");

        if !self.options.mode.transforms() || !self.options.should_transform(&file.path) {
            self.state(&file.path, "transform-skipped");
            return file;
        }

        let outcome = self.transformer.transform(&file);
        let file = file.with_transformations(outcome.records);
        self.state(&file.path, "transformed");
        file
    }
}

/// 프로젝트 하나를 처리해 `ProjectReport`를 만든다
pub struct MigrationCoordinator {
    options: MigrationOptions,
    engine: EngineSettings,
    manifest: ManifestSettings,
    discovery: Arc<dyn FileDiscovery>,
    writer: Option<Arc<dyn ChangeWriter>>,
    backends: BackendDetector,
    logger: SharedLogger,
}

impl MigrationCoordinator {
    pub fn new(options: MigrationOptions, engine: EngineSettings, manifest: ManifestSettings) -> Self {
        Self {
            options,
            engine,
            manifest,
            discovery: Arc::new(WalkdirDiscovery),
            writer: None,
            backends: BackendDetector::default(),
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn FileDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn ChangeWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_backend_detector(mut self, backends: BackendDetector) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// 옵션 검증과 파일 탐색 실패는 치명적이다. 파일 단위 실패는 보고서에만 반영된다.
    pub async fn run(&self, project_path: &Path) -> Result<ProjectReport> {
        let started = Instant::now();
        self.options.validate()?;

        let sources = self.discovery.discover(project_path)?;
        self.logger.log(
            LogRecord::new(LogLevel::Info, Component::Discovery, "파일 탐색 완료")
                .with_path(project_path.display().to_string())
                .with_payload(json!({ "files": sources.len(), "mode": self.options.mode.as_str() })),
        );

        let files = self.run_files(sources).await;
        let files = self.write_back(project_path, files);

        let backends = self.backends.detect(project_path);
        let files = recommendations::attach_backend_notes(files, &backends);
        let summary = ReportSummary::from_files(&files);
        let recommendations = recommendations::generate(&files, &summary, &backends);
        let elapsed = started.elapsed();

        let report = ProjectReport {
            summary,
            file_details: files,
            recommendations,
            metadata: ReportMetadata {
                project_path: project_path.display().to_string(),
                mode: self.options.mode,
                generated_at: chrono::Local::now(),
                elapsed_ms: elapsed.as_millis() as u64,
                elapsed: humantime::format_duration(std::time::Duration::from_millis(elapsed.as_millis() as u64))
                    .to_string(),
                backends,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        self.logger.log(
            LogRecord::new(LogLevel::Info, Component::Coordinator, "마이그레이션 실행 완료").with_payload(json!({
                "files": report.summary.total_files,
                "issues": report.summary.total_issues,
                "modified": report.summary.modified_files,
            })),
        );
        Ok(report)
    }

    /// 이미 읽어 둔 파일 목록을 워커 풀에서 처리한다. 결과는 입력 순서를 따른다.
    pub async fn run_files(&self, sources: Vec<SourceFile>) -> Vec<AnalyzedFile> {
        let pipeline = Arc::new(FilePipeline {
            options: self.options.clone(),
            detector: PatternDetector::new(self.manifest.clone()),
            transformer: Transformer::new(self.manifest.clone(), self.logger.clone()),
            logger: self.logger.clone(),
        });
        let concurrency = self.engine.concurrency.max(1);

        stream::iter(sources.into_iter().map(|source| {
            let pipeline = pipeline.clone();
            let logger = self.logger.clone();
            async move {
                let fallback = source.clone();
                match tokio::task::spawn_blocking(move || pipeline.process(source)).await {
                    Ok(file) => file,
                    Err(err) => {
                        // 패닉한 파일은 이슈도 변환도 없이 보고서에 남긴다
                        logger.log(
                            LogRecord::new(LogLevel::Error, Component::Coordinator, format!("파일 처리 중 패닉: {err}"))
                                .with_path(&fallback.path),
                        );
                        AnalyzedFile::with_type(fallback.path, fallback.content, FileType::Other)
                    }
                }
            }
        }))
        .buffered(concurrency)
        .collect()
        .await
    }

    /// migrate 모드에서 바뀐 파일을 writer에 넘기고 레코드 상태를 갱신한다
    fn write_back(&self, project_path: &Path, files: Vec<AnalyzedFile>) -> Vec<AnalyzedFile> {
        if self.options.mode != MigrationMode::Migrate {
            return files;
        }
        let Some(writer) = &self.writer else {
            self.logger.warn(Component::Writer, "writer가 없어 변환 결과를 pending으로 남깁니다");
            return files;
        };

        files
            .into_iter()
            .map(|file| {
                if !file.is_modified() {
                    return file;
                }

                let change = FileChange {
                    path: project_path.join(&file.path),
                    relative_path: file.path.clone(),
                    original_content: file.original_content().to_string(),
                    new_content: file.content.clone(),
                    description: file
                        .transformations
                        .iter()
                        .filter(|t| t.changes_content())
                        .map(|t| t.description.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                };

                let (status, edited) = match writer.write(&change) {
                    Ok(WriteOutcome::Written) => (TransformationStatus::Applied, None),
                    Ok(WriteOutcome::Edited(content)) => (TransformationStatus::Applied, Some(content)),
                    Ok(WriteOutcome::Skipped) => (TransformationStatus::Skipped, None),
                    Err(err) => {
                        self.logger.log(
                            LogRecord::new(LogLevel::Warn, Component::Writer, format!("쓰기 실패: {err:#}"))
                                .with_path(&file.path),
                        );
                        (TransformationStatus::Failed, None)
                    }
                };
                self.logger.log(
                    LogRecord::new(LogLevel::Debug, Component::Writer, "reported")
                        .with_path(&file.path)
                        .with_payload(json!({ "status": status.to_string() })),
                );
                let file = file.with_transformation_status(status);
                match edited {
                    Some(content) => file.with_written_content(content),
                    None => file,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::logging::MemoryLogger;
    use std::sync::Mutex;

    struct StaticDiscovery(Vec<SourceFile>);

    impl FileDiscovery for StaticDiscovery {
        fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
            if self.0.is_empty() {
                return Err(MigrationError::NoMatchingFiles { path: root.to_path_buf() });
            }
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        written: Mutex<Vec<String>>,
        refuse: bool,
        edit_suffix: Option<&'static str>,
    }

    impl ChangeWriter for RecordingWriter {
        fn write(&self, change: &FileChange) -> anyhow::Result<WriteOutcome> {
            if self.refuse {
                return Ok(WriteOutcome::Skipped);
            }
            self.written.lock().unwrap().push(change.relative_path.clone());
            Ok(match self.edit_suffix {
                Some(suffix) => WriteOutcome::Edited(format!("{}{suffix}", change.new_content)),
                None => WriteOutcome::Written,
            })
        }
    }

    fn coordinator(mode: MigrationMode, files: Vec<SourceFile>) -> MigrationCoordinator {
        MigrationCoordinator::new(
            MigrationOptions::new(mode),
            EngineSettings { concurrency: 2, batch_delay_ms: 0 },
            ManifestSettings::default(),
        )
        .with_discovery(Arc::new(StaticDiscovery(files)))
        .with_backend_detector(BackendDetector::new(Vec::new()))
        .with_logger(Arc::new(MemoryLogger::new()))
    }

    fn fixture() -> Vec<SourceFile> {
        vec![
            SourceFile::new("package.json", r#"{"dependencies": {"@angular/core": "5.2.0"}}"#),
            SourceFile::new("src/app/a.component.ts", "@Component({ selector: 'a' })\nexport class A { constructor(private s: S) {} }"),
            SourceFile::new("src/app/a.component.html", "<p *ngIf=\"x\">x</p>"),
            SourceFile::new("src/app/app.module.ts", "@NgModule({})\nexport class AppModule {}"),
        ]
    }

    #[tokio::test]
    async fn test_analyze_mode_only_detects() {
        let report = coordinator(MigrationMode::Analyze, fixture())
            .run(Path::new("/project"))
            .await
            .unwrap();

        assert_eq!(report.summary.total_files, 4);
        assert_eq!(report.summary.modified_files, 0);
        assert!(report.summary.total_issues > 0);
        let paths: Vec<_> = report.file_details.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["package.json", "src/app/a.component.ts", "src/app/a.component.html", "src/app/app.module.ts"]);
    }

    #[tokio::test]
    async fn test_dry_run_keeps_records_pending() {
        let report = coordinator(MigrationMode::DryRun, fixture())
            .run(Path::new("/project"))
            .await
            .unwrap();

        assert_eq!(report.summary.modified_files, 4);
        assert_eq!(report.summary.applied_transformations, 0);
        assert_eq!(report.summary.pending_transformations, report.summary.total_transformations());
    }

    #[tokio::test]
    async fn test_migrate_marks_written_records_applied() {
        let writer = Arc::new(RecordingWriter::default());
        let report = coordinator(MigrationMode::Migrate, fixture())
            .with_writer(writer.clone())
            .run(Path::new("/project"))
            .await
            .unwrap();

        // NgModule 자리표시는 내용을 바꾸지 않으므로 쓰지 않는다
        assert_eq!(writer.written.lock().unwrap().len(), 3);
        assert_eq!(report.summary.pending_transformations, 1);
        assert_eq!(
            report.summary.applied_transformations,
            report.summary.total_transformations() - 1
        );
    }

    #[tokio::test]
    async fn test_refused_writes_are_skipped() {
        let writer = Arc::new(RecordingWriter { refuse: true, ..Default::default() });
        let report = coordinator(MigrationMode::Migrate, fixture())
            .with_writer(writer)
            .run(Path::new("/project"))
            .await
            .unwrap();

        assert_eq!(report.summary.applied_transformations, 0);
        assert!(report.summary.skipped_transformations > 0);
    }

    #[tokio::test]
    async fn test_edited_content_is_reported_as_written() {
        let writer = Arc::new(RecordingWriter { edit_suffix: Some("// 직접 수정\n"), ..Default::default() });
        let report = coordinator(MigrationMode::Migrate, fixture())
            .with_writer(writer)
            .run(Path::new("/project"))
            .await
            .unwrap();

        let template = report
            .file_details
            .iter()
            .find(|f| f.path == "src/app/a.component.html")
            .unwrap();
        assert!(template.content.ends_with("// 직접 수정\n"));
        let last = template.transformations.iter().rev().find(|t| t.changes_content()).unwrap();
        assert_eq!(last.after, template.content);
        assert_eq!(last.status, TransformationStatus::Applied);
    }

    #[tokio::test]
    async fn test_invalid_options_fail_before_discovery() {
        let mut options = MigrationOptions::new(MigrationMode::Migrate);
        options.include = vec!["src".into()];
        options.exclude = vec!["src".into()];
        let result = MigrationCoordinator::new(options, EngineSettings::default(), ManifestSettings::default())
            .with_discovery(Arc::new(StaticDiscovery(Vec::new())))
            .run(Path::new("/project"))
            .await;

        assert!(matches!(result, Err(MigrationError::ConflictingPatterns { .. })));
    }
}
