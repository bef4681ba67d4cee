mod types;
pub mod script;
pub mod template;
pub mod manifest;

pub use types::*;

use serde_json::json;
use crate::analyzer::{AnalyzedFile, FileType};
use crate::config::ManifestSettings;
use crate::logging::{Component, LogLevel, LogRecord, SharedLogger};

type Rule = fn(&str, &RuleContext) -> RuleResult;

/// 파이프라인 한 단계. 설명의 `{n}`은 바뀐 지점 수로 치환된다.
struct Step {
    kind: TransformationKind,
    description: &'static str,
    rule: Rule,
}

const fn step(kind: TransformationKind, description: &'static str, rule: Rule) -> Step {
    Step { kind, description, rule }
}

const COMPONENT_PIPELINE: &[Step] = &[
    step(
        TransformationKind::ConvertToStandaloneEquivalent,
        "@Component에 standalone: true 추가",
        script::add_standalone_flag,
    ),
    step(
        TransformationKind::ReplaceConstructorInjection,
        "생성자 주입 {n}건을 inject() 필드로 변환",
        script::replace_constructor_injection,
    ),
    step(
        TransformationKind::AddGenericTypeToFormConstruct,
        "FormGroup/FormArray {n}곳에 타입 파라미터 추가",
        script::type_form_constructs,
    ),
    step(
        TransformationKind::UpdateImportPath,
        "사용 중단된 import 경로 {n}곳 수정",
        script::update_import_paths,
    ),
];

const SERVICE_PIPELINE: &[Step] = &[
    step(
        TransformationKind::ConvertToStandaloneEquivalent,
        "@Injectable에 providedIn: 'root' 지정",
        script::provide_in_root,
    ),
    step(
        TransformationKind::ReplaceConstructorInjection,
        "생성자 주입 {n}건을 inject() 필드로 변환",
        script::replace_constructor_injection,
    ),
    step(
        TransformationKind::AddGenericTypeToFormConstruct,
        "FormGroup/FormArray {n}곳에 타입 파라미터 추가",
        script::type_form_constructs,
    ),
    step(
        TransformationKind::UpdateImportPath,
        "사용 중단된 import 경로 {n}곳 수정",
        script::update_import_paths,
    ),
];

const ROUTING_PIPELINE: &[Step] = &[
    step(
        TransformationKind::UpdateImportPath,
        "문자열 loadChildren {n}곳을 동적 import로 변환",
        script::rewrite_load_children,
    ),
    step(
        TransformationKind::UpdateImportPath,
        "사용 중단된 import 경로 {n}곳 수정",
        script::update_import_paths,
    ),
];

const TEMPLATE_PIPELINE: &[Step] = &[
    step(
        TransformationKind::MigrateControlFlowDirective,
        "*ngIf {n}곳을 @if 블록으로 변환",
        template::migrate_if_blocks,
    ),
    step(
        TransformationKind::MigrateControlFlowDirective,
        "*ngFor {n}곳을 @for 블록으로 변환",
        template::migrate_for_blocks,
    ),
    step(
        TransformationKind::MigrateControlFlowDirective,
        "ngSwitch {n}곳을 @switch 블록으로 변환",
        template::migrate_switch_blocks,
    ),
];

const MANIFEST_PIPELINE: &[Step] = &[step(
    TransformationKind::UpdateDependencyVersion,
    "의존성 {n}건 버전 갱신/정리",
    manifest::update_dependency_versions,
)];

const MODULE_PLACEHOLDER: &str = "NgModule 래퍼는 자동 변환하지 않습니다. standalone 구성으로 수동 전환이 필요합니다";

fn pipeline(file_type: FileType) -> &'static [Step] {
    match file_type {
        FileType::UiComponent => COMPONENT_PIPELINE,
        FileType::Service => SERVICE_PIPELINE,
        FileType::RoutingDescriptor => ROUTING_PIPELINE,
        FileType::Template => TEMPLATE_PIPELINE,
        FileType::DependencyManifest => MANIFEST_PIPELINE,
        FileType::ModuleDescriptor | FileType::Other => &[],
    }
}

/// 파일 역할별 규칙 파이프라인을 실행한다
pub struct Transformer {
    manifest: ManifestSettings,
    logger: SharedLogger,
}

impl Transformer {
    pub fn new(manifest: ManifestSettings, logger: SharedLogger) -> Self {
        Self { manifest, logger }
    }

    /// 레코드는 서로 이어진다 (`records[i].before == records[i - 1].after`).
    /// 규칙이 실패하면 거기서 멈추고 그 전까지의 레코드와 오류를 돌려준다.
    pub fn transform(&self, file: &AnalyzedFile) -> TransformOutcome {
        if file.file_type() == FileType::ModuleDescriptor {
            return self.module_placeholder(file);
        }

        let ctx = RuleContext {
            path: &file.path,
            manifest: &self.manifest,
            logger: self.logger.as_ref(),
        };
        let mut outcome = TransformOutcome::default();
        let mut current = file.content.clone();

        for step in pipeline(file.file_type()) {
            match (step.rule)(&current, &ctx) {
                Ok(Some(rewrite)) if rewrite.content != current => {
                    let description = step.description.replace("{n}", &rewrite.changes.to_string());
                    self.logger.log(
                        LogRecord::new(LogLevel::Debug, Component::Transformer, description.clone())
                            .with_path(&file.path)
                            .with_payload(json!({ "kind": step.kind.as_str(), "changes": rewrite.changes })),
                    );
                    outcome.records.push(TransformationRecord::pending(
                        step.kind,
                        description,
                        std::mem::take(&mut current),
                        rewrite.content.clone(),
                    ));
                    current = rewrite.content;
                }
                Ok(_) => {}
                Err(err) => {
                    self.logger.log(
                        LogRecord::new(LogLevel::Warn, Component::Transformer, format!("변환 중단: {err}"))
                            .with_path(&file.path)
                            .with_payload(json!({
                                "kind": step.kind.as_str(),
                                "kept_records": outcome.records.len(),
                            })),
                    );
                    outcome.error = Some(err);
                    break;
                }
            }
        }

        outcome
    }

    fn module_placeholder(&self, file: &AnalyzedFile) -> TransformOutcome {
        let already = file
            .transformations
            .iter()
            .any(|t| t.kind == TransformationKind::RemoveLegacyModuleWrapper);
        if already {
            return TransformOutcome::default();
        }

        self.logger.log(
            LogRecord::new(LogLevel::Info, Component::Transformer, "수동 전환이 필요한 NgModule")
                .with_path(&file.path),
        );
        TransformOutcome {
            records: vec![TransformationRecord::pending(
                TransformationKind::RemoveLegacyModuleWrapper,
                MODULE_PLACEHOLDER.to_string(),
                file.content.clone(),
                file.content.clone(),
            )],
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::logging::MemoryLogger;

    fn transformer() -> (Transformer, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        (Transformer::new(ManifestSettings::default(), logger.clone()), logger)
    }

    fn apply(transformer: &Transformer, file: AnalyzedFile) -> AnalyzedFile {
        let outcome = transformer.transform(&file);
        assert!(outcome.error.is_none());
        file.with_transformations(outcome.records)
    }

    fn assert_chained(records: &[TransformationRecord]) {
        for pair in records.windows(2) {
            assert_eq!(pair[1].before, pair[0].after);
        }
    }

    #[test]
    fn test_component_pipeline_runs_in_order_and_chains() {
        let (transformer, _) = transformer();
        let content = "import { Component } from '@angular/core';\nimport { Http } from '@angular/http';\n\n@Component({\n  selector: 'app-a',\n})\nexport class AComponent {\n  form = new FormGroup({});\n  constructor(private svc: MyService) {}\n}\n";
        let file = AnalyzedFile::new("src/app/a.component.ts", content);
        let outcome = transformer.transform(&file);

        let kinds: Vec<_> = outcome.records.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransformationKind::ConvertToStandaloneEquivalent,
                TransformationKind::ReplaceConstructorInjection,
                TransformationKind::AddGenericTypeToFormConstruct,
                TransformationKind::UpdateImportPath,
            ]
        );
        assert_eq!(outcome.records[0].before, content);
        assert_chained(&outcome.records);
        assert!(outcome.records.iter().all(|r| r.status == TransformationStatus::Pending));

        let last = &outcome.records[3].after;
        assert!(last.contains("private svc = inject(MyService);"));
        assert!(!last.contains("constructor(private"));
        assert!(last.contains("@angular/common/http"));
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let (transformer, _) = transformer();
        let fixtures = [
            ("src/app/a.component.ts", "@Component({ selector: 'a' })\nexport class A { constructor(private s: S) {} }"),
            ("src/app/a.service.ts", "@Injectable()\nexport class S { constructor(private http: HttpClient) {} }"),
            ("src/app/app-routing.module.ts", "const routes: Routes = [{ path: 'x', loadChildren: './x/x.module#XModule' }];"),
            ("src/app/a.component.html", "<div *ngIf=\"a\"><li *ngFor=\"let x of xs\">{{ x }}</li></div>"),
            ("package.json", "{\"dependencies\": {\"@angular/core\": \"5.2.0\", \"rxjs-compat\": \"6.0.0\"}}"),
            ("src/app/app.module.ts", "@NgModule({ declarations: [] })\nexport class AppModule {}"),
        ];

        for (path, content) in fixtures {
            let once = apply(&transformer, AnalyzedFile::new(path, content));
            assert!(!once.transformations.is_empty(), "{path}: 첫 실행에서 변환이 없음");
            let count = once.transformations.len();
            let twice = apply(&transformer, once);
            assert_eq!(twice.transformations.len(), count, "{path}: 두 번째 실행에서 레코드 추가됨");
        }
    }

    #[test]
    fn test_module_placeholder_is_noop_record() {
        let (transformer, _) = transformer();
        let file = AnalyzedFile::new("src/app/app.module.ts", "@NgModule({})\nexport class AppModule {}");
        let outcome = transformer.transform(&file);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.kind, TransformationKind::RemoveLegacyModuleWrapper);
        assert_eq!(record.before, record.after);
        assert_eq!(record.status, TransformationStatus::Pending);
    }

    #[test]
    fn test_template_scenario() {
        let (transformer, _) = transformer();
        let file = AnalyzedFile::new("src/app/a.component.html", "<p *ngIf=\"cond\">hi</p>");
        let outcome = transformer.transform(&file);

        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].after.contains("@if (cond) {"));
        assert!(!outcome.records[0].after.contains("*ngIf"));
    }

    #[test]
    fn test_manifest_scenario_and_parse_failure() {
        let (transformer, logger) = transformer();
        let file = AnalyzedFile::new("package.json", r#"{"dependencies": {"@angular/core": "5.2.0"}}"#);
        let outcome = transformer.transform(&file);
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].after.contains("\"@angular/core\": \"^20.0.0\""));

        let broken = AnalyzedFile::new("package.json", "{ \"dependencies\": ");
        let outcome = transformer.transform(&broken);
        assert!(outcome.records.is_empty());
        assert!(outcome.error.is_some());
        assert_eq!(logger.count_at_least(LogLevel::Warn), 1);
    }

    #[test]
    fn test_failure_keeps_earlier_records() {
        let (transformer, _) = transformer();
        let content = "@Component({ selector: 'a' })\nexport class A {\n  constructor(private s: S) {\n";
        let outcome = transformer.transform(&AnalyzedFile::new("src/app/a.component.ts", content));

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].kind, TransformationKind::ConvertToStandaloneEquivalent);
        assert!(matches!(outcome.error, Some(crate::error::TransformError::Unbalanced { .. })));
    }

    #[test]
    fn test_other_files_untouched() {
        let (transformer, _) = transformer();
        let file = AnalyzedFile::new("src/styles.scss", "::ng-deep .a { color: red; }");
        assert!(transformer.transform(&file).records.is_empty());
    }
}
