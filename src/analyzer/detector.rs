use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use crate::analyzer::classifier::{TSCONFIG_FILE, WORKSPACE_FILE};
use crate::analyzer::line_number_at;
use crate::analyzer::manifest::{find_dependency, key_line, major_matches, parse_manifest};
use crate::analyzer::types::{AnalyzedFile, FileType, IssueKind, MigrationIssue, Severity};
use crate::config::ManifestSettings;
use crate::error::DetectError;

/// (패턴, 이슈 종류, 심각도, 메시지 템플릿) 한 묶음
///
/// 메시지와 제안의 `{1}`, `{2}`는 캡처 그룹으로 치환된다. `unless`가 있으면 파일에
/// 그 문자열이 있을 때 규칙 전체를 건너뛴다.
struct RuleSpec {
    name: &'static str,
    pattern: &'static str,
    kind: IssueKind,
    severity: Severity,
    message: &'static str,
    suggestion: &'static str,
    unless: Option<&'static str>,
    report_group: usize,
}

const fn rule(
    name: &'static str,
    pattern: &'static str,
    kind: IssueKind,
    severity: Severity,
    message: &'static str,
    suggestion: &'static str,
) -> RuleSpec {
    RuleSpec {
        name,
        pattern,
        kind,
        severity,
        message,
        suggestion,
        unless: None,
        report_group: 0,
    }
}

pub(crate) const CONSTRUCTOR_INJECTION: &str = r"constructor\s*\((?:[^()]|\([^()]*\))*?\b(?:private|public|protected|readonly)\s+(?:[^()]|\([^()]*\))*\)";

const SCRIPT_SPECS: &[RuleSpec] = &[
    rule(
        "deprecated-import-path",
        r#"from\s+['"](@angular/http|rxjs/Rx|rxjs/Observable|rxjs/Subject|rxjs/BehaviorSubject|rxjs-compat[^'"]*)['"]"#,
        IssueKind::DeprecatedApi,
        Severity::Warning,
        "'{1}' 경로는 더 이상 지원되지 않습니다",
        "최신 import 경로로 변경하세요 (@angular/common/http, rxjs)",
    ),
    rule(
        "rxjs-patch-import",
        r#"import\s+['"]rxjs/add/(?:operator|observable)/([\w.]+)['"]"#,
        IssueKind::VersionIncompatibility,
        Severity::Error,
        "패치 방식 RxJS import '{1}'는 RxJS 6 이상에서 동작하지 않습니다",
        "pipe()와 연산자 함수 import로 바꾸세요",
    ),
];

const COMPONENT_SPECS: &[RuleSpec] = &[
    rule(
        "constructor-injection",
        CONSTRUCTOR_INJECTION,
        IssueKind::DeprecatedApi,
        Severity::Suggestion,
        "생성자 주입 대신 inject() 함수를 사용할 수 있습니다",
        "private svc = inject(MyService); 형태의 필드 선언으로 바꾸세요",
    ),
    rule(
        "module-in-component",
        r"@NgModule\(",
        IssueKind::MissingModernizationMarker,
        Severity::Info,
        "컴포넌트 파일 안에 NgModule 선언이 있습니다",
        "standalone 컴포넌트로 전환하고 imports 배열을 컴포넌트에 직접 선언하세요",
    ),
    RuleSpec {
        unless: Some("standalone"),
        ..rule(
            "missing-standalone",
            r"@Component\(\s*\{",
            IssueKind::MissingModernizationMarker,
            Severity::Info,
            "standalone 선언이 없는 컴포넌트입니다",
            "@Component에 standalone: true를 추가하세요",
        )
    },
    rule(
        "untyped-form",
        r"new\s+(FormGroup|FormArray)\s*\(",
        IssueKind::UntypedConstruct,
        Severity::Warning,
        "타입 파라미터 없는 {1} 생성",
        "new {1}<...>(...) 형태로 타입을 지정하세요",
    ),
];

const SERVICE_SPECS: &[RuleSpec] = &[
    rule(
        "constructor-injection",
        CONSTRUCTOR_INJECTION,
        IssueKind::DeprecatedApi,
        Severity::Suggestion,
        "생성자 주입 대신 inject() 함수를 사용할 수 있습니다",
        "private http = inject(HttpClient); 형태의 필드 선언으로 바꾸세요",
    ),
    rule(
        "injectable-without-provided-in",
        r"@Injectable\(\s*\)",
        IssueKind::MissingModernizationMarker,
        Severity::Suggestion,
        "providedIn이 없는 서비스는 NgModule providers에 의존합니다",
        "@Injectable({ providedIn: 'root' })로 바꾸세요",
    ),
    rule(
        "untyped-form",
        r"new\s+(FormGroup|FormArray)\s*\(",
        IssueKind::UntypedConstruct,
        Severity::Warning,
        "타입 파라미터 없는 {1} 생성",
        "new {1}<...>(...) 형태로 타입을 지정하세요",
    ),
];

const MODULE_SPECS: &[RuleSpec] = &[
    rule(
        "ng-module",
        r"@NgModule\(",
        IssueKind::MissingModernizationMarker,
        Severity::Info,
        "NgModule 래퍼는 standalone 구조로 대체할 수 있습니다",
        "선언된 컴포넌트를 standalone으로 전환한 뒤 모듈을 제거하세요",
    ),
    rule(
        "entry-components",
        r"\bentryComponents\s*:",
        IssueKind::DeprecatedApi,
        Severity::Warning,
        "entryComponents는 Ivy 이후 필요하지 않습니다",
        "entryComponents 배열을 삭제하세요",
    ),
    RuleSpec {
        report_group: 1,
        ..rule(
            "raw-module-with-providers",
            r":\s*(ModuleWithProviders)\s*[^<\s\w]",
            IssueKind::VersionIncompatibility,
            Severity::Error,
            "제네릭 타입 없는 ModuleWithProviders는 Angular 10부터 컴파일되지 않습니다",
            "ModuleWithProviders<모듈타입> 형태로 지정하세요",
        )
    },
];

const ROUTING_SPECS: &[RuleSpec] = &[
    rule(
        "string-load-children",
        r##"loadChildren\s*:\s*['"]([^'"#]+)#(\w+)['"]"##,
        IssueKind::VersionIncompatibility,
        Severity::Error,
        "문자열 기반 loadChildren '{1}#{2}'는 더 이상 지원되지 않습니다",
        "loadChildren: () => import('{1}').then(m => m.{2}) 형태로 바꾸세요",
    ),
    rule(
        "router-module-for-root",
        r"RouterModule\.forRoot\(",
        IssueKind::MissingModernizationMarker,
        Severity::Info,
        "RouterModule.forRoot 기반 라우터 설정입니다",
        "standalone 부트스트랩에서는 provideRouter(routes)를 사용하세요",
    ),
];

const TEMPLATE_SPECS: &[RuleSpec] = &[
    rule(
        "legacy-ng-if",
        r#"\*ngIf\s*=\s*(?:"[^"]*"|'[^']*')"#,
        IssueKind::DeprecatedApi,
        Severity::Suggestion,
        "*ngIf 구조 디렉티브는 @if 블록으로 대체할 수 있습니다",
        "@if",
    ),
    rule(
        "legacy-ng-for",
        r#"\*ngFor\s*=\s*(?:"[^"]*"|'[^']*')"#,
        IssueKind::DeprecatedApi,
        Severity::Suggestion,
        "*ngFor 구조 디렉티브는 @for 블록으로 대체할 수 있습니다",
        "@for",
    ),
    rule(
        "legacy-ng-switch",
        r#"\[ngSwitch\]\s*=\s*(?:"[^"]*"|'[^']*')|\*ngSwitchCase\s*=\s*(?:"[^"]*"|'[^']*')|\*ngSwitchDefault\b"#,
        IssueKind::DeprecatedApi,
        Severity::Suggestion,
        "ngSwitch 디렉티브는 @switch 블록으로 대체할 수 있습니다",
        "@switch",
    ),
    rule(
        "flagged-pipe",
        r"\|\s*(async|json)\b",
        IssueKind::DeprecatedApi,
        Severity::Info,
        "'{1}' 파이프 사용을 검토하세요",
        "async는 toSignal(), json은 디버깅 후 제거를 권장합니다",
    ),
];

const STYLE_SPECS: &[RuleSpec] = &[rule(
    "deep-selector",
    r"/deep/|::ng-deep",
    IssueKind::DeprecatedApi,
    Severity::Info,
    "뷰 캡슐화를 우회하는 선택자입니다",
    "CSS 변수나 전역 스타일로 옮기세요",
)];

const TSCONFIG_SPECS: &[RuleSpec] = &[rule(
    "es5-target",
    r#"(?i)"target"\s*:\s*"es5""#,
    IssueKind::VersionIncompatibility,
    Severity::Warning,
    "ES5 타깃은 최신 Angular에서 지원되지 않습니다",
    "\"target\": \"ES2022\"로 올리세요",
)];

const WORKSPACE_SPECS: &[RuleSpec] = &[rule(
    "aot-disabled",
    r#""aot"\s*:\s*false"#,
    IssueKind::VersionIncompatibility,
    Severity::Warning,
    "AOT 컴파일이 꺼져 있습니다",
    "\"aot\": true로 설정하세요 (Ivy는 AOT 전제)",
)];

struct CompiledRule {
    spec: &'static RuleSpec,
    regex: Result<Regex, regex::Error>,
}

fn compile(specs: &'static [RuleSpec]) -> Vec<CompiledRule> {
    specs
        .iter()
        .map(|spec| CompiledRule {
            spec,
            regex: Regex::new(spec.pattern),
        })
        .collect()
}

static SCRIPT_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(SCRIPT_SPECS));
static COMPONENT_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(COMPONENT_SPECS));
static SERVICE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(SERVICE_SPECS));
static MODULE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(MODULE_SPECS));
static ROUTING_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(ROUTING_SPECS));
static TEMPLATE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(TEMPLATE_SPECS));
static STYLE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(STYLE_SPECS));
static TSCONFIG_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(TSCONFIG_SPECS));
static WORKSPACE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| compile(WORKSPACE_SPECS));

/// 파일 역할에 맞는 규칙 집합으로 이슈를 찾는다. 파일 내용은 건드리지 않는다.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    manifest: ManifestSettings,
}

impl PatternDetector {
    pub fn new(manifest: ManifestSettings) -> Self {
        Self { manifest }
    }

    pub fn detect(&self, file: &AnalyzedFile) -> Result<Vec<MigrationIssue>, DetectError> {
        let mut issues = Vec::new();

        match file.file_type() {
            FileType::UiComponent => {
                run_rules(file, &SCRIPT_RULES, &mut issues)?;
                run_rules(file, &COMPONENT_RULES, &mut issues)?;
            }
            FileType::Service => {
                run_rules(file, &SCRIPT_RULES, &mut issues)?;
                run_rules(file, &SERVICE_RULES, &mut issues)?;
            }
            FileType::ModuleDescriptor => {
                run_rules(file, &SCRIPT_RULES, &mut issues)?;
                run_rules(file, &MODULE_RULES, &mut issues)?;
            }
            FileType::RoutingDescriptor => {
                run_rules(file, &SCRIPT_RULES, &mut issues)?;
                run_rules(file, &ROUTING_RULES, &mut issues)?;
            }
            FileType::Template => run_rules(file, &TEMPLATE_RULES, &mut issues)?,
            FileType::DependencyManifest => issues.extend(self.detect_manifest(&file.content)),
            FileType::Other => self.detect_general(file, &mut issues)?,
        }

        Ok(issues)
    }

    fn detect_general(&self, file: &AnalyzedFile, issues: &mut Vec<MigrationIssue>) -> Result<(), DetectError> {
        let name = file.file_name().to_lowercase();

        if name == WORKSPACE_FILE {
            return run_rules(file, &WORKSPACE_RULES, issues);
        }
        if name == TSCONFIG_FILE || (name.starts_with("tsconfig") && name.ends_with(".json")) {
            return run_rules(file, &TSCONFIG_RULES, issues);
        }

        match file.extension() {
            Some("ts") => run_rules(file, &SCRIPT_RULES, issues),
            Some("css") | Some("scss") | Some("sass") | Some("less") => {
                run_rules(file, &STYLE_RULES, issues)
            }
            _ => Ok(()),
        }
    }

    fn detect_manifest(&self, content: &str) -> Vec<MigrationIssue> {
        let doc = match parse_manifest(content) {
            Ok(doc) => doc,
            Err(e) => {
                return vec![MigrationIssue {
                    kind: IssueKind::VersionIncompatibility,
                    severity: Severity::Error,
                    message: format!("package.json을 파싱할 수 없습니다: {}", e),
                    suggestion: "JSON 문법 오류를 먼저 수정하세요".to_string(),
                    line_number: None,
                    matched_text: String::new(),
                }];
            }
        };

        let mut issues = Vec::new();
        let policy = &self.manifest;

        if let Some((_, version)) = find_dependency(&doc, &policy.core_package) {
            if !major_matches(version, &policy.expected_major) {
                issues.push(MigrationIssue {
                    kind: IssueKind::VersionIncompatibility,
                    severity: Severity::Error,
                    message: format!(
                        "{} 버전 {}이(가) 목표 메이저 버전 {}과 다릅니다",
                        policy.core_package, version, policy.expected_major
                    ),
                    suggestion: format!(
                        "ng update {}@{} 으로 단계적으로 올리세요",
                        policy.core_package, policy.expected_major
                    ),
                    line_number: key_line(content, &policy.core_package),
                    matched_text: format!("\"{}\": \"{}\"", policy.core_package, version),
                });
            }
        }

        for name in &policy.obsolete_packages {
            if let Some((section, version)) = find_dependency(&doc, name) {
                issues.push(MigrationIssue {
                    kind: IssueKind::DeprecatedApi,
                    severity: Severity::Warning,
                    message: format!("{}의 {}는 더 이상 사용되지 않는 패키지입니다", section, name),
                    suggestion: format!("{}를 제거하고 대체 도구로 옮기세요", name),
                    line_number: key_line(content, name),
                    matched_text: format!("\"{}\": \"{}\"", name, version),
                });
            }
        }

        issues
    }
}

fn run_rules(
    file: &AnalyzedFile,
    rules: &[CompiledRule],
    issues: &mut Vec<MigrationIssue>,
) -> Result<(), DetectError> {
    for rule in rules {
        let spec = rule.spec;
        let regex = rule.regex.as_ref().map_err(|e| DetectError::Rule {
            path: file.path.clone(),
            rule: spec.name,
            reason: e.to_string(),
        })?;

        if spec.unless.is_some_and(|marker| file.content.contains(marker)) {
            continue;
        }

        for caps in regex.captures_iter(&file.content) {
            let Some(reported) = caps.get(spec.report_group).or_else(|| caps.get(0)) else {
                continue;
            };
            issues.push(MigrationIssue {
                kind: spec.kind,
                severity: spec.severity,
                message: fill(spec.message, &caps),
                suggestion: fill(spec.suggestion, &caps),
                line_number: Some(line_number_at(&file.content, reported.start())),
                matched_text: reported.as_str().to_string(),
            });
        }
    }
    Ok(())
}

fn fill(template: &str, caps: &Captures) -> String {
    let mut text = template.to_string();
    for idx in 1..caps.len() {
        let value = caps.get(idx).map(|m| m.as_str()).unwrap_or("");
        text = text.replace(&format!("{{{}}}", idx), value);
    }
    text
}
