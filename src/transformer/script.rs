use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use crate::analyzer::detector::CONSTRUCTOR_INJECTION;
use crate::error::TransformError;
use crate::transformer::types::{Rewrite, RuleContext, RuleResult};

static COMPONENT_DECORATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"@Component\(\s*\{").unwrap());
static EMPTY_INJECTABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@Injectable\(\s*\)").unwrap());
static CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| Regex::new(CONSTRUCTOR_INJECTION).unwrap());
static UNTYPED_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"new(\s+)(FormGroup|FormArray)\s*\(").unwrap());
static CORE_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*['"]@angular/core['"]"#).unwrap());
static DEPRECATED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(from\s+)(['"])(@angular/http|rxjs/Rx|rxjs/Observable|rxjs/Subject|rxjs/BehaviorSubject)(['"])"#)
        .unwrap()
});
static PATCH_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+['"]rxjs/add/(?:operator|observable)/[\w.]+['"];?[ \t]*(?:\r?\n)?"#).unwrap()
});
static CLASS_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bclass\s+[\w$]+[^{;]*\{").unwrap());
static STRING_LOAD_CHILDREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"loadChildren\s*:\s*['"]([^'"#]+)#(\w+)['"]"##).unwrap()
});

/// 옛 import 경로 → 현재 경로
pub const IMPORT_PATH_MAP: &[(&str, &str)] = &[
    ("@angular/http", "@angular/common/http"),
    ("rxjs/Rx", "rxjs"),
    ("rxjs/Observable", "rxjs"),
    ("rxjs/Subject", "rxjs"),
    ("rxjs/BehaviorSubject", "rxjs"),
];

const ACCESS_MODIFIERS: &[&str] = &["private", "public", "protected", "readonly"];

/// `@Component({`에 `standalone: true`를 넣는다
pub fn add_standalone_flag(content: &str, _ctx: &RuleContext) -> RuleResult {
    if content.contains("standalone") {
        return Ok(None);
    }

    let mut changes = 0;
    let updated = COMPONENT_DECORATOR.replace_all(content, |caps: &Captures| {
        changes += 1;
        let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let rest = &content[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
        match next_line_indent(rest) {
            Some(indent) => format!("{matched}\n{indent}standalone: true,"),
            None => format!("{matched} standalone: true,"),
        }
    });

    Ok((changes > 0).then(|| Rewrite::new(updated.into_owned(), changes)))
}

/// `@Injectable()` → `@Injectable({ providedIn: 'root' })`
pub fn provide_in_root(content: &str, _ctx: &RuleContext) -> RuleResult {
    let changes = EMPTY_INJECTABLE.find_iter(content).count();
    if changes == 0 {
        return Ok(None);
    }
    let updated = EMPTY_INJECTABLE.replace_all(content, "@Injectable({ providedIn: 'root' })");
    Ok(Some(Rewrite::new(updated.into_owned(), changes)))
}

/// 접근 제한자가 붙은 생성자 파라미터를 `inject()` 필드로 옮긴다
pub fn replace_constructor_injection(content: &str, _ctx: &RuleContext) -> RuleResult {
    let starts: Vec<usize> = CONSTRUCTOR.find_iter(content).map(|m| m.start()).collect();
    if starts.is_empty() {
        return Ok(None);
    }

    let mut updated = content.to_string();
    let mut changes = 0;

    // 뒤에서부터 바꿔야 앞쪽 오프셋이 유지된다
    for start in starts.into_iter().rev() {
        if let Some(converted) = convert_constructor(&mut updated, start)? {
            changes += converted;
        }
    }

    if changes == 0 {
        return Ok(None);
    }

    let updated = ensure_core_import(&updated, "inject");
    Ok(Some(Rewrite::new(updated, changes)))
}

/// `new FormGroup(` → `new FormGroup<any>(`
pub fn type_form_constructs(content: &str, _ctx: &RuleContext) -> RuleResult {
    let changes = UNTYPED_FORM.find_iter(content).count();
    if changes == 0 {
        return Ok(None);
    }
    let updated = UNTYPED_FORM.replace_all(content, "new${1}${2}<any>(");
    Ok(Some(Rewrite::new(updated.into_owned(), changes)))
}

/// 사라진 import 경로를 바꾸고 RxJS 패치 import를 지운다
pub fn update_import_paths(content: &str, _ctx: &RuleContext) -> RuleResult {
    let mut changes = 0;

    let updated = DEPRECATED_IMPORT.replace_all(content, |caps: &Captures| {
        changes += 1;
        let old = &caps[3];
        let new = IMPORT_PATH_MAP
            .iter()
            .find(|(from, _)| *from == old)
            .map(|(_, to)| *to)
            .unwrap_or(old);
        format!("{}{}{}{}", &caps[1], &caps[2], new, &caps[4])
    });

    changes += PATCH_IMPORT.find_iter(&updated).count();
    let updated = PATCH_IMPORT.replace_all(&updated, "");

    Ok((changes > 0).then(|| Rewrite::new(updated.into_owned(), changes)))
}

/// `loadChildren: './a/a.module#AModule'` → 동적 import
pub fn rewrite_load_children(content: &str, _ctx: &RuleContext) -> RuleResult {
    let changes = STRING_LOAD_CHILDREN.find_iter(content).count();
    if changes == 0 {
        return Ok(None);
    }
    let updated = STRING_LOAD_CHILDREN.replace_all(
        content,
        "loadChildren: () => import('${1}').then(m => m.${2})",
    );
    Ok(Some(Rewrite::new(updated.into_owned(), changes)))
}

/// 생성자 하나를 변환하고 옮긴 파라미터 수를 돌려준다
///
/// 옮긴 필드는 클래스 본문 맨 위로 올린다. 다른 필드 초기화식이 주입된 값을 읽을 수 있어야 한다.
fn convert_constructor(content: &mut String, start: usize) -> Result<Option<usize>, TransformError> {
    let Some(open_paren) = content[start..].find('(').map(|i| start + i) else {
        return Ok(None);
    };
    let close_paren = find_matching(content, open_paren, b'(', b')').ok_or(TransformError::Unbalanced {
        construct: "constructor",
        offset: open_paren,
    })?;

    let after_params = &content[close_paren + 1..];
    let body_open = match after_params.find(|c: char| !c.is_whitespace()) {
        Some(i) if after_params[i..].starts_with('{') => close_paren + 1 + i,
        // 선언만 있는 오버로드 시그니처
        _ => return Ok(None),
    };
    let body_close = find_matching(content, body_open, b'{', b'}').ok_or(TransformError::Unbalanced {
        construct: "constructor body",
        offset: body_open,
    })?;

    let body = content[body_open + 1..body_close].to_string();
    let params = split_top_level(&content[open_paren + 1..close_paren], ',');
    let mut fields = Vec::new();
    let mut remaining = Vec::new();
    for param in params.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match convert_parameter(param) {
            // 본문이 파라미터 이름을 직접 쓰면 생성자에 남긴다
            Some(field) if !references_bare(&body, &field.name) => fields.push(field),
            _ => remaining.push(param.to_string()),
        }
    }
    if fields.is_empty() {
        return Ok(None);
    }

    let line_start = content[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &content[line_start..start];
    let (mut replace_from, indent) = if prefix.chars().all(|c| c == ' ' || c == '\t') {
        (line_start, prefix.to_string())
    } else {
        (start, String::new())
    };
    let mut replace_to = body_close + 1;

    let replacement = if remaining.is_empty() && body.trim().is_empty() {
        if replace_from == line_start {
            replace_to += line_break_len(&content[replace_to..]);
            // 마지막 멤버였다면 앞의 빈 줄도 지운다
            if content[replace_to..].trim_start().starts_with('}') && content[..line_start].ends_with("\n\n") {
                replace_from -= 1;
            }
        } else {
            // `{ constructor(...) {} }`처럼 한 줄에 있으면 앞 공백까지 지운다
            replace_from = content[..start].trim_end_matches([' ', '\t']).len();
        }
        String::new()
    } else {
        format!("{indent}constructor({}) {{{}}}", remaining.join(", "), body)
    };

    let converted = fields.len();
    content.replace_range(replace_from..replace_to, &replacement);

    match enclosing_class_brace(content, replace_from) {
        Some(brace) => {
            let member_indent = if indent.is_empty() { "  ".to_string() } else { indent };
            let rest = &content[brace + 1..];
            let block = if line_break_len(rest) > 0 {
                let lines = fields
                    .iter()
                    .map(|f| format!("\n{member_indent}{}", f.declaration))
                    .collect::<String>();
                let next_line = rest[line_break_len(rest)..].lines().next().unwrap_or("").trim();
                if next_line.is_empty() || next_line.starts_with('}') {
                    lines
                } else {
                    format!("{lines}\n")
                }
            } else {
                fields.iter().map(|f| format!(" {}", f.declaration)).collect()
            };
            content.insert_str(brace + 1, &block);
        }
        // 클래스 밖의 생성자는 제자리에 둔다
        None => {
            let block = fields
                .iter()
                .map(|f| format!("{indent}{}\n", f.declaration))
                .collect::<String>();
            content.insert_str(replace_from, &block);
        }
    }

    Ok(Some(converted))
}

/// `inject()` 필드로 바뀐 생성자 파라미터
#[derive(Debug, PartialEq)]
struct InjectedField {
    name: String,
    declaration: String,
}

/// `offset`을 감싸는 `class ... {`의 여는 중괄호 위치
fn enclosing_class_brace(content: &str, offset: usize) -> Option<usize> {
    CLASS_OPEN
        .find_iter(&content[..offset])
        .map(|m| m.end() - 1)
        .filter(|&brace| find_matching(content, brace, b'{', b'}').map_or(false, |end| end >= offset))
        .last()
}

fn line_break_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') {
        1
    } else {
        0
    }
}

/// `this.` 없이 이름만으로 쓰인 곳이 있는지
fn references_bare(body: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    body.match_indices(name).any(|(idx, _)| {
        let before = body[..idx].chars().next_back();
        let after = body[idx + name.len()..].chars().next();
        !matches!(before, Some(c) if is_ident(c) || c == '.') && !matches!(after, Some(c) if is_ident(c))
    })
}

/// `@Optional() private readonly svc: Svc` → `private readonly svc = inject(Svc, { optional: true });`
///
/// 변환할 수 없는 파라미터(제한자 없음, 기본값, 알 수 없는 데코레이터)는 None.
fn convert_parameter(param: &str) -> Option<InjectedField> {
    let mut rest = param.trim();
    let mut token: Option<String> = None;
    let mut options = Vec::new();

    while let Some(stripped) = rest.strip_prefix('@') {
        let name_len = stripped
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(stripped.len());
        let name = &stripped[..name_len];
        let mut after = &stripped[name_len..];
        let mut args = "";
        if after.starts_with('(') {
            let close = find_matching(after, 0, b'(', b')')?;
            args = after[1..close].trim();
            after = &after[close + 1..];
        }
        match name {
            "Inject" if !args.is_empty() => token = Some(args.to_string()),
            "Optional" => options.push("optional: true"),
            "Self" => options.push("self: true"),
            "SkipSelf" => options.push("skipSelf: true"),
            "Host" => options.push("host: true"),
            _ => return None,
        }
        rest = after.trim_start();
    }

    let mut modifiers = Vec::new();
    loop {
        let word_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_len];
        if !ACCESS_MODIFIERS.contains(&word) {
            break;
        }
        modifiers.push(word);
        rest = rest[word_len..].trim_start();
    }
    if modifiers.is_empty() || has_top_level(rest, '=') {
        return None;
    }

    let (name, ty) = rest.split_once(':')?;
    let name = name.trim();
    let ty = ty.trim();
    if ty.is_empty() || name.is_empty() {
        return None;
    }
    let (name, optional_marker) = match name.strip_suffix('?') {
        Some(name) => (name.trim(), true),
        None => (name, false),
    };
    if optional_marker && !options.contains(&"optional: true") {
        options.push("optional: true");
    }

    let options = if options.is_empty() {
        String::new()
    } else {
        format!(", {{ {} }}", options.join(", "))
    };
    let modifiers = modifiers.join(" ");

    let declaration = match token {
        Some(token) => format!("{modifiers} {name}: {ty} = inject({token}{options});"),
        None => match ty.find('<') {
            Some(generic_start) => {
                let base = ty[..generic_start].trim();
                format!("{modifiers} {name} = inject<{ty}>({base}{options});")
            }
            None => format!("{modifiers} {name} = inject({ty}{options});"),
        },
    };
    Some(InjectedField { name: name.to_string(), declaration })
}

/// `@angular/core` import에 심볼을 추가한다 (없으면 import 문을 새로 만든다)
pub fn ensure_core_import(content: &str, symbol: &str) -> String {
    if let Some(caps) = CORE_IMPORT.captures(content) {
        let Some(names) = caps.get(1) else {
            return content.to_string();
        };
        let already = names
            .as_str()
            .split(',')
            .map(|n| n.trim())
            .any(|n| n == symbol);
        if already {
            return content.to_string();
        }

        let inner = names.as_str().trim_end();
        let trailing = &names.as_str()[inner.len()..];
        let merged = if inner.trim().is_empty() {
            format!(" {symbol} ")
        } else if inner.ends_with(',') {
            format!("{inner} {symbol},{trailing}")
        } else {
            format!("{inner}, {symbol}{trailing}")
        };

        let mut updated = content.to_string();
        updated.replace_range(names.range(), &merged);
        return updated;
    }

    format!("import {{ {symbol} }} from '@angular/core';\n{content}")
}

/// 문자열 리터럴과 주석을 건너뛰며 짝이 맞는 닫는 괄호 위치를 찾는다
pub(crate) fn find_matching(text: &str, open_idx: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open_idx;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if is_comment_start(bytes, i) => {
                i = skip_comment(bytes, i);
                continue;
            }
            _ if b == open => depth += 1,
            _ if b == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn is_comment_start(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'/' && matches!(bytes.get(i + 1), Some(b'/') | Some(b'*'))
}

/// `//`는 줄 끝까지, `/* */`는 닫는 표시 뒤까지 건너뛴다
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let rest = &bytes[start + 2..];
    if bytes[start + 1] == b'/' {
        rest.iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| start + 2 + p)
    } else {
        rest.windows(2)
            .position(|w| w == b"*/")
            .map_or(bytes.len(), |p| start + 2 + p + 2)
    }
}

/// 괄호/제네릭/문자열/주석 바깥에 있는 구분자로 나눈다 (구분자는 ASCII)
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    let mut prev = 0u8;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                prev = b;
                continue;
            }
            b'/' if is_comment_start(bytes, i) => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if prev != b'=' => depth -= 1,
            _ if sep.is_ascii() && b == sep as u8 && depth <= 0 => {
                parts.push(&text[last..i]);
                last = i + 1;
            }
            _ => {}
        }
        prev = b;
        i += 1;
    }
    parts.push(&text[last..]);
    parts
}

fn has_top_level(text: &str, needle: char) -> bool {
    split_top_level(text, needle).len() > 1
}

fn next_line_indent(rest: &str) -> Option<String> {
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;
    Some(rest.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManifestSettings;
    use crate::logging::MemoryLogger;

    fn run(rule: fn(&str, &RuleContext) -> RuleResult, content: &str) -> Option<Rewrite> {
        let manifest = ManifestSettings::default();
        let logger = MemoryLogger::new();
        let ctx = RuleContext { path: "test.ts", manifest: &manifest, logger: &logger };
        rule(content, &ctx).unwrap()
    }

    #[test]
    fn test_constructor_injection_removed_when_body_empty() {
        let content = "import { Component } from '@angular/core';\n\nexport class A {\n  constructor(private svc: MyService) {}\n}\n";
        let rewrite = run(replace_constructor_injection, content).unwrap();

        assert_eq!(
            rewrite.content,
            "import { Component, inject } from '@angular/core';\n\nexport class A {\n  private svc = inject(MyService);\n}\n"
        );
        assert_eq!(rewrite.changes, 1);
    }

    #[test]
    fn test_constructor_with_body_keeps_plain_params() {
        let content = "export class A {\n  constructor(private readonly http: HttpClient, name: string) {\n    this.name = name;\n  }\n}";
        let rewrite = run(replace_constructor_injection, content).unwrap();

        assert!(rewrite.content.starts_with("import { inject } from '@angular/core';\n"));
        assert!(rewrite.content.contains("  private readonly http = inject(HttpClient);\n\n  constructor(name: string) {\n    this.name = name;\n  }"));
    }

    fn declaration(param: &str) -> Option<String> {
        convert_parameter(param).map(|field| field.declaration)
    }

    #[test]
    fn test_decorated_parameters() {
        assert_eq!(
            declaration("@Inject(API_URL) private url: string").as_deref(),
            Some("private url: string = inject(API_URL);")
        );
        assert_eq!(
            declaration("@Optional() @SkipSelf() protected parent: Parent").as_deref(),
            Some("protected parent = inject(Parent, { optional: true, skipSelf: true });")
        );
        assert_eq!(
            declaration("private store: Store<AppState>").as_deref(),
            Some("private store = inject<Store<AppState>>(Store);")
        );
        assert_eq!(declaration("@Attribute('role') private role: string"), None);
        assert_eq!(declaration("private retries: number = 3"), None);
        assert_eq!(declaration("svc: MyService"), None);
    }

    #[test]
    fn test_constructor_rule_is_idempotent() {
        let content = "export class A {\n  constructor(private a: A, @Attribute('x') private x: string) {}\n}";
        let first = run(replace_constructor_injection, content).unwrap();
        assert!(first.content.contains("private a = inject(A);"));
        assert!(first.content.contains("constructor(@Attribute('x') private x: string) {}"));
        assert!(run(replace_constructor_injection, &first.content).is_none());
    }

    #[test]
    fn test_multiline_core_import_gets_inject() {
        let content = "import {\n  Component,\n  OnInit,\n} from '@angular/core';\n";
        let updated = ensure_core_import(content, "inject");
        assert_eq!(updated, "import {\n  Component,\n  OnInit, inject,\n} from '@angular/core';\n");
        assert_eq!(ensure_core_import(&updated, "inject"), updated);
    }

    #[test]
    fn test_standalone_flag_uses_next_line_indent() {
        let content = "@Component({\n  selector: 'app-a',\n})";
        let rewrite = run(add_standalone_flag, content).unwrap();
        assert_eq!(rewrite.content, "@Component({\n  standalone: true,\n  selector: 'app-a',\n})");
        assert!(run(add_standalone_flag, &rewrite.content).is_none());

        let inline = run(add_standalone_flag, "@Component({ selector: 'x' })").unwrap();
        assert_eq!(inline.content, "@Component({ standalone: true, selector: 'x' })");
    }

    #[test]
    fn test_form_generics() {
        let content = "form = new FormGroup({ items: new FormArray([]) });";
        let rewrite = run(type_form_constructs, content).unwrap();
        assert_eq!(rewrite.content, "form = new FormGroup<any>({ items: new FormArray<any>([]) });");
        assert_eq!(rewrite.changes, 2);
        assert!(run(type_form_constructs, &rewrite.content).is_none());
    }

    #[test]
    fn test_import_paths_and_patch_imports() {
        let content = "import { Http } from '@angular/http';\nimport { Observable } from \"rxjs/Observable\";\nimport 'rxjs/add/operator/map';\nexport class A {}\n";
        let rewrite = run(update_import_paths, content).unwrap();
        assert_eq!(
            rewrite.content,
            "import { Http } from '@angular/common/http';\nimport { Observable } from \"rxjs\";\nexport class A {}\n"
        );
        assert_eq!(rewrite.changes, 3);
        assert!(run(update_import_paths, &rewrite.content).is_none());
    }

    #[test]
    fn test_load_children_and_provided_in() {
        let routes = run(
            rewrite_load_children,
            "{ path: 'admin', loadChildren: './admin/admin.module#AdminModule' }",
        )
        .unwrap();
        assert_eq!(
            routes.content,
            "{ path: 'admin', loadChildren: () => import('./admin/admin.module').then(m => m.AdminModule) }"
        );

        let service = run(provide_in_root, "@Injectable()\nexport class S {}").unwrap();
        assert_eq!(service.content, "@Injectable({ providedIn: 'root' })\nexport class S {}");
        assert!(run(provide_in_root, &service.content).is_none());
    }

    #[test]
    fn test_unbalanced_constructor_is_error() {
        let manifest = ManifestSettings::default();
        let logger = MemoryLogger::new();
        let ctx = RuleContext { path: "a.ts", manifest: &manifest, logger: &logger };
        let result = replace_constructor_injection("constructor(private a: A) {", &ctx);
        assert!(matches!(result, Err(TransformError::Unbalanced { .. })));
    }

    #[test]
    fn test_split_top_level_respects_generics() {
        let parts = split_top_level("a: Map<string, number>, b: (x, y) => void", ',');
        assert_eq!(parts, vec!["a: Map<string, number>", " b: (x, y) => void"]);
    }

    #[test]
    fn test_apostrophe_in_comment_does_not_break_pairing() {
        let content = "export class A {\n  constructor(private svc: S) {\n    // don't call twice\n    this.svc.init(); /* it's fine */\n  }\n}\n";
        let rewrite = run(replace_constructor_injection, content).unwrap();

        assert!(rewrite.content.contains("  private svc = inject(S);\n\n  constructor() {\n    // don't call twice\n    this.svc.init(); /* it's fine */\n  }\n}\n"));
        assert_eq!(find_matching("{ // }\n }", 0, b'{', b'}'), Some(8));
        assert_eq!(split_top_level("a: A, /* x, y */ b: B", ','), vec!["a: A", " /* x, y */ b: B"]);
    }

    #[test]
    fn test_bare_parameter_reference_stays_in_constructor() {
        let only = "export class A {\n  constructor(private store: Store) {\n    store.dispatch(load());\n  }\n}";
        assert!(run(replace_constructor_injection, only).is_none());

        let mixed = "export class A {\n  constructor(private store: Store, private http: HttpClient) {\n    store.dispatch(load());\n  }\n}";
        let rewrite = run(replace_constructor_injection, mixed).unwrap();
        assert!(rewrite.content.contains(
            "export class A {\n  private http = inject(HttpClient);\n\n  constructor(private store: Store) {\n    store.dispatch(load());\n  }\n}"
        ));
        assert_eq!(rewrite.changes, 1);

        assert!(references_bare("store.dispatch(x)", "store"));
        assert!(!references_bare("this.store.dispatch(x)", "store"));
        assert!(!references_bare("storeKey = 1", "store"));
    }

    #[test]
    fn test_injected_fields_move_above_other_initializers() {
        let content = "export class A {\n  items$ = this.svc.items();\n\n  constructor(private svc: S) {}\n}\n";
        let rewrite = run(replace_constructor_injection, content).unwrap();
        assert_eq!(
            rewrite.content,
            "import { inject } from '@angular/core';\nexport class A {\n  private svc = inject(S);\n\n  items$ = this.svc.items();\n}\n"
        );

        let inline = run(replace_constructor_injection, "class B { constructor(private a: A) {} }").unwrap();
        assert!(inline.content.ends_with("class B { private a = inject(A); }"));
    }
}
