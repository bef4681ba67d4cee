use serde_json::json;
use crate::logging::{Component, LogLevel, LogRecord};
use crate::transformer::types::{Rewrite, RuleContext, RuleResult};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// `*ngFor`에서 `$` 접두 변수로 옮겨지는 지역 변수
const LOOP_VARIABLES: &[&str] = &["index", "first", "last", "even", "odd", "count"];

#[derive(Debug, Clone)]
struct Attr {
    name: String,
    value: Option<String>,
    /// 앞쪽 공백 포함
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct Tag {
    name: String,
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
    attrs: Vec<Attr>,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name == name)
    }

    fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(&self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    NotOpening,
    Itself,
    At(usize),
    Unpaired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// 블록이 요소 전체를 감싼다 (`@if`, `@for`, `@case`)
    Around,
    /// 블록이 요소 안쪽에 들어간다 (`@switch`)
    Inside,
}

#[derive(Debug)]
struct Block {
    tag: usize,
    attr: usize,
    open: String,
    close: String,
    placement: Placement,
}

struct Edit {
    start: usize,
    end: usize,
    text: String,
}

type Planner = fn(&[Tag], &[Closing], &RuleContext) -> Vec<Block>;

/// `*ngIf` → `@if`
pub fn migrate_if_blocks(content: &str, ctx: &RuleContext) -> RuleResult {
    migrate(content, ctx, plan_if)
}

/// `*ngFor` → `@for`
pub fn migrate_for_blocks(content: &str, ctx: &RuleContext) -> RuleResult {
    migrate(content, ctx, plan_for)
}

/// `[ngSwitch]` / `*ngSwitchCase` / `*ngSwitchDefault` → `@switch` / `@case` / `@default`
pub fn migrate_switch_blocks(content: &str, ctx: &RuleContext) -> RuleResult {
    migrate(content, ctx, plan_switch)
}

fn migrate(content: &str, ctx: &RuleContext, plan: Planner) -> RuleResult {
    let tags = scan_tags(content);
    let closings = pair_tags(&tags);
    let blocks = plan(&tags, &closings, ctx);

    let mut edits = Vec::new();
    let mut changes = 0;

    for block in blocks {
        let tag = &tags[block.tag];
        let unwrap = tag.name == "ng-container" && tag.attrs.len() == 1;
        let stripped = strip_attr(content, tag, block.attr);
        let sep = line_indent(content, tag.start)
            .map(|indent| format!("\n{indent}"))
            .unwrap_or_default();

        match (closings[block.tag], block.placement) {
            (Closing::Itself, Placement::Around) => {
                let text = if unwrap {
                    format!("{}{}", block.open, block.close)
                } else {
                    format!("{}{sep}{stripped}{sep}{}", block.open, block.close)
                };
                edits.push(Edit { start: tag.start, end: tag.end, text });
            }
            (Closing::At(ci), placement) => {
                let close_tag = &tags[ci];
                let close_text = &content[close_tag.start..close_tag.end];
                let (open_text, close_replacement) = match (unwrap, placement) {
                    (true, _) => (block.open.clone(), block.close.clone()),
                    (false, Placement::Around) => (
                        format!("{}{sep}{stripped}", block.open),
                        format!("{close_text}{sep}{}", block.close),
                    ),
                    (false, Placement::Inside) => (
                        format!("{stripped}{}", block.open),
                        format!("{}{close_text}", block.close),
                    ),
                };
                edits.push(Edit { start: tag.start, end: tag.end, text: open_text });
                edits.push(Edit { start: close_tag.start, end: close_tag.end, text: close_replacement });
            }
            _ => {
                log_skipped(ctx, content, tag, "짝이 맞는 닫는 태그를 찾지 못해 건너뜀");
                continue;
            }
        }
        changes += 1;
    }

    if changes == 0 {
        return Ok(None);
    }
    Ok(Some(Rewrite::new(apply_edits(content, edits), changes)))
}

fn plan_if(tags: &[Tag], _closings: &[Closing], ctx: &RuleContext) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (idx, tag) in openings(tags) {
        let Some(attr) = tag.attr("*ngIf") else {
            continue;
        };
        let value = tag.attrs[attr].value.as_deref().unwrap_or("");
        match if_markers(value) {
            Some((open, close)) => blocks.push(Block { tag: idx, attr, open, close, placement: Placement::Around }),
            None => log_unsupported(ctx, tag, "*ngIf", value),
        }
    }
    blocks
}

fn plan_for(tags: &[Tag], _closings: &[Closing], ctx: &RuleContext) -> Vec<Block> {
    let mut blocks = Vec::new();
    for (idx, tag) in openings(tags) {
        let Some(attr) = tag.attr("*ngFor") else {
            continue;
        };
        let value = tag.attrs[attr].value.as_deref().unwrap_or("");
        match for_marker(value) {
            Some(open) => blocks.push(Block {
                tag: idx,
                attr,
                open,
                close: "}".to_string(),
                placement: Placement::Around,
            }),
            None => log_unsupported(ctx, tag, "*ngFor", value),
        }
    }
    blocks
}

fn plan_switch(tags: &[Tag], closings: &[Closing], ctx: &RuleContext) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut hosts: Vec<(usize, usize)> = Vec::new();

    for (idx, tag) in openings(tags) {
        let Some(attr) = tag.attr("[ngSwitch]") else {
            continue;
        };
        let expr = tag.attrs[attr].value.as_deref().unwrap_or("").trim();
        if expr.is_empty() {
            log_unsupported(ctx, tag, "[ngSwitch]", expr);
            continue;
        }
        if let Closing::At(close) = closings[idx] {
            hosts.push((idx, close));
        }
        blocks.push(Block {
            tag: idx,
            attr,
            open: format!("@switch ({expr}) {{"),
            close: "}".to_string(),
            placement: Placement::Inside,
        });
    }

    for (idx, tag) in openings(tags) {
        if tag.attr("[ngSwitch]").is_some() {
            continue;
        }
        let (attr, open) = if let Some(attr) = tag.attr("*ngSwitchCase") {
            let value = tag.attrs[attr].value.as_deref().unwrap_or("").trim();
            if value.is_empty() {
                log_unsupported(ctx, tag, "*ngSwitchCase", value);
                continue;
            }
            (attr, format!("@case ({value}) {{"))
        } else if let Some(attr) = tag.attr("*ngSwitchDefault") {
            (attr, "@default {".to_string())
        } else {
            continue;
        };

        // 변환되는 `[ngSwitch]` 안에 있는 case만 옮긴다
        if !hosts.iter().any(|&(open_idx, close_idx)| open_idx < idx && idx < close_idx) {
            ctx.logger.log(
                LogRecord::new(LogLevel::Warn, Component::Transformer, "ngSwitch 호스트 밖의 case는 건너뜀")
                    .with_path(ctx.path)
                    .with_payload(json!({ "offset": tag.start, "element": tag.name })),
            );
            continue;
        }
        blocks.push(Block { tag: idx, attr, open, close: "}".to_string(), placement: Placement::Around });
    }

    blocks
}

/// `cond`, `cond; else tpl`, `obs$ | async as v`, `obs$ | async; let v`
fn if_markers(value: &str) -> Option<(String, String)> {
    let parts = split_expression(value, &[';']);
    let (first, rest) = parts.split_first()?;

    let (mut condition, mut alias) = match first.rsplit_once(" as ") {
        Some((cond, name)) if is_identifier(name.trim()) => (cond.trim().to_string(), Some(name.trim().to_string())),
        _ => (first.to_string(), None),
    };
    let mut else_template = None;

    for part in rest {
        if let Some(tpl) = part.strip_prefix("else") {
            let tpl = tpl.trim();
            if !is_identifier(tpl) {
                return None;
            }
            else_template = Some(tpl.to_string());
        } else if let Some(name) = part.strip_prefix("let ") {
            let name = name.trim();
            if alias.is_some() || !is_identifier(name) {
                return None;
            }
            alias = Some(name.to_string());
        } else {
            // `then` 템플릿 등
            return None;
        }
    }

    if condition.is_empty() {
        return None;
    }
    if let Some(alias) = alias {
        condition = format!("{condition}; as {alias}");
    }

    let open = format!("@if ({condition}) {{");
    let close = match else_template {
        Some(tpl) => format!("}} @else {{<ng-container *ngTemplateOutlet=\"{tpl}\"></ng-container>}}"),
        None => "}".to_string(),
    };
    Some((open, close))
}

/// `let item of items; let i = index; trackBy: trackById`
fn for_marker(value: &str) -> Option<String> {
    let parts = split_expression(value, &[';', ',']);
    let (first, rest) = parts.split_first()?;

    let (item, collection) = first.strip_prefix("let ")?.split_once(" of ")?;
    let item = item.trim();
    let collection = collection.trim();
    if !is_identifier(item) || collection.is_empty() {
        return None;
    }

    let mut track = item.to_string();
    let mut bindings = Vec::new();

    for part in rest {
        if let Some(func) = part.strip_prefix("trackBy") {
            let func = func.trim_start().trim_start_matches(':').trim();
            if !is_identifier(func) {
                return None;
            }
            track = format!("{func}($index, {item})");
        } else if let Some(binding) = part.strip_prefix("let ") {
            let (name, local) = binding.split_once('=')?;
            bindings.push(loop_binding(name.trim(), local.trim())?);
        } else if let Some((local, name)) = part.split_once(" as ") {
            bindings.push(loop_binding(name.trim(), local.trim())?);
        } else {
            return None;
        }
    }

    let mut marker = format!("@for ({item} of {collection}; track {track}");
    for binding in bindings {
        marker.push_str("; ");
        marker.push_str(&binding);
    }
    marker.push_str(") {");
    Some(marker)
}

fn loop_binding(name: &str, local: &str) -> Option<String> {
    (is_identifier(name) && LOOP_VARIABLES.contains(&local)).then(|| format!("let {name} = ${local}"))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// 괄호와 문자열 바깥의 구분자로 나누고 앞뒤 공백을 자른다
fn split_expression<'a>(value: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last = 0;

    for (idx, c) in value.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if depth == 0 && separators.contains(&c) => {
                parts.push(value[last..idx].trim());
                last = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(value[last..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn openings(tags: &[Tag]) -> impl Iterator<Item = (usize, &Tag)> {
    tags.iter().enumerate().filter(|(_, tag)| !tag.closing)
}

/// 주석을 건너뛰고 속성 값 안의 `>`를 무시하며 태그를 훑는다
fn scan_tags(html: &str) -> Vec<Tag> {
    let bytes = html.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(b"<!--") {
            i = find_bytes(bytes, i + 4, b"-->").map(|p| p + 3).unwrap_or(bytes.len());
            continue;
        }
        if bytes[i] == b'<' {
            if let Some(tag) = parse_tag(html, i) {
                i = tag.end;
                tags.push(tag);
                continue;
            }
        }
        i += 1;
    }
    tags
}

fn parse_tag(html: &str, start: usize) -> Option<Tag> {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut j = start + 1;

    let closing = bytes.get(j) == Some(&b'/');
    if closing {
        j += 1;
    }
    if !bytes.get(j).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let name_start = j;
    while j < len && (bytes[j].is_ascii_alphanumeric() || matches!(bytes[j], b'-' | b'_' | b':' | b'.')) {
        j += 1;
    }
    let name = html[name_start..j].to_string();

    if closing {
        let end = find_bytes(bytes, j, b">")?;
        return Some(Tag { name, start, end: end + 1, closing: true, self_closing: false, attrs: Vec::new() });
    }

    let mut attrs = Vec::new();
    loop {
        let attr_start = j;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= len {
            return None;
        }
        match bytes[j] {
            b'>' => {
                return Some(Tag { name, start, end: j + 1, closing: false, self_closing: false, attrs });
            }
            b'/' if bytes.get(j + 1) == Some(&b'>') => {
                return Some(Tag { name, start, end: j + 2, closing: false, self_closing: true, attrs });
            }
            b'/' => {
                j += 1;
                continue;
            }
            _ => {}
        }

        let name_start = j;
        while j < len
            && !bytes[j].is_ascii_whitespace()
            && !matches!(bytes[j], b'=' | b'>' | b'/' | b'"' | b'\'')
        {
            j += 1;
        }
        if j == name_start {
            j += 1;
            continue;
        }
        let attr_name = html[name_start..j].to_string();

        let mut k = j;
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let mut value = None;
        if bytes.get(k) == Some(&b'=') {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            match bytes.get(k) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let close = find_bytes(bytes, k + 1, &[quote])?;
                    value = Some(html[k + 1..close].to_string());
                    j = close + 1;
                }
                Some(_) => {
                    let value_start = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        k += 1;
                    }
                    value = Some(html[value_start..k].to_string());
                    j = k;
                }
                None => return None,
            }
        }

        attrs.push(Attr { name: attr_name, value, start: attr_start, end: j });
    }
}

/// 요소 스택으로 여는 태그와 닫는 태그를 짝짓는다
fn pair_tags(tags: &[Tag]) -> Vec<Closing> {
    let mut closings = vec![Closing::NotOpening; tags.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (idx, tag) in tags.iter().enumerate() {
        if tag.closing {
            let found = stack
                .iter()
                .rposition(|&open| tags[open].name.eq_ignore_ascii_case(&tag.name));
            if let Some(pos) = found {
                // 그 위에 남은 요소들은 닫히지 않은 채로 둔다
                closings[stack[pos]] = Closing::At(idx);
                stack.truncate(pos);
            }
        } else if tag.is_void() {
            closings[idx] = Closing::Itself;
        } else {
            closings[idx] = Closing::Unpaired;
            stack.push(idx);
        }
    }
    closings
}

fn strip_attr(content: &str, tag: &Tag, attr: usize) -> String {
    let a = &tag.attrs[attr];
    format!("{}{}", &content[tag.start..a.start], &content[a.end..tag.end])
}

fn apply_edits(content: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut updated = content.to_string();
    for edit in edits {
        updated.replace_range(edit.start..edit.end, &edit.text);
    }
    updated
}

/// 태그가 줄의 처음(공백 뒤)에 있으면 그 들여쓰기
fn line_indent(content: &str, pos: usize) -> Option<&str> {
    let line_start = content[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &content[line_start..pos];
    prefix.chars().all(|c| c == ' ' || c == '\t').then_some(prefix)
}

fn find_bytes(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn log_skipped(ctx: &RuleContext, content: &str, tag: &Tag, message: &str) {
    ctx.logger.log(
        LogRecord::new(LogLevel::Warn, Component::Transformer, message)
            .with_path(ctx.path)
            .with_payload(json!({
                "element": tag.name,
                "line": crate::analyzer::line_number_at(content, tag.start),
            })),
    );
}

fn log_unsupported(ctx: &RuleContext, tag: &Tag, directive: &str, value: &str) {
    ctx.logger.log(
        LogRecord::new(LogLevel::Warn, Component::Transformer, "지원하지 않는 디렉티브 구문이라 건너뜀")
            .with_path(ctx.path)
            .with_payload(json!({ "directive": directive, "value": value, "offset": tag.start })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManifestSettings;
    use crate::logging::MemoryLogger;

    fn run(rule: fn(&str, &RuleContext) -> RuleResult, content: &str, logger: &MemoryLogger) -> Option<Rewrite> {
        let manifest = ManifestSettings::default();
        let ctx = RuleContext { path: "app.component.html", manifest: &manifest, logger };
        rule(content, &ctx).unwrap()
    }

    #[test]
    fn test_simple_if() {
        let logger = MemoryLogger::new();
        let rewrite = run(migrate_if_blocks, "<div *ngIf=\"cond\">x</div>", &logger).unwrap();
        assert_eq!(rewrite.content, "@if (cond) {\n<div>x</div>\n}");
        assert!(run(migrate_if_blocks, &rewrite.content, &logger).is_none());
    }

    #[test]
    fn test_nested_if_pairs_with_own_close_tag() {
        let logger = MemoryLogger::new();
        let content = "<div *ngIf=\"a\">\n  <div *ngIf=\"b\">x</div>\n</div>";
        let rewrite = run(migrate_if_blocks, content, &logger).unwrap();

        assert_eq!(rewrite.content, "@if (a) {\n<div>\n  @if (b) {\n  <div>x</div>\n  }\n</div>\n}");
        assert_eq!(rewrite.changes, 2);
    }

    #[test]
    fn test_inline_if_with_quoted_gt() {
        let logger = MemoryLogger::new();
        let content = "<p>Total: <button *ngIf=\"a > b\" (click)=\"go()\">Go</button></p>";
        let rewrite = run(migrate_if_blocks, content, &logger).unwrap();
        assert_eq!(rewrite.content, "<p>Total: @if (a > b) {<button (click)=\"go()\">Go</button>}</p>");
    }

    #[test]
    fn test_ng_container_unwrapped_with_else() {
        let logger = MemoryLogger::new();
        let content = "<ng-container *ngIf=\"user; else loading\">\n  {{ user.name }}\n</ng-container>";
        let rewrite = run(migrate_if_blocks, content, &logger).unwrap();
        assert_eq!(
            rewrite.content,
            "@if (user) {\n  {{ user.name }}\n} @else {<ng-container *ngTemplateOutlet=\"loading\"></ng-container>}"
        );
    }

    #[test]
    fn test_async_alias() {
        let logger = MemoryLogger::new();
        let rewrite = run(migrate_if_blocks, "<span *ngIf=\"user$ | async as user\">{{ user }}</span>", &logger).unwrap();
        assert!(rewrite.content.starts_with("@if (user$ | async; as user) {"));
    }

    #[test]
    fn test_then_clause_is_left_alone() {
        let logger = MemoryLogger::new();
        let content = "<div *ngIf=\"a; then yes else no\"></div>";
        assert!(run(migrate_if_blocks, content, &logger).is_none());
        assert_eq!(logger.count_at_least(LogLevel::Warn), 1);
    }

    #[test]
    fn test_void_element() {
        let logger = MemoryLogger::new();
        let rewrite = run(migrate_if_blocks, "<img *ngIf=\"src\" [src]=\"src\">", &logger).unwrap();
        assert_eq!(rewrite.content, "@if (src) {\n<img [src]=\"src\">\n}");
    }

    #[test]
    fn test_unpaired_element_is_skipped_and_logged() {
        let logger = MemoryLogger::new();
        assert!(run(migrate_if_blocks, "<div *ngIf=\"a\">\n<span>x</span>", &logger).is_none());
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warn);
        assert_eq!(records[0].path.as_deref(), Some("app.component.html"));
    }

    #[test]
    fn test_comments_are_ignored() {
        let logger = MemoryLogger::new();
        assert!(run(migrate_if_blocks, "<!-- <div *ngIf=\"x\"></div> -->", &logger).is_none());
    }

    #[test]
    fn test_for_with_index_and_track_by() {
        let logger = MemoryLogger::new();
        let content = "<ul>\n  <li *ngFor=\"let item of items; let i = index; trackBy: trackById\">{{ i }}</li>\n</ul>";
        let rewrite = run(migrate_for_blocks, content, &logger).unwrap();
        assert_eq!(
            rewrite.content,
            "<ul>\n  @for (item of items; track trackById($index, item); let i = $index) {\n  <li>{{ i }}</li>\n  }\n</ul>"
        );
        assert!(run(migrate_for_blocks, &rewrite.content, &logger).is_none());
    }

    #[test]
    fn test_for_index_as_alias() {
        assert_eq!(
            for_marker("let row of rows; index as idx").as_deref(),
            Some("@for (row of rows; track row; let idx = $index) {")
        );
        assert_eq!(for_marker("item of items"), None);
    }

    #[test]
    fn test_switch_inside_host() {
        let logger = MemoryLogger::new();
        let content = "<div [ngSwitch]=\"mode\">\n  <span *ngSwitchCase=\"'a'\">A</span>\n  <span *ngSwitchDefault>D</span>\n</div>";
        let rewrite = run(migrate_switch_blocks, content, &logger).unwrap();
        assert_eq!(
            rewrite.content,
            "<div>@switch (mode) {\n  @case ('a') {\n  <span>A</span>\n  }\n  @default {\n  <span>D</span>\n  }\n}</div>"
        );
        assert_eq!(rewrite.changes, 3);
        assert!(run(migrate_switch_blocks, &rewrite.content, &logger).is_none());
    }

    #[test]
    fn test_case_without_host_is_skipped() {
        let logger = MemoryLogger::new();
        assert!(run(migrate_switch_blocks, "<span *ngSwitchCase=\"1\">one</span>", &logger).is_none());
        assert_eq!(logger.count_at_least(LogLevel::Warn), 1);
    }

    #[test]
    fn test_pairing_skips_unclosed_inner_elements() {
        let tags = scan_tags("<div><p>text<br></div>");
        let closings = pair_tags(&tags);
        assert_eq!(closings[0], Closing::At(3));
        assert_eq!(closings[1], Closing::Unpaired);
        assert_eq!(closings[2], Closing::Itself);
    }
}
