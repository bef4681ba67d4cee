use serde_json::Value;
use crate::analyzer::line_number_at;

/// 의존성이 선언될 수 있는 package.json 섹션
pub const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies"];

pub fn parse_manifest(content: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(content)
}

/// 직접/개발 의존성에서 패키지를 찾아 (섹션, 버전)을 돌려준다
pub fn find_dependency<'a>(doc: &'a Value, name: &str) -> Option<(&'static str, &'a str)> {
    DEPENDENCY_SECTIONS.iter().find_map(|section| {
        doc.get(*section)
            .and_then(|deps| deps.get(name))
            .map(|version| (*section, version.as_str().unwrap_or("")))
    })
}

/// `^20.1.0`, `~20.0.0`, `>=20` 같은 범위 표기를 걷어낸 버전
pub fn strip_range(version: &str) -> &str {
    version.trim_start_matches(|c: char| matches!(c, '^' | '~' | '>' | '<' | '=' | 'v' | ' '))
}

/// 버전 문자열이 기대하는 메이저 버전으로 시작하는지
pub fn major_matches(version: &str, expected_major: &str) -> bool {
    let version = strip_range(version);
    match version.strip_prefix(expected_major) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// 원문에서 `"key":`가 처음 나오는 줄 번호
pub fn key_line(content: &str, key: &str) -> Option<usize> {
    let needle = format!("\"{}\"", key);
    let mut from = 0;
    while let Some(found) = content[from..].find(&needle) {
        let start = from + found;
        let after = &content[start + needle.len()..];
        if after.trim_start().starts_with(':') {
            return Some(line_number_at(content, start));
        }
        from = start + needle.len();
    }
    None
}
