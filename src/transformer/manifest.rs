use serde_json::Value;
use crate::analyzer::manifest::DEPENDENCY_SECTIONS;
use crate::error::TransformError;
use crate::transformer::types::{Rewrite, RuleContext, RuleResult};

/// package.json의 버전을 목표 버전으로 맞추고 더 이상 쓰지 않는 패키지를 지운다
///
/// 이미 선언된 패키지만 갱신한다. 키 순서와 마지막 줄바꿈은 유지된다.
pub fn update_dependency_versions(content: &str, ctx: &RuleContext) -> RuleResult {
    let mut doc: Value = serde_json::from_str(content).map_err(TransformError::ManifestParse)?;
    let mut changes = 0;

    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = doc.get_mut(*section).and_then(Value::as_object_mut) else {
            continue;
        };

        for (name, target) in &ctx.manifest.target_versions {
            if let Some(current) = deps.get_mut(name) {
                if current.as_str() != Some(target.as_str()) {
                    *current = Value::String(target.clone());
                    changes += 1;
                }
            }
        }

        for name in &ctx.manifest.obsolete_packages {
            if deps.shift_remove(name).is_some() {
                changes += 1;
            }
        }
    }

    if changes == 0 {
        return Ok(None);
    }

    let mut updated = serde_json::to_string_pretty(&doc).map_err(TransformError::ManifestSerialize)?;
    if content.ends_with('\n') {
        updated.push('\n');
    }
    Ok(Some(Rewrite::new(updated, changes)))
}
