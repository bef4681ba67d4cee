use crate::analyzer::types::FileType;

pub const MANIFEST_FILE: &str = "package.json";
pub const TSCONFIG_FILE: &str = "tsconfig.json";
pub const WORKSPACE_FILE: &str = "angular.json";

/// 경로와 내용만으로 파일 역할을 결정한다. 항상 하나의 값을 돌려준다.
///
/// 파일 이름 규칙이 내용 검사보다 우선하며, 내용은 이름으로 판단할 수 없는
/// 스크립트 파일에만 사용한다.
pub fn classify(path: &str, content: &str) -> FileType {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path).to_lowercase();

    if file_name == MANIFEST_FILE {
        return FileType::DependencyManifest;
    }
    if is_project_config(&file_name) {
        return FileType::Other;
    }

    let extension = file_name.rfind('.').map(|idx| &file_name[idx + 1..]);

    if let Some(file_type) = classify_by_name(&file_name, extension) {
        return file_type;
    }

    match extension {
        Some("html") => FileType::Template,
        Some("ts") | None => classify_by_content(content),
        _ => FileType::Other,
    }
}

pub fn is_project_config(file_name: &str) -> bool {
    file_name == WORKSPACE_FILE
        || (file_name.starts_with("tsconfig") && file_name.ends_with(".json"))
}

fn classify_by_name(file_name: &str, extension: Option<&str>) -> Option<FileType> {
    if !matches!(extension, Some("ts") | Some("html")) {
        return None;
    }

    if file_name.contains("-routing.module.") || file_name.contains(".routes.") {
        return Some(FileType::RoutingDescriptor);
    }
    if file_name.contains(".component.") {
        return Some(if extension == Some("html") {
            FileType::Template
        } else {
            FileType::UiComponent
        });
    }
    if extension == Some("html") {
        return None;
    }
    if file_name.contains(".service.") {
        return Some(FileType::Service);
    }
    if file_name.contains(".module.") {
        return Some(FileType::ModuleDescriptor);
    }
    None
}

fn classify_by_content(content: &str) -> FileType {
    if content.contains("@Component(") {
        FileType::UiComponent
    } else if content.contains("@Injectable(") {
        FileType::Service
    } else if content.contains("RouterModule.for") || content.contains(": Routes") {
        FileType::RoutingDescriptor
    } else if content.contains("@NgModule(") {
        FileType::ModuleDescriptor
    } else {
        FileType::Other
    }
}
