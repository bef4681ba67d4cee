use std::path::Path;

/// 마커 파일 패턴과 백엔드 이름 한 쌍. `*.csproj`처럼 앞쪽 와일드카드를 지원한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendMarker {
    pub pattern: String,
    pub label: String,
}

impl BackendMarker {
    pub fn new(pattern: &str, label: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        match self.pattern.strip_prefix('*') {
            Some(suffix) => file_name.ends_with(suffix),
            None => file_name == self.pattern,
        }
    }
}

/// 프로젝트 옆에 있는 서버 측 생태계를 마커 파일로 추정한다
#[derive(Debug, Clone)]
pub struct BackendDetector {
    markers: Vec<BackendMarker>,
}

impl Default for BackendDetector {
    fn default() -> Self {
        Self::new(vec![
            BackendMarker::new("pom.xml", "Java (Maven)"),
            BackendMarker::new("build.gradle", "Java (Gradle)"),
            BackendMarker::new("build.gradle.kts", "Java (Gradle)"),
            BackendMarker::new("*.csproj", ".NET"),
            BackendMarker::new("requirements.txt", "Python"),
            BackendMarker::new("pyproject.toml", "Python"),
            BackendMarker::new("go.mod", "Go"),
            BackendMarker::new("Cargo.toml", "Rust"),
            BackendMarker::new("composer.json", "PHP"),
        ])
    }
}

impl BackendDetector {
    pub fn new(markers: Vec<BackendMarker>) -> Self {
        Self { markers }
    }

    pub fn with_marker(mut self, marker: BackendMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// 프로젝트 루트와 그 부모 디렉토리를 살펴 라벨 목록을 돌려준다 (중복 제거, 발견 순)
    pub fn detect(&self, root: &Path) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        let dirs = std::iter::once(root).chain(root.parent());

        for dir in dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            names.sort();

            for marker in &self.markers {
                if names.iter().any(|name| marker.matches(name)) && !labels.contains(&marker.label) {
                    labels.push(marker.label.clone());
                }
            }
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_markers_in_root_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let frontend = dir.path().join("frontend");
        std::fs::create_dir_all(&frontend).unwrap();
        std::fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        std::fs::write(frontend.join("Api.csproj"), "").unwrap();

        let labels = BackendDetector::default().detect(&frontend);
        assert_eq!(labels, vec![".NET".to_string(), "Java (Maven)".to_string()]);
    }

    #[test]
    fn test_custom_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mix.exs"), "").unwrap();

        let detector = BackendDetector::new(Vec::new()).with_marker(BackendMarker::new("mix.exs", "Elixir"));
        assert_eq!(detector.detect(dir.path()), vec!["Elixir".to_string()]);
    }
}
