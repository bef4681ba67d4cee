use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::error::{MigrationError, Result};

pub const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "dist", ".angular", "coverage", "tmp"];
pub const SOURCE_ROOT: &str = "src";
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "html", "css", "scss"];
pub const ROOT_MANIFESTS: &[&str] = &["package.json", "tsconfig.json", "angular.json"];

/// 디스크에서 읽어온 (상대 경로, 내용) 한 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// 프로젝트 루트에서 처리할 파일 목록을 만든다
pub trait FileDiscovery: Send + Sync {
    fn discover(&self, root: &Path) -> Result<Vec<SourceFile>>;
}

/// `src/` 아래 소스/템플릿/스타일과 루트의 세 매니페스트 파일을 찾는다
#[derive(Debug, Clone, Default)]
pub struct WalkdirDiscovery;

impl FileDiscovery for WalkdirDiscovery {
    fn discover(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if !root.exists() {
            return Err(MigrationError::ProjectNotFound { path: root.to_path_buf() });
        }
        if !root.is_dir() {
            return Err(MigrationError::NotADirectory { path: root.to_path_buf() });
        }

        let mut paths: Vec<PathBuf> = ROOT_MANIFESTS
            .iter()
            .map(|name| root.join(name))
            .filter(|path| path.is_file())
            .collect();

        let source_root = root.join(SOURCE_ROOT);
        if source_root.is_dir() {
            let mut sources = Vec::new();
            for entry in walk_source_files(&source_root) {
                let entry = entry?;
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    sources.push(entry.into_path());
                }
            }
            sources.sort();
            paths.extend(sources);
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            // 바이너리나 인코딩이 깨진 파일은 건너뛴다
            let Ok(content) = std::fs::read_to_string(&path) else {
                tracing::warn!(path = %path.display(), "UTF-8로 읽을 수 없는 파일 건너뜀");
                continue;
            };
            files.push(SourceFile {
                path: relative_path(root, &path),
                content,
            });
        }

        if files.is_empty() {
            return Err(MigrationError::NoMatchingFiles { path: root.to_path_buf() });
        }

        Ok(files)
    }
}

fn walk_source_files(root_path: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(root_path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !IGNORED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
        })
}

fn is_source_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".d.ts") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_sources_and_root_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/app")).unwrap();
        fs::create_dir_all(root.join("src/node_modules/x")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(root.join("src/app/app.component.ts"), "").unwrap();
        fs::write(root.join("src/app/app.component.html"), "").unwrap();
        fs::write(root.join("src/app/typings.d.ts"), "").unwrap();
        fs::write(root.join("src/node_modules/x/index.ts"), "").unwrap();

        let files = WalkdirDiscovery.discover(root).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(
            paths,
            vec!["package.json", "src/app/app.component.html", "src/app/app.component.ts"]
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = WalkdirDiscovery
            .discover(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, MigrationError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_empty_project_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = WalkdirDiscovery.discover(dir.path()).unwrap_err();
        assert!(matches!(err, MigrationError::NoMatchingFiles { .. }));
    }
}
