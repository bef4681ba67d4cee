use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manifest: ManifestSettings,
    pub engine: EngineSettings,
    pub output: OutputSettings,
}

/// package.json 검사/변환 정책
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSettings {
    pub core_package: String,
    pub expected_major: String,
    pub target_versions: BTreeMap<String, String>,
    pub obsolete_packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub concurrency: usize,
    pub batch_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub report_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub default_format: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        let angular = "^20.0.0";
        let target_versions = [
            ("@angular/animations", angular),
            ("@angular/common", angular),
            ("@angular/compiler", angular),
            ("@angular/core", angular),
            ("@angular/forms", angular),
            ("@angular/platform-browser", angular),
            ("@angular/platform-browser-dynamic", angular),
            ("@angular/router", angular),
            ("@angular/cli", angular),
            ("@angular/compiler-cli", angular),
            ("@angular-devkit/build-angular", angular),
            ("rxjs", "~7.8.0"),
            ("typescript", "~5.8.0"),
            ("zone.js", "~0.15.0"),
        ]
        .into_iter()
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .collect();

        Self {
            core_package: "@angular/core".to_string(),
            expected_major: "20".to_string(),
            target_versions,
            obsolete_packages: ["@angular/http", "rxjs-compat", "tslint", "codelyzer", "protractor"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            batch_delay_ms: 500,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("migration-reports"),
            backup_dir: PathBuf::from(".ngm_backups"),
            default_format: "html".to_string(),
        }
    }
}
