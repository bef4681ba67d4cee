use anyhow::{Result, anyhow};
use crate::config::types::Config;
use crate::renderer::ReportFormat;

pub fn validate_config(config: &Config) -> Result<()> {
    let manifest = &config.manifest;

    if manifest.core_package.trim().is_empty() {
        return Err(anyhow!("manifest.core_package는 비어 있을 수 없습니다"));
    }

    if manifest.expected_major.is_empty()
        || !manifest.expected_major.chars().all(|c| c.is_ascii_digit())
    {
        return Err(anyhow!(
            "manifest.expected_major는 숫자여야 합니다: {}",
            manifest.expected_major
        ));
    }

    if let Some(name) = manifest
        .obsolete_packages
        .iter()
        .find(|name| manifest.target_versions.contains_key(*name))
    {
        return Err(anyhow!(
            "{}이(가) target_versions와 obsolete_packages에 동시에 있습니다",
            name
        ));
    }

    if config.engine.concurrency == 0 {
        return Err(anyhow!("engine.concurrency는 0보다 커야 합니다"));
    }

    config
        .output
        .default_format
        .parse::<ReportFormat>()
        .map_err(|e| anyhow!("output.default_format: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_numeric_major() {
        let mut config = Config::default();
        config.manifest.expected_major = "v20".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_package_both_targeted_and_obsolete() {
        let mut config = Config::default();
        config.manifest.obsolete_packages.push("rxjs".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_report_format() {
        let mut config = Config::default();
        config.output.default_format = "pdf".to_string();
        assert!(validate_config(&config).is_err());
    }
}
