use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::logging::{LogLevel, TeeLogger};
use crate::migration::{MigrationCoordinator, MigrationMode, MigrationOptions, ProjectReport};
use crate::renderer::{self, ReportFormat};
use crate::writer::{ChangeWriter, FileModifier, SafeFileModifier};

/// 콘솔 이슈 표에 보여줄 최대 건수
const ISSUE_TABLE_LIMIT: usize = 20;

/// CLI 인자를 실행 옵션으로 바꾼다. 잘못된 모드나 충돌하는 패턴은 여기서 걸러진다.
pub fn build_options(args: &RunArgs, default_mode: MigrationMode) -> Result<MigrationOptions> {
    let mode = match args.mode.as_deref() {
        Some(mode) => mode.parse::<MigrationMode>()?,
        None => default_mode,
    };

    let options = MigrationOptions {
        mode,
        exclude: args.exclude.clone(),
        include: args.include.clone(),
        generate_report: args.report.is_some(),
    };
    options.validate()?;
    Ok(options)
}

/// `--report`만 주면 설정의 기본 형식을 쓴다
pub fn report_format(args: &RunArgs, config: &Config) -> Result<Option<ReportFormat>> {
    let raw = match args.report.as_deref() {
        None => return Ok(None),
        Some("") => config.output.default_format.as_str(),
        Some(format) => format,
    };
    raw.parse::<ReportFormat>().map(Some).map_err(anyhow::Error::msg)
}

fn build_writer(args: &RunArgs, config: &Config, project: &Path) -> Arc<dyn ChangeWriter> {
    let modifier = FileModifier::new(args.auto_apply);
    if args.backup {
        let safe = SafeFileModifier::new(modifier, project.join(&config.output.backup_dir));
        println!("{} {}", "백업 위치:".dimmed(), safe.backup_root().display());
        Arc::new(safe)
    } else {
        Arc::new(modifier)
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 프로젝트 하나를 실행해 보고서를 돌려준다
pub async fn execute(
    project: &Path,
    options: MigrationOptions,
    args: &RunArgs,
    config: &Config,
) -> Result<ProjectReport> {
    let mode = options.mode;

    let logger = Arc::new(TeeLogger::new());
    let mut coordinator =
        MigrationCoordinator::new(options, config.engine.clone(), config.manifest.clone())
            .with_logger(logger.clone());
    if mode == MigrationMode::Migrate {
        coordinator = coordinator.with_writer(build_writer(args, config, project));
    }

    // 확인 프롬프트가 뜨는 동안에는 스피너를 돌리지 않는다
    let progress = (mode != MigrationMode::Migrate || args.auto_apply)
        .then(|| spinner(format!("{} 처리 중... ({})", project.display(), mode)));

    let result = coordinator.run(project).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result.with_context(|| format!("마이그레이션 실행 실패: {}", project.display()))?;

    let warnings = logger.memory().count_at_least(LogLevel::Warn);
    if warnings > 0 {
        println!(
            "{}",
            format!("⚠ 처리 중 경고 {}건 (자세한 내용은 --verbose)", warnings).yellow()
        );
    }
    Ok(report)
}

/// 보고서를 `<project>/<report_dir>`에 저장한다
pub fn save_report(report: &ProjectReport, format: ReportFormat, project: &Path, config: &Config) -> Result<PathBuf> {
    let dir = project.join(&config.output.report_dir);
    let path = renderer::write_report(report, format, &dir)?;
    Ok(path)
}

/// `generate_report`가 켜진 실행만 보고서를 렌더러에 넘긴다. 형식이 없으면 설정의 기본 형식.
pub fn deliver_report(
    report: &ProjectReport,
    options: &MigrationOptions,
    format: Option<ReportFormat>,
    project: &Path,
    config: &Config,
) -> Result<Option<PathBuf>> {
    if !options.generate_report {
        return Ok(None);
    }
    let format = match format {
        Some(format) => format,
        None => config
            .output
            .default_format
            .parse::<ReportFormat>()
            .map_err(anyhow::Error::msg)?,
    };
    save_report(report, format, project, config).map(Some)
}

/// `ngm migrate` / `ngm analyze`
pub async fn handle_run(
    project: &Path,
    args: &RunArgs,
    default_mode: MigrationMode,
    config: &Config,
) -> Result<()> {
    // 옵션과 형식 오류는 파일 작업 전에 알린다
    let options = build_options(args, default_mode)?;
    let format = report_format(args, config)?;

    println!(
        "{} {}",
        "🔍 Angular 마이그레이션:".bright_cyan().bold(),
        project.display()
    );

    let report = execute(project, options.clone(), args, config).await?;

    renderer::print_summary(&report);
    println!();
    renderer::print_issue_table(&report, ISSUE_TABLE_LIMIT);

    if let Some(path) = deliver_report(&report, &options, format, project, config)? {
        println!("\n{} {}", "📄 보고서 저장:".green(), path.display());
    }

    if report.metadata.mode == MigrationMode::DryRun && report.summary.pending_transformations > 0 {
        println!("\n{}", "변경 예정 파일:".yellow());
        for file in report.modified_files() {
            println!("  • {} ({}건)", file.path, file.transformations.len());
        }
        println!(
            "\n{}",
            format!(
                "dry-run이므로 파일은 바뀌지 않았습니다. 적용하려면: ngm migrate --path {}",
                project.display()
            )
            .dimmed()
        );
    }

    Ok(())
}
