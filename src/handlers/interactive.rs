use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use crate::{
    cli::RunArgs,
    config::Config,
    migration::{MigrationMode, ProjectReport},
    renderer::{self, MarkdownRenderer, ReportFormat},
    splash::display_splash,
};
use super::migrate::{build_options, execute, save_report};
use rustyline::error::ReadlineError;
use rustyline::{Editor, CompletionType, Config as RustyConfig, EditMode, Cmd, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::{Validator, MatchingBracketValidator};
use rustyline::{Context as RustyContext, Helper};

const COMMANDS: &[&str] = &[
    "/analyze", "/dry-run", "/migrate", "/report", "/summary",
    "/issues", "/path", "/config", "/help", "/clear", "/exit",
];

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Run(MigrationMode),
    Report(Option<String>),
    Summary,
    Issues,
    Path(Option<PathBuf>),
    Config,
    Help,
    Clear,
    Exit,
    Unknown(String),
}

/// 앞의 '/'는 있어도 없어도 된다
fn parse_command(input: &str) -> ReplCommand {
    let input = input.trim().trim_start_matches('/');
    let mut parts = input.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match name {
        "a" | "analyze" => ReplCommand::Run(MigrationMode::Analyze),
        "d" | "dry-run" | "dryrun" => ReplCommand::Run(MigrationMode::DryRun),
        "m" | "migrate" => ReplCommand::Run(MigrationMode::Migrate),
        "report" => ReplCommand::Report(arg.map(String::from)),
        "s" | "summary" => ReplCommand::Summary,
        "i" | "issues" => ReplCommand::Issues,
        "path" | "cd" => ReplCommand::Path(arg.map(PathBuf::from)),
        "config" => ReplCommand::Config,
        "h" | "help" => ReplCommand::Help,
        "clear" | "cls" => ReplCommand::Clear,
        "q" | "exit" | "quit" => ReplCommand::Exit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

struct NgmHelper {
    completer: FilenameCompleter,
    highlighter: MatchingBracketHighlighter,
    validator: MatchingBracketValidator,
    hinter: HistoryHinter,
}

impl NgmHelper {
    fn new() -> Self {
        Self {
            completer: FilenameCompleter::new(),
            highlighter: MatchingBracketHighlighter::new(),
            validator: MatchingBracketValidator::new(),
            hinter: HistoryHinter {},
        }
    }
}

impl Completer for NgmHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, ctx: &RustyContext<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with('/') && !line.contains(' ') {
            let matches = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return Ok((0, matches));
        }
        // /path 뒤에서는 경로 자동완성
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for NgmHelper {
    type Hint = String;
    fn hint(&self, line: &str, pos: usize, ctx: &RustyContext<'_>) -> Option<String> {
        if pos < line.len() { return None; }

        if line.starts_with('/') {
            if let Some(cmd) = COMMANDS.iter().find(|cmd| cmd.starts_with(line) && cmd.len() > line.len()) {
                return Some(cmd[pos..].to_string());
            }
        }

        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for NgmHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, _default: bool) -> std::borrow::Cow<'b, str> {
        std::borrow::Cow::Owned(prompt.bright_red().bold().to_string())
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> std::borrow::Cow<'h, str> {
        std::borrow::Cow::Owned(hint.dimmed().to_string())
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}

impl Validator for NgmHelper {
    fn validate(&self, ctx: &mut rustyline::validate::ValidationContext) -> rustyline::Result<rustyline::validate::ValidationResult> {
        self.validator.validate(ctx)
    }
    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

impl Helper for NgmHelper {}

fn print_help() {
    println!("\n{}", "사용 가능한 명령어:".bright_cyan().bold());
    let rows = [
        ("/analyze (a)", "이슈만 분석"),
        ("/dry-run (d)", "변환 결과를 미리 계산 (파일은 그대로)"),
        ("/migrate (m)", "변환을 확인 후 파일에 적용"),
        ("/report [형식]", "마지막 결과를 보고서로 저장 (json, yaml, markdown, html)"),
        ("/summary (s)", "마지막 결과를 Markdown으로 보기"),
        ("/issues (i)", "마지막 결과의 이슈 표"),
        ("/path <디렉토리>", "대상 프로젝트 변경 (인자 없으면 현재 경로 출력)"),
        ("/config", "현재 설정 보기"),
        ("/clear", "화면 지우기"),
        ("/exit (q)", "종료"),
    ];
    for (cmd, desc) in rows {
        println!("  {:<20} {}", cmd.bright_green(), desc);
    }
}

struct Session {
    project: PathBuf,
    last_report: Option<ProjectReport>,
}

impl Session {
    fn require_report(&self) -> Option<&ProjectReport> {
        if self.last_report.is_none() {
            println!("{}", "먼저 /analyze, /dry-run 또는 /migrate를 실행하세요.".yellow());
        }
        self.last_report.as_ref()
    }
}

/// 한 명령을 처리한다. `false`를 돌려주면 루프를 끝낸다.
async fn dispatch(command: ReplCommand, session: &mut Session, config: &Config) -> Result<bool> {
    match command {
        ReplCommand::Run(mode) => {
            let args = RunArgs::default();
            let options = build_options(&args, mode)?;
            match execute(&session.project, options, &args, config).await {
                Ok(report) => {
                    renderer::print_summary(&report);
                    session.last_report = Some(report);
                }
                Err(e) => println!("{} {:#}", "오류:".red(), e),
            }
        }
        ReplCommand::Report(format) => {
            let raw = format.unwrap_or_else(|| config.output.default_format.clone());
            let format = match raw.parse::<ReportFormat>() {
                Ok(format) => format,
                Err(e) => {
                    println!("{} {}", "오류:".red(), e);
                    return Ok(true);
                }
            };
            if let Some(report) = session.require_report() {
                let path = save_report(report, format, &session.project, config)?;
                println!("{} {}", "📄 보고서 저장:".green(), path.display());
            }
        }
        ReplCommand::Summary => {
            if let Some(report) = session.require_report() {
                MarkdownRenderer::new().render_markdown(&renderer::to_markdown(report));
            }
        }
        ReplCommand::Issues => {
            if let Some(report) = session.require_report() {
                renderer::print_issue_table(report, usize::MAX);
            }
        }
        ReplCommand::Path(None) => {
            println!("{} {}", "대상 프로젝트:".dimmed(), session.project.display());
        }
        ReplCommand::Path(Some(path)) => {
            if path.is_dir() {
                session.project = path;
                session.last_report = None;
                println!("{} {}", "대상 프로젝트 변경:".green(), session.project.display());
            } else {
                println!("{} 디렉토리가 아닙니다: {}", "오류:".red(), path.display());
            }
        }
        ReplCommand::Config => println!("{}", config.display()),
        ReplCommand::Help => print_help(),
        ReplCommand::Clear => print!("\x1B[2J\x1B[1;1H"),
        ReplCommand::Exit => return Ok(false),
        ReplCommand::Unknown(name) => {
            println!("{} 알 수 없는 명령어: {} (/help 참고)", "⚠".yellow(), name);
        }
    }
    Ok(true)
}

/// `ngm interactive`
pub async fn handle_interactive(project: PathBuf, config: &Config) -> Result<()> {
    let rusty_config = RustyConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut rl = Editor::with_config(rusty_config)?;
    rl.set_helper(Some(NgmHelper::new()));
    rl.bind_sequence(
        KeyEvent(KeyCode::Right, Modifiers::NONE),
        EventHandler::Simple(Cmd::CompleteHint),
    );

    let history_path = dirs::data_dir()
        .map(|p| p.join("ng-migrator").join("history.txt"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    display_splash()?;
    println!("\n{} {}", "대상 프로젝트:".dimmed(), project.display());

    let mut session = Session { project, last_report: None };

    loop {
        match rl.readline("ngm> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;

                if !dispatch(parse_command(input), &mut session, config).await? {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "\n중단되었습니다.".yellow());
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("오류: {err:?}");
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }
    println!("{}", "종료합니다.".dimmed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/analyze"), ReplCommand::Run(MigrationMode::Analyze));
        assert_eq!(parse_command("d"), ReplCommand::Run(MigrationMode::DryRun));
        assert_eq!(parse_command("/report md"), ReplCommand::Report(Some("md".to_string())));
        assert_eq!(parse_command("/report   "), ReplCommand::Report(None));
        assert_eq!(parse_command("/path ../shop"), ReplCommand::Path(Some(PathBuf::from("../shop"))));
        assert_eq!(parse_command("quit"), ReplCommand::Exit);
        assert_eq!(parse_command("/deploy"), ReplCommand::Unknown("deploy".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_keeps_last_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/styles.css"), "body {}\n").unwrap();

        let config = Config::default();
        let mut session = Session { project: dir.path().to_path_buf(), last_report: None };

        let keep_going = dispatch(ReplCommand::Run(MigrationMode::Analyze), &mut session, &config)
            .await
            .unwrap();
        assert!(keep_going);
        assert_eq!(session.last_report.as_ref().unwrap().summary.total_files, 1);

        assert!(!dispatch(ReplCommand::Exit, &mut session, &config).await.unwrap());
    }
}
