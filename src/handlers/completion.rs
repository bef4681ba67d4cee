use anyhow::{Result, Context};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::Cli;

const BIN_NAME: &str = "ngm";
const RC_MARKER: &str = "# ng-migrator 자동완성";

/// 셸용 자동완성 스크립트
pub fn completion_script(shell: Shell) -> Result<String> {
    let mut cmd = Cli::command();
    let mut script = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut script);
    Ok(String::from_utf8(script)?)
}

/// `ngm completion <shell>`: 표준 출력으로 내보낸다
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
}

pub fn install_completions(shell: Option<Shell>) -> Result<()> {
    let shell = match shell {
        Some(shell) => shell,
        None => detect_shell(std::env::var("SHELL").ok().as_deref()),
    };

    println!("{} {}",
        "자동완성 설치 중:".bright_green(),
        format!("{shell:?}").cyan()
    );

    let script = completion_script(shell)?;
    let installed = match shell {
        Shell::Bash => install_bash_completion(&script)?,
        Shell::Zsh => install_zsh_completion(&script)?,
        Shell::PowerShell => install_powershell_completion(&script)?,
        Shell::Fish => install_fish_completion(&script)?,
        _ => anyhow::bail!("지원하지 않는 쉘입니다: {shell:?}"),
    };

    println!("{} {}", "✓ 자동완성 설치 완료:".green().bold(), installed.display());
    match shell {
        Shell::Bash => println!("  source ~/.bashrc"),
        Shell::Zsh => println!("  source ~/.zshrc"),
        Shell::PowerShell => println!("  . $PROFILE"),
        _ => {}
    }

    println!("\n{}", "사용 예시:".yellow());
    println!("  ngm <Tab>            # 서브커맨드 보기");
    println!("  ngm migrate --<Tab>  # migrate 옵션 보기");

    Ok(())
}

fn detect_shell(shell_env: Option<&str>) -> Shell {
    if cfg!(windows) {
        return Shell::PowerShell;
    }

    match shell_env {
        Some(shell) if shell.contains("zsh") => Shell::Zsh,
        Some(shell) if shell.contains("fish") => Shell::Fish,
        _ => Shell::Bash,
    }
}

/// rc 파일에 표식이 없을 때만 줄을 덧붙인다
fn append_once(rc_file: &Path, lines: &[String]) -> Result<()> {
    if rc_file.exists() {
        let content = std::fs::read_to_string(rc_file)?;
        if content.contains(RC_MARKER) {
            return Ok(());
        }
    } else if let Some(parent) = rc_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(rc_file)
        .with_context(|| format!("{} 열기 실패", rc_file.display()))?;
    writeln!(file, "\n{RC_MARKER}")?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(())
}

fn write_script(dir: PathBuf, file_name: &str, script: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, script)?;
    Ok(path)
}

fn install_bash_completion(script: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("홈 디렉토리를 찾을 수 없습니다")?;
    let dir = home.join(".local").join("share").join("bash-completion").join("completions");
    let path = write_script(dir, BIN_NAME, script)?;

    let bashrc = home.join(".bashrc");
    if bashrc.exists() {
        append_once(&bashrc, &[format!("[ -f {0} ] && source {0}", path.display())])?;
    }
    Ok(path)
}

fn install_zsh_completion(script: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("홈 디렉토리를 찾을 수 없습니다")?;
    let dir = home.join(".local").join("share").join("zsh").join("completions");
    let path = write_script(dir, &format!("_{BIN_NAME}"), script)?;

    let zshrc = home.join(".zshrc");
    if zshrc.exists() {
        append_once(&zshrc, &[
            "fpath=(~/.local/share/zsh/completions $fpath)".to_string(),
            "autoload -Uz compinit && compinit".to_string(),
        ])?;
    }
    Ok(path)
}

fn install_powershell_completion(script: &str) -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("설정 디렉토리를 찾을 수 없습니다")?
        .join("ng-migrator");
    let path = write_script(dir, "ngm-completion.ps1", script)?;

    if let Ok(profile) = std::env::var("PROFILE") {
        append_once(Path::new(&profile), &[format!(". \"{}\"", path.display())])?;
    }
    Ok(path)
}

fn install_fish_completion(script: &str) -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("설정 디렉토리를 찾을 수 없습니다")?
        .join("fish")
        .join("completions");
    write_script(dir, &format!("{BIN_NAME}.fish"), script)
}
