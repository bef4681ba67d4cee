use colored::*;
use figlet_rs::FIGfont;
use std::io::{self, Write};

pub fn display_splash() -> io::Result<()> {
    // Clear screen
    print!("\x1B[2J\x1B[1;1H");

    if let Ok(standard_font) = FIGfont::standard() {
        if let Some(figure) = standard_font.convert("NG MIGRATOR") {
            println!("{}", figure.to_string().bright_red().bold());
        }
    }

    println!("\n{}", "═══════════════════════════════════════════════════════════════════════".bright_blue());
    println!("{}", "    Angular 마이그레이션 도구 by IT신기술융합팀".bright_magenta());
    println!("{}", "═══════════════════════════════════════════════════════════════════════".bright_blue());

    println!("\n  {} 사용법:", "▸".bright_yellow());
    println!("    {} - 레거시 문법을 찾아 이슈로 보여줍니다.", "/analyze".bright_cyan());
    println!("    {} - 변환 결과를 미리 계산합니다. 파일은 바뀌지 않습니다.", "/dry-run".bright_cyan());
    println!("    {} - 변경마다 diff를 보고 적용 여부를 고릅니다.", "/migrate".bright_green());
    println!("    {} - 사용 가능한 모든 명령어를 확인합니다.", "/help".bright_magenta());

    println!("\n  {} 자동완성:", "▸".bright_yellow());
    println!("    {} (오른쪽 화살표) - 회색으로 표시되는 명령어를 완성합니다.", "→".bright_white());
    println!("    {} - 가능한 명령어 목록을 확인합니다.", "Tab".bright_white());

    println!("\n  {} Version {} (빌드 {}) | {}로 종료",
        "▸".bright_yellow(),
        env!("CARGO_PKG_VERSION").bright_white(),
        env!("BUILD_TIME").dimmed(),
        "/exit".bright_cyan()
    );

    io::stdout().flush()?;
    Ok(())
}
