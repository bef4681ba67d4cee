use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use crate::handlers::config::ConfigAction;

#[derive(Parser)]
#[clap(name = "ngm")]
#[clap(about = "Angular 프로젝트 마이그레이션 CLI (NgModule → standalone, 제어 흐름 블록, inject())", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// 상세 로그 출력 (RUST_LOG가 있으면 그 값을 따름)
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

/// migrate/analyze/batch가 공유하는 실행 옵션
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// 실행 모드 (analyze, migrate, dry-run). 생략하면 서브커맨드 기본값
    #[clap(short, long)]
    pub mode: Option<String>,

    /// 확인 없이 모든 변경을 적용
    #[clap(long)]
    pub auto_apply: bool,

    /// 쓰기 전에 원본을 백업
    #[clap(long)]
    pub backup: bool,

    /// 보고서 생성 (json, yaml, markdown, html). 형식을 생략하면 설정의 기본 형식
    #[clap(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "")]
    pub report: Option<String>,

    /// 변환에서 제외할 경로 패턴 (쉼표 구분)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// 이 패턴이 포함된 경로만 변환 (쉼표 구분)
    #[clap(long, value_delimiter = ',')]
    pub include: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 프로젝트를 분석하고 변환을 적용
    Migrate {
        /// Angular 프로젝트 루트
        #[clap(short, long, default_value = ".")]
        path: PathBuf,

        #[clap(flatten)]
        args: RunArgs,
    },

    /// 파일을 바꾸지 않고 이슈만 분석
    Analyze {
        /// Angular 프로젝트 루트
        #[clap(short, long, default_value = ".")]
        path: PathBuf,

        #[clap(flatten)]
        args: RunArgs,
    },

    /// 여러 프로젝트를 차례로 처리
    Batch {
        /// 처리할 프로젝트 목록. 생략하면 --path 아래에서 package.json이 있는 디렉토리를 찾음
        projects: Vec<PathBuf>,

        /// 프로젝트를 찾을 상위 디렉토리
        #[clap(short, long, default_value = ".")]
        path: PathBuf,

        #[clap(flatten)]
        args: RunArgs,
    },

    /// 대화형 모드
    Interactive {
        /// Angular 프로젝트 루트
        #[clap(short, long, default_value = ".")]
        path: PathBuf,
    },

    /// 설정 관리
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },

    /// 셸 자동완성 스크립트 출력
    Completion {
        /// 셸 종류
        #[clap(value_enum)]
        shell: Shell,
    },

    /// 자동완성 설치
    Install {
        /// 셸 종류 (생략하면 자동 감지)
        #[clap(value_enum)]
        shell: Option<Shell>,
    },
}
