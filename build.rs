use std::env;
use std::path::Path;

fn main() {
    if env::var("CARGO_FEATURE_AUTO_COMPLETE").is_ok() {
        println!("cargo:warning=자동완성을 설치하려면 설치 후 'ngm install'을 실행하세요.");
    }

    // 빌드 정보 저장
    println!("cargo:rustc-env=BUILD_TIME={}", chrono::Utc::now().to_rfc3339());

    let readme_path = Path::new("README.md");
    if readme_path.exists() {
        println!("cargo:rerun-if-changed=README.md");
    }
}
