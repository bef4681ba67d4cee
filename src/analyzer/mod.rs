mod types;
pub mod classifier;
pub mod detector;
pub mod manifest;
pub mod discovery;
pub mod backend;

pub use types::*;
pub use classifier::classify;
pub use detector::PatternDetector;
pub use discovery::{FileDiscovery, SourceFile, WalkdirDiscovery};
pub use backend::{BackendDetector, BackendMarker};

/// 문자 오프셋의 1부터 시작하는 줄 번호
pub fn line_number_at(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number_at() {
        let content = "a\nbb\nccc";
        assert_eq!(line_number_at(content, 0), 1);
        assert_eq!(line_number_at(content, 2), 2);
        assert_eq!(line_number_at(content, 5), 3);
        assert_eq!(line_number_at(content, 999), 3);
    }
}
