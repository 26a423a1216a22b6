use std::path::{Path, PathBuf};

/// Replace `{w}`, `{h}` and `{fps}` in a tag template. Whitespace inside the
/// braces is tolerated; unknown placeholders are left as written.
pub fn resolve_name_tags(template: &str, width: u32, height: u32, fps: f64) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        match after[..close].trim() {
            "w" => out.push_str(&width.to_string()),
            "h" => out.push_str(&height.to_string()),
            "fps" => out.push_str(&fps.to_string()),
            _ => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// `{dir}/{name}_{index}.png`
pub fn sequence_path(dir: &Path, name: &str, index: usize) -> PathBuf {
    dir.join(format!("{name}_{index}.png"))
}

/// `{dir}/{name}{tags}.{extension}`
pub fn tagged_path(dir: &Path, name: &str, tags: &str, extension: &str) -> PathBuf {
    dir.join(format!("{name}{tags}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_resolve() {
        assert_eq!(resolve_name_tags(",w{w},h{h},fps{fps}", 64, 32, 10.0), ",w64,h32,fps10");
        assert_eq!(resolve_name_tags("_{ w }x{h  }@{ fps}", 8, 8, 12.5), "_8x8@12.5");
    }

    #[test]
    fn test_unknown_or_unclosed_tags_pass_through() {
        assert_eq!(resolve_name_tags("{x}-{w}", 16, 16, 1.0), "{x}-16");
        assert_eq!(resolve_name_tags("-{w", 16, 16, 1.0), "-{w");
        assert_eq!(resolve_name_tags("", 16, 16, 1.0), "");
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("/out");
        assert_eq!(sequence_path(dir, "frame", 3), PathBuf::from("/out/frame_3.png"));
        assert_eq!(tagged_path(dir, "walk", ",w8", "gif"), PathBuf::from("/out/walk,w8.gif"));
    }
}
