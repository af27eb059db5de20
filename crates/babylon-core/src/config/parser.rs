//! TOML parser with helpful error messages

use super::schema::BabylonConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse babylon.toml with detailed error messages
pub fn parse_babylon_toml(path: &Path) -> Result<BabylonConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_babylon_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse babylon.toml content from string
pub fn parse_babylon_toml_str(content: &str) -> Result<BabylonConfig> {
    let config: BabylonConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Attach the offending lines to a TOML parsing error
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    let line_hint = error
        .span()
        .map(|span| content[..span.start.min(content.len())].lines().count().max(1));

    match line_hint {
        Some(line_num) => anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            get_line_context(content, line_num),
            message
        ),
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines
        .get(start..end)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DEFAULT_HEADER_LINES;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_babylon_toml_str("").unwrap();
        assert_eq!(config, BabylonConfig::default());
        assert_eq!(config.apply.header_lines, DEFAULT_HEADER_LINES);
        assert!(!config.apply.keep_going);
    }

    #[test]
    fn test_parse_overrides() {
        let toml = r#"
[apply]
header_lines = 12
keep_going = true

[http]
timeout_secs = 5
"#;
        let config = parse_babylon_toml_str(toml).unwrap();
        assert_eq!(config.apply.header_lines, 12);
        assert!(config.apply.keep_going);
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.http.user_agent.starts_with("babylon/"));
    }

    #[test]
    fn test_zero_header_lines_rejected() {
        let err = parse_babylon_toml_str("[apply]\nheader_lines = 0\n").unwrap_err();
        assert!(err.to_string().contains("header_lines"));
    }

    #[test]
    fn test_invalid_arm_endpoint_rejected() {
        let err = parse_babylon_toml_str("[azure]\narm_endpoint = \"not a url\"\n").unwrap_err();
        assert!(err.to_string().contains("arm_endpoint"));
    }

    #[test]
    fn test_syntax_error_points_at_line() {
        let toml = "[apply]\nheader_lines = 7\nkeep_going = maybe\n";
        let err = parse_babylon_toml_str(toml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "unexpected message: {msg}");
        assert!(msg.contains(">>>"));
    }
}
