//! Render token arrays as shell-safe command lines

use core::str::FromStr;

use anyhow::Result;

use crate::error::IacError;

/// Output format for the rendered command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Single shell-escaped line
    Shell,
    /// One flag (with its value) per line, backslash-continued
    MultiLine,
    /// JSON array of tokens
    Json,
}

impl FromStr for OutputFormat {
    type Err = IacError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shell" => Ok(Self::Shell),
            "multiline" | "multi-line" => Ok(Self::MultiLine),
            "json" => Ok(Self::Json),
            _ => Err(IacError::invalid_value(
                "output format",
                s,
                "use 'shell', 'multiline' or 'json'",
            )),
        }
    }
}

/// Render tokens in the requested format
///
/// # Errors
///
/// Returns an error if the tokens cannot be serialized to JSON
#[inline]
pub fn render(tokens: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Shell => Ok(single_line(tokens)),
        OutputFormat::MultiLine => Ok(multi_line(tokens)),
        OutputFormat::Json => to_json(tokens),
    }
}

/// Tokens escaped individually and joined by single spaces
#[must_use]
pub fn single_line(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| shell_escape(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backslash-continued block
///
/// The executable sits alone on the first line. A flag shares its line
/// with the following token unless that token is itself a flag.
#[must_use]
pub fn multi_line(tokens: &[String]) -> String {
    let Some((executable, rest)) = tokens.split_first() else {
        return String::new();
    };

    let mut lines = vec![shell_escape(executable)];
    let mut index = 0;
    while let Some(token) = rest.get(index) {
        let mut line = shell_escape(token);
        index += 1;
        if is_flag(token)
            && let Some(value) = rest.get(index)
            && !is_flag(value)
        {
            line.push(' ');
            line.push_str(&shell_escape(value));
            index += 1;
        }
        lines.push(line);
    }

    lines.join(" \\\n  ")
}

/// Tokens as a compact JSON array
///
/// # Errors
///
/// Returns an error if serialization fails
#[inline]
pub fn to_json(tokens: &[String]) -> Result<String> {
    serde_json::to_string(tokens).map_err(|e| anyhow::anyhow!("Failed to serialize to JSON: {e}"))
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

/// Escape a token for shell display
///
/// Tokens containing whitespace, a quote, a backslash, `$` or a backtick are
/// wrapped in double quotes, with only inner double quotes backslash-escaped.
/// Everything else passes through untouched.
#[must_use]
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return r#""""#.to_owned();
    }

    let needs_quoting = s
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$' | '`'));
    if !needs_quoting {
        return s.to_owned();
    }

    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for ch in s.chars() {
        if ch == '"' {
            result.push('\\');
        }
        result.push(ch);
    }
    result.push('"');
    result
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn shell_escape_simple() {
        assert_eq!(shell_escape("simple"), "simple");
        assert_eq!(shell_escape("-var-file=env/prod.tfvars"), "-var-file=env/prod.tfvars");
        assert_eq!(shell_escape("region=us-east-1"), "region=us-east-1");
        assert_eq!(shell_escape("module.vpc[0]"), "module.vpc[0]");
    }

    #[test]
    fn shell_escape_special_chars() {
        assert_eq!(shell_escape("has space"), r#""has space""#);
        assert_eq!(shell_escape("has$dollar"), r#""has$dollar""#);
        assert_eq!(shell_escape(r#"has"quote"#), r#""has\"quote""#);
        assert_eq!(shell_escape("single'quote"), r#""single'quote""#);
        assert_eq!(shell_escape("back\\slash"), r#""back\slash""#);
        assert_eq!(shell_escape("tick`id`"), r#""tick`id`""#);
        assert_eq!(shell_escape("tab\there"), "\"tab\there\"");
        assert_eq!(shell_escape("a$b"), "\"a$b\"");
    }

    #[test]
    fn shell_escape_empty() {
        assert_eq!(shell_escape(""), r#""""#);
    }

    #[test]
    fn single_line_joins() {
        let rendered = single_line(&tokens(&["terraform", "plan", "-var", "name=my app"]));
        assert_eq!(rendered, r#"terraform plan -var "name=my app""#);
    }

    #[test]
    fn multi_line_pairs_flags_with_values() {
        let rendered = multi_line(&tokens(&[
            "terraform",
            "plan",
            "-var",
            "a=1",
            "-no-color",
            "-var-file=x.tfvars",
        ]));
        assert_eq!(
            rendered,
            "terraform \\\n  plan \\\n  -var a=1 \\\n  -no-color \\\n  -var-file=x.tfvars"
        );
    }

    #[test]
    fn multi_line_last_line_has_no_continuation() {
        let rendered = multi_line(&tokens(&["terraform", "apply", "-auto-approve", "plan.tfplan"]));
        assert!(!rendered.ends_with('\\'));
        assert_eq!(
            rendered,
            "terraform \\\n  apply \\\n  -auto-approve plan.tfplan"
        );
    }

    #[test]
    fn multi_line_executable_only() {
        assert_eq!(multi_line(&tokens(&["terraform"])), "terraform");
        assert_eq!(multi_line(&[]), "");
    }

    #[test]
    fn multi_line_escapes_like_single_line() {
        let rendered = multi_line(&tokens(&["terragrunt", "--terragrunt-source", "../my modules"]));
        assert_eq!(
            rendered,
            "terragrunt \\\n  --terragrunt-source \"../my modules\""
        );
    }

    #[test]
    fn json_is_compact_array() {
        let rendered = to_json(&tokens(&["terraform", "plan"])).unwrap();
        assert_eq!(rendered, r#"["terraform","plan"]"#);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("shell".parse::<OutputFormat>().unwrap(), OutputFormat::Shell);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "multi-line".parse::<OutputFormat>().unwrap(),
            OutputFormat::MultiLine
        );
        "yaml".parse::<OutputFormat>().unwrap_err();
    }
}
