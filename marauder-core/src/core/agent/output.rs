use marauder_config::constants::execution::{
    MAX_TOOL_OUTPUT_CHARS, TOOL_OUTPUT_EDGE_LINES, TOOL_OUTPUT_LINE_THRESHOLD,
};

use crate::utils::text::{char_len, clip_chars};

/// Cap one tool result before it enters history.
pub fn cap_tool_output(result: &str) -> String {
    if char_len(result) <= MAX_TOOL_OUTPUT_CHARS {
        return result.to_owned();
    }

    let lines: Vec<&str> = result.split('\n').collect();
    if lines.len() > TOOL_OUTPUT_LINE_THRESHOLD {
        let omitted = lines.len() - 2 * TOOL_OUTPUT_EDGE_LINES;
        let head = lines[..TOOL_OUTPUT_EDGE_LINES].join("\n");
        let tail = lines[lines.len() - TOOL_OUTPUT_EDGE_LINES..].join("\n");
        return format!("{head}\n... ({omitted} lines omitted) ...\n{tail}");
    }

    format!(
        "{}\n...(output truncated)",
        clip_chars(result, MAX_TOOL_OUTPUT_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_output_is_untouched() {
        assert_eq!(cap_tool_output("ok"), "ok");
    }

    #[test]
    fn many_lines_keep_head_and_tail() {
        let lines: Vec<String> = (0..100).map(|i| format!("{i:04} {}", "#".repeat(60))).collect();
        let capped = cap_tool_output(&lines.join("\n"));
        let kept: Vec<&str> = capped.split('\n').collect();

        assert_eq!(kept.len(), 31);
        assert_eq!(kept[15], "... (70 lines omitted) ...");
        assert!(kept[0].starts_with("0000"));
        assert!(kept[30].starts_with("0099"));
    }

    #[test]
    fn few_long_lines_are_clipped() {
        let capped = cap_tool_output(&"x".repeat(5_000));
        assert_eq!(capped, format!("{}\n...(output truncated)", "x".repeat(3_000)));
    }
}
