//! Pipe-filter glue (§4.G): detects a trailing unescaped `|` on a parsed
//! tree, reruns the renderer unbounded, and pipes the result through a
//! shell command. Filter failures are never surfaced to the caller as
//! errors (§7.3) — they log and fall back to empty output, the same
//! posture the renderer itself takes toward unresolved symbols.

use fmt_core::Node;
use fmt_render::render;
use fmt_text::truncate_to_cols;
use std::process::Command;

/// Columns given to the renderer when building the command line for a
/// pipe render; effectively unbounded for any realistic format string.
const UNBOUNDED_COLS: u16 = 8192;

/// Render `tree` into `out`, never exceeding `max_cols` columns. If the
/// tree's last `Text` node ends in an unescaped `|`, the renderer first
/// runs unbounded, the trailing `|` is stripped, the result is handed to
/// `/bin/sh -c`, and the first line of its stdout (truncated to
/// `max_cols`) is emitted instead.
pub fn expando_filter(tree: &Node, data: &fmt_core::RenderData, max_cols: u16, out: &mut String) {
    if !ends_in_unescaped_pipe(tree) {
        render(tree, data, max_cols, out);
        return;
    }

    let mut command_line = String::new();
    render(tree, data, UNBOUNDED_COLS, &mut command_line);
    let command_line = command_line.strip_suffix('|').unwrap_or(&command_line);

    match run_filter(command_line) {
        Some(line) => {
            let (truncated, _) = truncate_to_cols(&line, max_cols);
            out.push_str(&truncated);
        }
        None => {}
    }
}

fn ends_in_unescaped_pipe(tree: &Node) -> bool {
    last_text(tree).is_some_and(|s| trailing_pipe_is_unescaped(s))
}

fn last_text(node: &Node) -> Option<&str> {
    match node {
        Node::Text(s) => Some(s),
        Node::Container { children, .. } => children.last().and_then(last_text),
        _ => None,
    }
}

fn trailing_pipe_is_unescaped(s: &str) -> bool {
    let Some(body) = s.strip_suffix('|') else {
        return false;
    };
    let backslashes = body.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 0
}

/// Run `command_line` through `/bin/sh -c` and return its first stdout
/// line with the trailing newline stripped. Returns `None` (and logs) on
/// spawn failure, a non-zero exit, or invalid UTF-8 output.
fn run_filter(command_line: &str) -> Option<String> {
    let output = match Command::new("/bin/sh").arg("-c").arg(command_line).output() {
        Ok(output) => output,
        Err(error) => {
            tracing::error!(target: "fmt_filter", %command_line, ?error, "failed to spawn filter shell");
            return None;
        }
    };

    if !output.status.success() {
        tracing::error!(
            target: "fmt_filter",
            %command_line,
            code = ?output.status.code(),
            "filter command exited non-zero"
        );
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(stdout.lines().next().unwrap_or("").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmt_core::{DefinitionTable, RenderData};

    #[test]
    fn plain_tree_with_no_trailing_pipe_renders_normally() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse("hello world", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 80, &mut out);
        assert_eq!(out, "hello world");
    }

    #[test]
    fn trailing_escaped_pipe_is_not_treated_as_a_filter() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse(r"echo HI\|", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 80, &mut out);
        assert_eq!(out, r"echo HI\|");
    }

    #[test]
    fn trailing_unescaped_pipe_runs_the_command_and_captures_first_line() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse("echo HI|", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 80, &mut out);
        assert_eq!(out, "HI");
    }

    #[test]
    fn pipe_output_is_truncated_to_max_cols() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse("printf 0123456789|", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 4, &mut out);
        assert_eq!(out, "0123");
    }

    #[test]
    fn pipe_output_keeps_only_the_first_line() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse(r"printf 'one\ntwo\n'|", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 80, &mut out);
        assert_eq!(out, "one");
    }

    #[test]
    fn nonzero_exit_status_yields_empty_output_not_an_error() {
        let defs = DefinitionTable::new(vec![]);
        let tree = fmt_parser::parse("exit 1|", &defs).unwrap();
        let data = RenderData::new();
        let mut out = String::new();
        expando_filter(&tree, &data, 80, &mut out);
        assert_eq!(out, "");
    }
}
