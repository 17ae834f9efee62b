use super::types::DiffBundle;
use crate::host::FileChange;

/// Upper bound, in characters, on the diff text sent to the model.
pub const MAX_DIFF_CHARS: usize = 48_000;

pub const TRUNCATION_MARKER: &str = "\n...[truncated]...";

/// Assemble per-file patches into one unified-diff-like blob.
///
/// Each file with a non-empty patch becomes a `diff --git a/<path> b/<path>`
/// header followed by its patch; files without a patch (binary, rename-only)
/// are skipped. Chunks keep the input order and are separated by a blank line.
pub fn build_diff(files: &[FileChange]) -> DiffBundle {
    build_diff_with_limit(files, MAX_DIFF_CHARS)
}

fn build_diff_with_limit(files: &[FileChange], max_chars: usize) -> DiffBundle {
    let chunks: Vec<String> = files
        .iter()
        .filter_map(|file| {
            let patch = file.patch.as_deref().filter(|p| !p.is_empty())?;
            Some(format!(
                "diff --git a/{path} b/{path}\n{patch}",
                path = file.filename
            ))
        })
        .collect();

    truncate(chunks.join("\n\n"), max_chars)
}

/// Cut `text` so that, marker included, it stays within `max_chars` characters.
fn truncate(text: String, max_chars: usize) -> DiffBundle {
    if text.chars().count() <= max_chars {
        return DiffBundle {
            text,
            truncated: false,
        };
    }

    let marker: String = TRUNCATION_MARKER.chars().take(max_chars).collect();
    let keep = max_chars - marker.chars().count();
    let cut = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(idx, _)| idx);
    let mut truncated = text[..cut].to_string();
    truncated.push_str(&marker);

    DiffBundle {
        text: truncated,
        truncated: true,
    }
}
