use regex::Regex;
use similar::TextDiff;

use crate::patch::PatchDescriptor;

const PREVIEW_CHARS: usize = 50;

pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Looks for where the target block probably went when it no longer matches
/// exactly. Never used to apply anything.
pub fn describe_miss(content: &str, descriptor: &PatchDescriptor) -> Option<String> {
    let replacement = Some(descriptor.new_text()).filter(|text| !text.is_empty());
    if let Some(offset) = replacement.and_then(|text| content.find(text)) {
        return Some(format!(
            "Replacement block already present at line {}; the patch appears to be applied",
            line_of(content, offset)
        ));
    }

    if let Some(offset) = find_ignoring_whitespace(content, descriptor.old_text()) {
        return Some(format!(
            "Target block matches at line {} only when whitespace is ignored (indentation or line endings differ)",
            line_of(content, offset)
        ));
    }

    let first_line = descriptor
        .old_text()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?;

    content
        .lines()
        .position(|line| line.trim() == first_line)
        .map(|index| {
            format!(
                "First line of the target block found at line {}; the file diverges after it",
                index + 1
            )
        })
}

fn find_ignoring_whitespace(content: &str, block: &str) -> Option<usize> {
    let tokens: Vec<String> = block.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return None;
    }

    let pattern = Regex::new(&tokens.join(r"\s+")).ok()?;
    pattern.find(content).map(|m| m.start())
}

pub fn print_miss(descriptor: &PatchDescriptor, hint: Option<&str>) {
    println!("Error: Target block not found in file.");
    println!("Target start: {}", preview(descriptor.old_text()));
    if let Some(hint) = hint {
        println!("💡 {}", hint);
    }
}

pub fn print_diff(old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    print!(
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header("original", "patched")
    );
}
