use crate::types::StudyNotes;

/// Format study notes as human-readable markdown
pub fn format_notes_readable(notes: &StudyNotes) -> String {
    let mut output = String::new();

    output.push_str("## Summary\n\n");
    output.push_str(notes.summary.trim());
    output.push_str("\n\n");

    output.push_str("## Key Points\n\n");
    push_numbered(&mut output, &notes.key_points);

    output.push_str("## Exam Questions\n\n");
    push_numbered(&mut output, &notes.exam_questions);

    output
}

fn push_numbered(output: &mut String, items: &[String]) {
    if items.is_empty() {
        output.push_str("_None returned._\n\n");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, item.trim()));
    }
    output.push('\n');
}
