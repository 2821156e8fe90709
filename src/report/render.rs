// Plain-text page renderer
//
// Stands in for the external document renderer: one fixed-width text block
// per page, form feed between pages. The byte output is deterministic for a
// deterministic layout, which is all the export contract asks of this side.

use std::fmt::Write as _;

use crate::model::{GroupKind, Metric};

use super::{Page, PageItem};

/// Render laid-out pages to a byte-stream document
pub fn render_text(client_name: &str, pages: &[Page]) -> Vec<u8> {
    let total = pages.len();
    let mut out = String::new();

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            out.push('\x0c'); // form feed = page break
        }
        // header/footer line; writing to a String cannot fail
        let _ = writeln!(
            out,
            "Training report - {client_name}  (page {} of {total})",
            index + 1
        );
        out.push('\n');

        for item in &page.items {
            match item {
                PageItem::SessionHeader {
                    workout_name,
                    completed,
                    continued,
                    ..
                } => {
                    let status = if *completed { "[done]" } else { "[open]" };
                    let cont = if *continued { " (continued)" } else { "" };
                    let _ = writeln!(out, "== {workout_name} {status}{cont}");
                }
                PageItem::GroupHeader {
                    display_number,
                    kind,
                } => {
                    let label = match kind {
                        GroupKind::Superset => "Superset",
                        GroupKind::Circuit => "Circuit",
                    };
                    let _ = writeln!(out, "  {display_number}. {label}:");
                }
                PageItem::ExerciseRow {
                    display_number,
                    name,
                    sets,
                    metric,
                    weight,
                    ..
                } => {
                    let measure = match metric {
                        Metric::Reps(reps) => format!("{sets}x{reps}"),
                        Metric::Time(secs) => format!("{sets}x{secs}s"),
                    };
                    let _ = writeln!(
                        out,
                        "  {display_number}. {name:<24} {measure:>8} @ {weight:.1}kg"
                    );
                }
            }
        }
    }

    out.into_bytes()
}
