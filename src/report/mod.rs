//! Report paginator - lays a session list out across fixed-height pages
//!
//! Consumes a finalized session list off the mutation path and decides where
//! the page breaks go. The actual document encoding is a collaborator's
//! concern (the `render` submodule ships a plain-text renderer); page-break
//! placement is the contract owned here: greedy top-to-bottom fill, an
//! exercise row is never split, and a session whose exercise list overflows
//! continues on the next page under a repeated header.

use crate::grouping::{compute_numbering, is_first_in_group};
use crate::model::{ExerciseId, GroupKind, Metric, Session, SessionId};

mod render;

pub use render::render_text;

/// Block heights in abstract layout units. Fixed constants in, identical
/// page breaks out - layout must be deterministic and order-stable.
#[derive(Debug, Clone)]
pub struct LayoutMetrics {
    /// Content height budget of one page
    pub page_height: u32,
    /// Height of a session header block
    pub session_base: u32,
    /// Height of one exercise row
    pub exercise_row: u32,
    /// Height of a group (superset/circuit) header line
    pub circuit_header: u32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            page_height: 720,
            session_base: 48,
            exercise_row: 24,
            circuit_header: 18,
        }
    }
}

/// One laid-out block on a page
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    SessionHeader {
        session_id: SessionId,
        workout_name: String,
        completed: bool,
        /// True when this header repeats a session split from the
        /// previous page
        continued: bool,
    },
    GroupHeader {
        display_number: u32,
        kind: GroupKind,
    },
    ExerciseRow {
        exercise_id: ExerciseId,
        display_number: u32,
        name: String,
        sets: u32,
        metric: Metric,
        weight: f64,
    },
}

/// A filled page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PageItem>,
}

struct PageBuilder {
    metrics: LayoutMetrics,
    pages: Vec<Page>,
    current: Page,
    used: u32,
}

impl PageBuilder {
    fn new(metrics: LayoutMetrics) -> Self {
        Self {
            metrics,
            pages: Vec::new(),
            current: Page::default(),
            used: 0,
        }
    }

    fn fits(&self, height: u32) -> bool {
        self.used + height <= self.metrics.page_height
    }

    /// Close the current page and start a fresh one
    fn break_page(&mut self) {
        if !self.current.items.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.used = 0;
    }

    /// Place an item, assuming the height check already happened. An item
    /// taller than an empty page is still placed - overflowing one page
    /// beats looping forever.
    fn place(&mut self, item: PageItem, height: u32) {
        self.current.items.push(item);
        self.used += height;
    }

    fn finish(mut self) -> Vec<Page> {
        self.break_page();
        self.pages
    }
}

/// Lay the sessions out across pages, in the order given.
///
/// The caller supplies the ordering (see [`sort_for_report`]); this function
/// never re-sorts. Every exercise row appears exactly once across the output
/// and never straddles a page boundary.
pub fn paginate(sessions: &[Session], metrics: &LayoutMetrics) -> Vec<Page> {
    let mut builder = PageBuilder::new(metrics.clone());

    for session in sessions {
        if !builder.fits(metrics.session_base) {
            builder.break_page();
        }
        builder.place(session_header(session, false), metrics.session_base);

        let numbering = compute_numbering(&session.exercises);
        for (i, exercise) in session.exercises.iter().enumerate() {
            // a grouped run gets its header line before the first member
            if let Some(group) = &exercise.group {
                if is_first_in_group(&session.exercises, i) {
                    let header = PageItem::GroupHeader {
                        display_number: numbering[i],
                        kind: group.kind,
                    };
                    if !builder.fits(metrics.circuit_header) {
                        builder.break_page();
                        builder.place(session_header(session, true), metrics.session_base);
                    }
                    builder.place(header, metrics.circuit_header);
                }
            }

            let row = PageItem::ExerciseRow {
                exercise_id: exercise.id.clone(),
                display_number: numbering[i],
                name: exercise.name.clone(),
                sets: exercise.sets,
                metric: exercise.metric,
                weight: exercise.weight,
            };
            if !builder.fits(metrics.exercise_row) {
                builder.break_page();
                builder.place(session_header(session, true), metrics.session_base);
            }
            builder.place(row, metrics.exercise_row);
        }
    }

    builder.finish()
}

fn session_header(session: &Session, continued: bool) -> PageItem {
    PageItem::SessionHeader {
        session_id: session.id.clone(),
        workout_name: session.workout_name.clone(),
        completed: session.is_completed,
        continued,
    }
}

/// Caller-side ordering for the report: session number ascending, with
/// completed sessions sorting after active ones when numbers collide.
pub fn sort_for_report(sessions: &mut [Session], session_number: impl Fn(&Session) -> u32) {
    sessions.sort_by_key(|s| (session_number(s), s.is_completed));
}

/// Default session-number key: trailing integer in the workout name
/// ("Session 12" -> 12), 0 when there is none.
pub fn trailing_number(session: &Session) -> u32 {
    session
        .workout_name
        .rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
