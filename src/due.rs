//! Due-date arithmetic and the aggregate views derived from it.
//!
//! Everything that classifies a task by date goes through [`day_diff`] and
//! [`DueBucket::classify`], so the board stats, the due-soon view and the card
//! badges can never disagree about which tasks are overdue.

use chrono::{Datelike, Duration, NaiveDate};

use crate::fields::{DueSoonFilter, Status};
use crate::task::Task;

/// Horizon of the "all" due-soon filter, in days.
pub const DUE_SOON_HORIZON_DAYS: i64 = 14;

/// Default due-soon window, in days.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 3;

/// Whole calendar days from `today` to `due`. Negative when overdue.
pub fn day_diff(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Date proximity classes shared by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DueBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    Later,
}

impl DueBucket {
    /// Classify a day difference. Today is never overdue.
    pub fn classify(diff: i64) -> Self {
        match diff {
            d if d < 0 => DueBucket::Overdue,
            0 => DueBucket::Today,
            1 => DueBucket::Tomorrow,
            2..=7 => DueBucket::ThisWeek,
            _ => DueBucket::Later,
        }
    }

    pub fn for_date(due: NaiveDate, today: NaiveDate) -> Self {
        Self::classify(day_diff(due, today))
    }

    pub fn title(self) -> &'static str {
        match self {
            DueBucket::Overdue => "overdue",
            DueBucket::Today => "due today",
            DueBucket::Tomorrow => "due tomorrow",
            DueBucket::ThisWeek => "due this week",
            DueBucket::Later => "due later",
        }
    }
}

/// Human label for a day difference, e.g. "2 days overdue" or "Due in 5 days".
pub fn due_label(diff: i64) -> String {
    match diff {
        d if d < 0 => {
            let n = -d;
            format!("{} day{} overdue", n, if n == 1 { "" } else { "s" })
        }
        0 => "Due today".into(),
        1 => "Due tomorrow".into(),
        d => format!("Due in {d} days"),
    }
}

/// Due strictly before today and not done.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.status != Status::Done
        && task
            .due_date
            .is_some_and(|d| DueBucket::for_date(d, today) == DueBucket::Overdue)
}

/// Due within `[today, today + window_days]` and not done.
pub fn is_due_soon(task: &Task, today: NaiveDate, window_days: i64) -> bool {
    task.status != Status::Done
        && task
            .due_date
            .is_some_and(|d| (0..=window_days).contains(&day_diff(d, today)))
}

/// Tasks grouped by [`DueBucket`]. Tasks without a due date are skipped.
#[derive(Debug, Default)]
pub struct DueBuckets<'a> {
    pub overdue: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub tomorrow: Vec<&'a Task>,
    pub this_week: Vec<&'a Task>,
    pub later: Vec<&'a Task>,
}

impl<'a> DueBuckets<'a> {
    pub fn get(&self, bucket: DueBucket) -> &[&'a Task] {
        match bucket {
            DueBucket::Overdue => &self.overdue,
            DueBucket::Today => &self.today,
            DueBucket::Tomorrow => &self.tomorrow,
            DueBucket::ThisWeek => &self.this_week,
            DueBucket::Later => &self.later,
        }
    }
}

/// Bucket a task collection relative to `today`.
pub fn bucket_tasks<'a, I>(tasks: I, today: NaiveDate) -> DueBuckets<'a>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out = DueBuckets::default();
    for task in tasks {
        let Some(due) = task.due_date else { continue };
        let slot = match DueBucket::for_date(due, today) {
            DueBucket::Overdue => &mut out.overdue,
            DueBucket::Today => &mut out.today,
            DueBucket::Tomorrow => &mut out.tomorrow,
            DueBucket::ThisWeek => &mut out.this_week,
            DueBucket::Later => &mut out.later,
        };
        slot.push(task);
    }
    out
}

/// Aggregate numbers shown above the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    /// Task count per column, in [`Status::ALL`] order.
    pub columns: [usize; 5],
}

impl BoardStats {
    pub fn compute<'a, I>(tasks: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut stats = BoardStats::default();
        for task in tasks {
            stats.total += 1;
            stats.columns[task.status.column()] += 1;
            if task.status == Status::Done {
                stats.completed += 1;
            }
            if is_overdue(task, today) {
                stats.overdue += 1;
            }
        }
        stats
    }

    pub fn count(&self, status: Status) -> usize {
        self.columns[status.column()]
    }
}

/// Open tasks with a due date matching `filter`, soonest first.
pub fn due_soon_view<'a, I>(tasks: I, today: NaiveDate, filter: DueSoonFilter) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut listed: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| t.status != Status::Done)
        .filter(|t| {
            let Some(due) = t.due_date else { return false };
            let diff = day_diff(due, today);
            match filter {
                DueSoonFilter::Overdue => diff < 0,
                DueSoonFilter::Today => diff == 0,
                DueSoonFilter::Week => (0..=7).contains(&diff),
                DueSoonFilter::All => diff <= DUE_SOON_HORIZON_DAYS,
            }
        })
        .collect();
    listed.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.title.cmp(&b.title)));
    listed
}

/// Counters shown at the top of the due-soon view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DueSummary {
    pub total: usize,
    pub overdue: usize,
    pub due_soon: usize,
}

impl DueSummary {
    pub fn compute(listed: &[&Task], today: NaiveDate, window_days: i64) -> Self {
        DueSummary {
            total: listed.len(),
            overdue: listed.iter().filter(|t| is_overdue(t, today)).count(),
            due_soon: listed.iter().filter(|t| is_due_soon(t, today, window_days)).count(),
        }
    }
}

/// `today` shifted by `days`, or `None` past the calendar's range.
fn offset_days(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| today.checked_add_signed(delta))
}

/// Parse human due date input relative to `today`.
///
/// Supports "today", "tomorrow", "yesterday", "end of week"/"eow",
/// "in 3d"/"in 2w", weekday names ("fri", "next monday") and `YYYY-MM-DD`.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return offset_days(today, 1),
        "yesterday" => return offset_days(today, -1),
        "end of week" | "eow" => {
            let weekday = today.weekday().num_days_from_monday() as i64;
            return offset_days(today, 6 - weekday);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return offset_days(today, n);
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return n.checked_mul(7).and_then(|days| offset_days(today, days));
        }
    }

    let weekdays = [
        ("monday", "mon"),
        ("tuesday", "tue"),
        ("wednesday", "wed"),
        ("thursday", "thu"),
        ("friday", "fri"),
        ("saturday", "sat"),
        ("sunday", "sun"),
    ];
    let (name, next_week) = match s.strip_prefix("next ") {
        Some(rest) => (rest, true),
        None => (s.as_str(), false),
    };
    if let Some(target) = weekdays.iter().position(|(long, short)| name == *long || name == *short) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target as i64 + 7 - current) % 7;
        let days = match (next_week, ahead) {
            (true, 0) => 7,
            (true, a) => a + 7,
            (false, a) => a,
        };
        return offset_days(today, days);
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(title: &str, due: Option<&str>, status: Status) -> Task {
        let mut t = Task::from_new(
            NewTask { title: title.into(), status: Some(status), ..Default::default() },
            "project-1",
            chrono::Utc::now(),
        );
        t.due_date = due.map(date);
        t
    }

    #[test]
    fn buckets_follow_the_reference_calendar() {
        let today = date("2024-02-10");
        assert_eq!(DueBucket::for_date(date("2024-02-09"), today), DueBucket::Overdue);
        assert_eq!(DueBucket::for_date(date("2024-02-10"), today), DueBucket::Today);
        assert_eq!(DueBucket::for_date(date("2024-02-11"), today), DueBucket::Tomorrow);
        assert_eq!(DueBucket::for_date(date("2024-02-16"), today), DueBucket::ThisWeek);
        assert_eq!(DueBucket::for_date(date("2024-02-17"), today), DueBucket::ThisWeek);
        assert_eq!(DueBucket::for_date(date("2024-02-18"), today), DueBucket::Later);
        assert_eq!(DueBucket::for_date(date("2024-02-20"), today), DueBucket::Later);
    }

    #[test]
    fn bucket_tasks_skips_undated() {
        let today = date("2024-02-10");
        let tasks = vec![
            task("a", Some("2024-02-01"), Status::Todo),
            task("b", Some("2024-02-10"), Status::Todo),
            task("c", None, Status::Todo),
            task("d", Some("2024-03-01"), Status::Done),
        ];
        let buckets = bucket_tasks(&tasks, today);
        assert_eq!(buckets.get(DueBucket::Overdue).len(), 1);
        assert_eq!(buckets.get(DueBucket::Today)[0].title, "b");
        assert_eq!(buckets.get(DueBucket::Later).len(), 1);
        assert!(buckets.tomorrow.is_empty() && buckets.this_week.is_empty());
    }

    #[test]
    fn overdue_and_due_soon_exclude_done_and_today_is_not_overdue() {
        let today = date("2024-02-10");
        assert!(is_overdue(&task("x", Some("2024-02-09"), Status::Todo), today));
        assert!(!is_overdue(&task("x", Some("2024-02-09"), Status::Done), today));
        assert!(!is_overdue(&task("x", Some("2024-02-10"), Status::Todo), today));
        assert!(is_due_soon(&task("x", Some("2024-02-10"), Status::Todo), today, 3));
        assert!(is_due_soon(&task("x", Some("2024-02-13"), Status::Todo), today, 3));
        assert!(!is_due_soon(&task("x", Some("2024-02-14"), Status::Todo), today, 3));
        assert!(!is_due_soon(&task("x", None, Status::Todo), today, 3));
    }

    #[test]
    fn board_stats_count_columns_completed_and_overdue() {
        let today = date("2024-02-10");
        let tasks = vec![
            task("a", Some("2024-02-01"), Status::Todo),
            task("b", Some("2024-02-01"), Status::Done),
            task("c", None, Status::Done),
            task("d", None, Status::Review),
        ];
        let stats = BoardStats::compute(&tasks, today);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.count(Status::Done), 2);
        assert_eq!(stats.count(Status::Backlog), 0);
    }

    #[test]
    fn due_soon_view_filters_and_sorts() {
        let today = date("2024-02-10");
        let tasks = vec![
            task("later", Some("2024-03-30"), Status::Todo),
            task("week", Some("2024-02-15"), Status::Todo),
            task("late", Some("2024-02-08"), Status::Todo),
            task("today", Some("2024-02-10"), Status::Review),
            task("finished", Some("2024-02-10"), Status::Done),
        ];
        let all: Vec<_> = due_soon_view(&tasks, today, DueSoonFilter::All)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(all, vec!["late", "today", "week"]);
        assert_eq!(due_soon_view(&tasks, today, DueSoonFilter::Overdue).len(), 1);
        assert_eq!(due_soon_view(&tasks, today, DueSoonFilter::Today).len(), 1);
        assert_eq!(due_soon_view(&tasks, today, DueSoonFilter::Week).len(), 2);

        let listed = due_soon_view(&tasks, today, DueSoonFilter::All);
        let summary = DueSummary::compute(&listed, today, 3);
        assert_eq!(summary, DueSummary { total: 3, overdue: 1, due_soon: 1 });
    }

    #[test]
    fn due_labels_read_naturally() {
        assert_eq!(due_label(-1), "1 day overdue");
        assert_eq!(due_label(-3), "3 days overdue");
        assert_eq!(due_label(0), "Due today");
        assert_eq!(due_label(1), "Due tomorrow");
        assert_eq!(due_label(9), "Due in 9 days");
    }

    #[test]
    fn parse_due_input_handles_relative_forms() {
        // 2024-02-10 is a Saturday.
        let today = date("2024-02-10");
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(parse_due_input("Tomorrow", today), Some(date("2024-02-11")));
        assert_eq!(parse_due_input("in 3d", today), Some(date("2024-02-13")));
        assert_eq!(parse_due_input("in 2w", today), Some(date("2024-02-24")));
        assert_eq!(parse_due_input("eow", today), Some(date("2024-02-11")));
        assert_eq!(parse_due_input("mon", today), Some(date("2024-02-12")));
        assert_eq!(parse_due_input("saturday", today), Some(today));
        assert_eq!(parse_due_input("next saturday", today), Some(date("2024-02-17")));
        assert_eq!(parse_due_input("next monday", today), Some(date("2024-02-19")));
        assert_eq!(parse_due_input("2024-03-01", today), Some(date("2024-03-01")));
        assert_eq!(parse_due_input("someday", today), None);
    }

    #[test]
    fn parse_due_input_rejects_offsets_past_the_calendar() {
        let today = date("2024-02-10");
        assert_eq!(parse_due_input("in 100000000d", today), None);
        assert_eq!(parse_due_input("in 99999999999999d", today), None);
        assert_eq!(parse_due_input("in 99999999999w", today), None);
        assert_eq!(parse_due_input(&format!("in {}w", i64::MAX), today), None);
        assert_eq!(parse_due_input("in -100000000d", today), None);
        assert_eq!(parse_due_input("yesterday", NaiveDate::MIN), None);
        assert_eq!(parse_due_input("tomorrow", NaiveDate::MAX), None);
    }
}
