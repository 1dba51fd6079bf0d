//! Plain text rendering of a day record. Every view is built as a list of lines so the same views
//! can be printed alone or side by side.

use unicode_width::UnicodeWidthStr;

use crate::planner::{
    normalize::{GoalSection, Meal, ShowType},
    nutrients::{render_bar, DailyTargets, NutrientTotals, DEFAULT_BAR_WIDTH},
    record::{hour_key, DaySummary, FIRST_PLAN_HOUR, LAST_PLAN_HOUR},
    DayRecord,
};

/// Column widths of the combined view: routine, plan, goals, food.
const COLUMN_WIDTHS: [usize; 4] = [30, 30, 30, 35];
const COLUMN_SEPARATOR: &str = " | ";

pub fn mark(done: bool) -> &'static str {
    if done {
        "[✓]"
    } else {
        "[ ]"
    }
}

pub fn routine_lines(record: &DayRecord) -> Vec<String> {
    let mut lines = vec!["[Checklist] Daily Routine:".to_string()];
    for section in record.routine() {
        lines.push(String::new());
        lines.push(format!("[{}]", section.name()));
        for (i, task) in section.tasks().iter().enumerate() {
            lines.push(format!("{:2}. {} {}", i + 1, mark(task.done), task.label));
        }
        lines.push(format!("    {}", "=".repeat(16)));
        let progress = render_bar(
            section.done_count() as f64,
            section.tasks().len() as f64,
            DEFAULT_BAR_WIDTH,
            "Progress",
        );
        lines.extend(progress.lines(""));
    }
    lines
}

pub fn plan_lines(record: &DayRecord) -> Vec<String> {
    let mut lines = vec!["[Schedule] Daily Planning:".to_string()];
    for hour in FIRST_PLAN_HOUR..=LAST_PLAN_HOUR {
        let key = hour_key(hour);
        let task = record.plan().get(&key).map(String::as_str).unwrap_or("");
        let arrow = if task.is_empty() { "   " } else { "-->" };
        lines.push(format!("{key}:00 | {arrow} {task}"));
    }
    lines
}

pub fn goals_lines(record: &DayRecord) -> Vec<String> {
    let mut lines = vec![];
    for section in GoalSection::ALL {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("[Goals] {}:", section.title()));
        for (i, goal) in record.goals(section).iter().enumerate() {
            lines.push(format!("{}. {} {}", i + 1, mark(goal.done), goal.text));
        }
    }
    lines
}

pub fn food_lines(record: &DayRecord, targets: &DailyTargets) -> Vec<String> {
    let mut lines = vec!["[Food] Meals:".to_string()];
    for meal in Meal::ALL {
        lines.push(format!("  {}:", meal.title()));
        let entries = record.food(meal);
        if entries.is_empty() {
            lines.push("    (none)".to_string());
        }
        for (i, entry) in entries.iter().enumerate() {
            lines.push(format!("    {}. {} ({}g)", i + 1, entry.name, entry.weight));
        }
    }

    let totals = NutrientTotals::of_day(record.all_food());
    let water = record.water();
    lines.push(String::new());
    lines.push("  Total:".to_string());
    lines.push(format!("    Protein: {:.1}g", totals.protein));
    lines.push(format!("    Fat: {:.1}g", totals.fat));
    lines.push(format!("    Carbon: {:.1}g", totals.carbon));
    lines.push(format!("    Water: {water} ml"));
    lines.push(format!("     {}", "=".repeat(24)));
    lines.push(String::new());
    lines.push("  Progress:".to_string());

    let bars = [
        ("Protein", totals.protein, targets.protein, "g"),
        ("Fat", totals.fat, targets.fat, "g"),
        ("Carbon", totals.carbon, targets.carbon, "g"),
        ("Water", water as f64, targets.water, "ml"),
    ];
    for (label, current, target, unit) in bars {
        let bar = render_bar(current, target, DEFAULT_BAR_WIDTH, label);
        lines.extend(bar.lines(unit).map(|v| format!("    {v}")));
    }
    lines
}

pub fn summary_lines(summary: &DaySummary) -> Vec<String> {
    let mut lines = vec![format!(
        "[Summary] Tasks: {}/{} completed",
        summary.tasks_done, summary.tasks_total
    )];
    lines.extend(summary.goals.iter().map(|v| {
        format!("  {}: {}/{} complete", v.section.title(), v.done, v.total)
    }));
    lines
}

/// Pads `line` with spaces up to `width` terminal columns.
fn pad_display(line: &str, width: usize) -> String {
    let padding = width.saturating_sub(line.width());
    format!("{line}{}", " ".repeat(padding))
}

/// Routine, plan, goals and food next to each other.
pub fn all_columns(record: &DayRecord, targets: &DailyTargets) -> Vec<String> {
    let columns = [
        routine_lines(record),
        plan_lines(record),
        goals_lines(record),
        food_lines(record, targets),
    ];
    let height = columns.iter().map(Vec::len).max().unwrap_or_default();
    (0..height)
        .map(|row| {
            columns
                .iter()
                .zip(COLUMN_WIDTHS)
                .map(|(column, width)| {
                    pad_display(column.get(row).map(String::as_str).unwrap_or(""), width)
                })
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR)
        })
        .collect()
}

pub fn render(show: ShowType, record: &DayRecord, targets: &DailyTargets) -> Vec<String> {
    match show {
        ShowType::Routine => routine_lines(record),
        ShowType::Plan => plan_lines(record),
        ShowType::Goals => goals_lines(record),
        ShowType::Food => food_lines(record, targets),
        ShowType::Summary => summary_lines(&record.summarize()),
        ShowType::All => all_columns(record, targets),
    }
}
