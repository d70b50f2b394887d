use habit_core::calendar::{weeks, DayCell};
use habit_core::date::DAY_NAMES;
use habit_core::service::HabitStats;
use habit_core::Habit;

const CELL_WIDTH: usize = 5;

/// One-line summary as shown on the habit list.
pub fn render_card(habit: &Habit) -> String {
    let mark = if habit.completed_today { "✓" } else { " " };
    let icon = habit
        .icon
        .as_deref()
        .map(|icon| format!("{icon} "))
        .unwrap_or_default();
    format!(
        "[{mark}] {icon}{}  ·  {} day streak  (id {})",
        habit.name, habit.streak, habit.id
    )
}

pub fn render_detail(habit: &Habit) -> String {
    let mut lines = vec![render_card(habit)];
    if !habit.description.trim().is_empty() {
        lines.push(format!("    {}", habit.description.trim()));
    }
    lines.push(format!("    Current Streak: {}", habit.streak));
    lines.push(format!("    Best Streak:    {}", habit.longest_streak));
    lines.push(format!(
        "    {}: {} {}",
        habit.frequency.goal_heading(),
        habit.goal,
        habit.goal_label()
    ));
    lines.join("\n")
}

/// Sunday-first month grid. Completed days carry `*`, today is bracketed.
pub fn render_calendar(title: &str, cells: &[DayCell]) -> String {
    let grid_width = CELL_WIDTH * 7;
    let mut lines = vec![format!("{title:^grid_width$}").trim_end().to_string()];
    lines.push(
        DAY_NAMES
            .iter()
            .map(|name| format!("{name:^width$}", width = CELL_WIDTH))
            .collect::<String>()
            .trim_end()
            .to_string(),
    );
    for row in weeks(cells) {
        let line: String = row.iter().map(render_cell).collect();
        lines.push(line.trim_end().to_string());
    }
    lines.push("* completed   [ ] today".to_string());
    lines.join("\n")
}

fn render_cell(cell: &DayCell) -> String {
    match cell {
        DayCell::Empty => " ".repeat(CELL_WIDTH),
        DayCell::Day {
            completed,
            is_today,
            ..
        } => {
            let day = cell.day_of_month().unwrap_or_default();
            let mark = if *completed { '*' } else { ' ' };
            if *is_today {
                format!("[{day:>2}{mark}]")
            } else {
                format!(" {day:>2}{mark} ")
            }
        }
    }
}

pub fn render_stats(stats: &HabitStats) -> String {
    format!(
        "{} habits · {} done today · overall progress {}%",
        stats.total, stats.completed_today, stats.overall_progress
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use habit_core::calendar::month_cells;
    use habit_core::date::parse_date;
    use habit_core::{HabitFormData, HabitId};

    fn habit() -> Habit {
        let form = HabitFormData::new("Drink Water")
            .with_description("Stay hydrated")
            .with_goal(8)
            .with_unit("cup");
        let mut habit = Habit::from_form(HabitId::new("1"), form);
        habit.icon = Some("💧".into());
        habit
    }

    #[test]
    fn card_shows_completion_and_streak() {
        let mut habit = habit();
        assert_eq!(
            render_card(&habit),
            "[ ] 💧 Drink Water  ·  0 day streak  (id 1)"
        );
        let today = parse_date("2025-06-23").unwrap();
        habit.toggle_on(today, today);
        assert!(render_card(&habit).starts_with("[✓]"));
        assert!(render_card(&habit).contains("1 day streak"));
    }

    #[test]
    fn detail_lists_goal_text() {
        let detail = render_detail(&habit());
        assert!(detail.contains("Stay hydrated"));
        assert!(detail.contains("Daily Goal: 8 cups per day"));
        assert!(detail.contains("Best Streak:    0"));
    }

    #[test]
    fn calendar_marks_today_and_completions() {
        let completed: BTreeSet<_> = [
            parse_date("2025-06-02").unwrap(),
            parse_date("2025-06-03").unwrap(),
        ]
        .into();
        let today = parse_date("2025-06-03").unwrap();
        let cells = month_cells(&completed, 2025, 6, today).unwrap();
        let text = render_calendar("June 2025", &cells);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "June 2025");
        assert_eq!(lines[1], " Sun  Mon  Tue  Wed  Thu  Fri  Sat");
        assert_eq!(lines[2], "  1    2* [ 3*]  4    5    6    7");
        assert_eq!(lines[6], " 29   30");
        assert_eq!(lines.last().copied(), Some("* completed   [ ] today"));
    }

    #[test]
    fn stats_line() {
        let stats = HabitStats {
            total: 3,
            completed_today: 1,
            overall_progress: 33,
        };
        assert_eq!(
            render_stats(&stats),
            "3 habits · 1 done today · overall progress 33%"
        );
    }
}
