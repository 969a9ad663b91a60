use crate::planner::{DayStaffing, WeekStaffing};
use std::fmt::{self, Write};

const DAY_NAMES: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Classification affichée : niveaux sur l'effectif requis, ou pourcentage
/// de l'effectif de référence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    Status,
    #[default]
    Percentage,
}

/// Permet de customiser le rendu d'une semaine (texte, HTML, etc.).
pub trait WeekRenderer {
    fn render_week(&self, week: &WeekStaffing) -> String;
    fn render_calendar_row(&self, week: &WeekStaffing) -> String;
}

/// Rendu texte brut pour le terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextWeekRenderer {
    pub mode: DisplayMode,
}

impl TextWeekRenderer {
    pub fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    fn day_figure(&self, day: &DayStaffing) -> String {
        match self.mode {
            DisplayMode::Status => format!("{}/{} {}", day.present, day.required, day.status.as_str()),
            DisplayMode::Percentage => format!(
                "{}/{} {}% {}",
                day.available,
                day.base_staff,
                day.capacity_percentage,
                day.band.as_str()
            ),
        }
    }

    fn write_week(&self, out: &mut String, week: &WeekStaffing) -> fmt::Result {
        writeln!(
            out,
            "Week {} (cycle {}) {}",
            week.index + 1,
            week.cycle_week,
            week.label
        )?;
        for day in &week.days {
            let name = DAY_NAMES.get(usize::from(day.day_index)).copied().unwrap_or("?");
            writeln!(out, "{name} {}: {}", day.date.format("%-d %b"), self.day_figure(day))?;
            if let Some(on_call) = &day.on_call {
                writeln!(out, "  on call: {on_call}")?;
            }
            if let Some(swap) = &day.swap {
                let marker = if day.swap_applied { "" } else { " (not applied)" };
                writeln!(
                    out,
                    "  swap: {} -> {}{marker}",
                    swap.original_surgeon, swap.new_surgeon
                )?;
            }
            for a in &day.assigned {
                let marker = if a.available { "" } else { " !" };
                writeln!(out, "  {}: {}{marker}", a.duty, a.name)?;
            }
            if !day.available_flexible.is_empty() {
                writeln!(out, "  flexible: {}", day.available_flexible.join(", "))?;
            }
            if !day.spare_candidates.is_empty() {
                writeln!(out, "  spare: {}", day.spare_candidates.join(", "))?;
            }
            for l in &day.on_leave {
                writeln!(out, "  on leave: {} ({})", l.name, l.reason)?;
            }
        }
        Ok(())
    }
}

impl WeekRenderer for TextWeekRenderer {
    fn render_week(&self, week: &WeekStaffing) -> String {
        let mut out = String::new();
        // écrire dans une String ne peut pas échouer
        let _ = self.write_week(&mut out, week);
        out
    }

    fn render_calendar_row(&self, week: &WeekStaffing) -> String {
        let cells: Vec<String> = week
            .days
            .iter()
            .map(|day| {
                let swap = if day.swap.is_some() { "*" } else { "" };
                format!("{}{swap}", self.day_figure(day))
            })
            .collect();
        format!(
            "Week {:>2} (Cycle {}) {:<15} | {}",
            week.index + 1,
            week.cycle_week,
            week.label,
            cells.join(" | ")
        )
    }
}
