use crate::model::NewLeave;
use crate::planner::WeekStaffing;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Date ISO ; `YYYY/MM/DD` est accepté et normalisé.
pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let cleaned = raw.trim().replace('/', "-");
    NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Import de congés depuis CSV: header `name,start_date,end_date[,reason]`
pub fn import_leave_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NewLeave>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid leave row {} (empty name)", line + 1);
        }
        let start = parse_date(rec.get(1).context("missing start_date")?)
            .with_context(|| format!("leave row {} start_date", line + 1))?;
        let end = parse_date(rec.get(2).context("missing end_date")?)
            .with_context(|| format!("leave row {} end_date", line + 1))?;
        let reason = rec.get(3).map(str::trim).filter(|r| !r.is_empty()).unwrap_or("Leave");
        out.push(NewLeave::new(name, start, end, reason));
    }
    Ok(out)
}

/// Export JSON de l'horizon calculé (jolie mise en forme)
pub fn export_horizon_json<P: AsRef<Path>>(path: P, weeks: &[WeekStaffing]) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(weeks)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV, une ligne par jour:
/// header `week,date,cycle_week,on_call,available,present,capacity_pct,band,status,on_leave`
pub fn export_horizon_csv<P: AsRef<Path>>(path: P, weeks: &[WeekStaffing]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "week",
        "date",
        "cycle_week",
        "on_call",
        "available",
        "present",
        "capacity_pct",
        "band",
        "status",
        "on_leave",
    ])?;
    for week in weeks {
        for day in &week.days {
            let on_leave = day
                .on_leave
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(";");
            w.write_record([
                (week.index + 1).to_string(),
                day.date.to_string(),
                day.cycle_week.to_string(),
                day.on_call.clone().unwrap_or_default(),
                day.available.to_string(),
                day.present.to_string(),
                day.capacity_percentage.to_string(),
                day.band.as_str().to_string(),
                day.status.as_str().to_string(),
                on_leave,
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
