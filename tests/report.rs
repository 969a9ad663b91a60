#![forbid(unsafe_code)]
use chrono::NaiveDate;
use traumarota::model::{LeaveId, LeaveRecord, Ledgers, Swap, SwapKey};
use traumarota::{DisplayMode, Planner, PlannerOptions, RuleTable, TextWeekRenderer, WeekRenderer};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn calendar_row_in_both_modes() {
    let rules = RuleTable::builtin().unwrap();
    let ledgers = Ledgers::default();
    let planner = Planner::new(&rules, &ledgers, PlannerOptions::default()).unwrap();
    let week = planner.week(d(2025, 8, 11), 0).unwrap();

    let row = TextWeekRenderer::new(DisplayMode::Status).render_calendar_row(&week);
    insta::assert_snapshot!(row, @"Week  1 (Cycle 1) 11 Aug - 15 Aug | 6/4 surplus | 5/4 adequate | 7/4 surplus | 6/4 surplus | 7/4 surplus");

    let row = TextWeekRenderer::new(DisplayMode::Percentage).render_calendar_row(&week);
    insta::assert_snapshot!(row, @"Week  1 (Cycle 1) 11 Aug - 15 Aug | 6/20 30% critical | 5/20 25% critical | 7/20 35% critical | 6/20 30% critical | 5/20 25% critical");
}

#[test]
fn week_detail_lists_duties_leave_and_swaps() {
    let rules = RuleTable::builtin().unwrap();
    let mut ledgers = Ledgers {
        leave: vec![LeaveRecord {
            id: LeaveId::new("1"),
            name: "Mike Kelly".into(),
            start_date: d(2025, 8, 11),
            end_date: d(2025, 8, 11),
            reason: "Study leave".into(),
        }],
        ..Ledgers::default()
    };
    ledgers
        .swaps
        .insert(SwapKey::new(0, 1).unwrap(), Swap::new(Swap::ANY_ORIGINAL, "Sam Jonas"));
    ledgers
        .swaps
        .insert(SwapKey::new(0, 3).unwrap(), Swap::new("Lynn Hutchings", "Sam Jonas"));
    let planner = Planner::new(&rules, &ledgers, PlannerOptions::default()).unwrap();
    let week = planner.week(d(2025, 8, 11), 0).unwrap();

    let text = TextWeekRenderer::new(DisplayMode::Status).render_week(&week);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Week 1 (cycle 1) 11 Aug - 15 Aug");
    assert_eq!(lines[1], "Mon 11 Aug: 5/4 critical");
    assert!(lines.contains(&"  on call: Iain Packham"));
    assert!(lines.contains(&"  Theatre 4: Mike Kelly !"));
    assert!(lines.contains(&"  on leave: Mike Kelly (Study leave)"));
    assert!(lines.contains(&"  swap: Original -> Sam Jonas"));
    assert!(lines.contains(&"  on call: Sam Jonas"));
    assert!(lines.contains(&"  swap: Lynn Hutchings -> Sam Jonas (not applied)"));
    assert!(lines.contains(&"  Theatre 4: Lynn Hutchings"));
    assert!(lines.contains(&"Fri 15 Aug: 7/4 surplus"));
    assert!(lines.contains(&"  spare: Selina Graham, Alasdair Bott"));
}
