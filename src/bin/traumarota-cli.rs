#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use traumarota::{
    io,
    model::{LeaveId, NewLeave, Swap, SwapKey},
    planner::{monday_on_or_before, Planner, PlannerOptions, StaffingStatus, SwapTarget},
    report::{DisplayMode, TextWeekRenderer, WeekRenderer},
    rules::{export_rules_json, load_rules_from_file, RuleTable},
    storage::{load_ledgers, JsonStore, LedgerStore, StoreSummary},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI du planificateur de capacité (chirurgie traumatologique)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire des registres (leave.json, swaps.json, overrides.json)
    #[arg(long, global = true, default_value = ".traumarota")]
    data_dir: String,

    /// Table de règles JSON (table intégrée par défaut)
    #[arg(long, global = true)]
    rules: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    /// Date de référence (YYYY-MM-DD), aujourd'hui par défaut
    #[arg(long)]
    today: Option<String>,
    #[arg(long, default_value_t = 52)]
    weeks: u32,
    #[arg(long, default_value_t = 20)]
    base_staff: u32,
    #[arg(long, default_value_t = 4)]
    required: u32,
    #[arg(long, value_enum, default_value_t = ModeArg::Percentage)]
    mode: ModeArg,
    #[arg(long, value_enum, default_value_t = SwapTargetArg::OnCall)]
    swap_target: SwapTargetArg,
}

impl PlanArgs {
    fn today(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(raw) => io::parse_date(raw),
            None => Ok(Local::now().date_naive()),
        }
    }

    fn options(&self) -> PlannerOptions {
        PlannerOptions {
            base_staff: self.base_staff,
            required_staff: self.required,
            horizon_weeks: self.weeks,
            swap_target: match self.swap_target {
                SwapTargetArg::OnCall => SwapTarget::OnCall,
                SwapTargetArg::Flexible => SwapTarget::FlexiblePool,
            },
        }
    }

    fn renderer(&self) -> TextWeekRenderer {
        TextWeekRenderer::new(match self.mode {
            ModeArg::Status => DisplayMode::Status,
            ModeArg::Percentage => DisplayMode::Percentage,
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    Status,
    Percentage,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SwapTargetArg {
    OnCall,
    Flexible,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vue calendrier sur l'horizon, export optionnel
    Calendar {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Détail d'une semaine de l'horizon (1 = semaine courante)
    Week {
        #[arg(long)]
        number: u32,
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Lister les jours critiques (code 2 s'il y en a)
    Check {
        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Enregistrer un congé (dates incluses)
    LeaveAdd {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "Annual leave")]
        reason: String,
    },

    /// Supprimer un congé par id
    LeaveRemove {
        #[arg(long)]
        id: String,
    },

    /// Lister les congés
    LeaveList,

    /// Importer des congés depuis un CSV
    LeaveImport {
        #[arg(long)]
        csv: String,
    },

    /// Échanger un chirurgien sur un jour (par position ou par date)
    SwapAdd {
        /// Semaine de l'horizon (1 = semaine courante)
        #[arg(long, requires = "day", conflicts_with = "date")]
        week: Option<u32>,
        /// 0 = lundi .. 4 = vendredi
        #[arg(long, requires = "week")]
        day: Option<u32>,
        /// Date du jour échangé (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Date de référence de l'horizon, aujourd'hui par défaut
        #[arg(long)]
        today: Option<String>,
        #[arg(long)]
        original: String,
        #[arg(long)]
        with: String,
    },

    /// Échange croisé : `surgeon1` (jour `date1`) et `surgeon2` (jour `date2`)
    /// permutent leurs astreintes
    SwapExchange {
        #[arg(long)]
        date1: String,
        #[arg(long)]
        surgeon1: String,
        #[arg(long)]
        date2: String,
        #[arg(long)]
        surgeon2: String,
        /// Date de référence de l'horizon, aujourd'hui par défaut
        #[arg(long)]
        today: Option<String>,
    },

    /// Retirer un échange
    SwapRemove {
        #[arg(long)]
        week: u32,
        #[arg(long)]
        day: u32,
    },

    /// Lister les échanges
    SwapList,

    /// Forcer le titulaire d'une rotation pour la semaine contenant `date`
    OverrideSet {
        #[arg(long)]
        rotation: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        name: String,
    },

    /// Supprimer un forçage
    OverrideClear {
        #[arg(long)]
        rotation: String,
        #[arg(long)]
        date: String,
    },

    /// Lister les forçages
    OverrideList,

    /// Exporter la table de règles active
    RulesExport {
        #[arg(long)]
        out: String,
    },

    /// Résumé du contenu des registres
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let rules = match &cli.rules {
        Some(path) => load_rules_from_file(path)?,
        None => RuleTable::builtin()?,
    };
    let store = JsonStore::open(&cli.data_dir)?;

    let code = match cli.cmd {
        Commands::Calendar {
            plan,
            out_json,
            out_csv,
        } => {
            let ledgers = load_ledgers(&store);
            let planner = Planner::new(&rules, &ledgers, plan.options())?;
            let weeks = planner.build_horizon(plan.today()?);
            if let Some(path) = out_json {
                io::export_horizon_json(path, &weeks)?;
            }
            if let Some(path) = out_csv {
                io::export_horizon_csv(path, &weeks)?;
            }
            let renderer = plan.renderer();
            for week in &weeks {
                println!("{}", renderer.render_calendar_row(week));
            }
            0
        }
        Commands::Week { number, plan } => {
            if number == 0 {
                bail!("week numbers start at 1");
            }
            let ledgers = load_ledgers(&store);
            let planner = Planner::new(&rules, &ledgers, plan.options())?;
            let week = planner.week(plan.today()?, number - 1)?;
            print!("{}", plan.renderer().render_week(&week));
            0
        }
        Commands::Check { plan } => {
            let ledgers = load_ledgers(&store);
            let planner = Planner::new(&rules, &ledgers, plan.options())?;
            let mut critical = 0usize;
            for week in planner.horizon(plan.today()?) {
                for day in week.days.iter().filter(|d| d.status == StaffingStatus::Critical) {
                    critical += 1;
                    let mut reasons = day.critical_on_leave.clone();
                    if day.on_call_on_leave {
                        if let Some(name) = &day.on_call {
                            reasons.push(format!("on call {name}"));
                        }
                    }
                    if day.assigned.iter().any(|a| !a.available) {
                        reasons.push("unfilled duty".to_string());
                    }
                    println!(
                        "{} week {} present {}/{} {}",
                        day.date,
                        week.index + 1,
                        day.present,
                        day.required,
                        reasons.join(", ")
                    );
                }
            }
            if critical == 0 {
                println!("OK: no critical days");
                0
            } else {
                eprintln!("Found {critical} critical day(s)");
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::LeaveAdd {
            name,
            start,
            end,
            reason,
        } => {
            let entry = NewLeave::new(name.trim(), io::parse_date(&start)?, io::parse_date(&end)?, reason);
            warn_on_leave_entry(&rules, &entry);
            let record = store.add_leave(entry)?;
            println!("{}", record.id);
            0
        }
        Commands::LeaveRemove { id } => {
            if !store.remove_leave(&LeaveId::new(&id))? {
                bail!("unknown leave id: {id}");
            }
            0
        }
        Commands::LeaveList => {
            for l in store.leave()? {
                println!(
                    "{} | {} | {} → {} | {}",
                    l.id, l.name, l.start_date, l.end_date, l.reason
                );
            }
            0
        }
        Commands::LeaveImport { csv } => {
            let entries = io::import_leave_csv(csv)?;
            let count = entries.len();
            for entry in entries {
                warn_on_leave_entry(&rules, &entry);
                store.add_leave(entry)?;
            }
            println!("imported {count} leave record(s)");
            0
        }
        Commands::SwapAdd {
            week,
            day,
            date,
            today,
            original,
            with,
        } => {
            let key = match (week, day, date) {
                (Some(0), Some(_), _) => bail!("week numbers start at 1"),
                (Some(week), Some(day), _) => SwapKey::new(week - 1, day)?,
                (_, _, Some(date)) => {
                    SwapKey::for_date(horizon_start(today.as_deref())?, io::parse_date(&date)?)?
                }
                _ => bail!("either --week/--day or --date is required"),
            };
            store.put_swap(key, Swap::new(original, with))?;
            println!("swap {key} recorded");
            0
        }
        Commands::SwapExchange {
            date1,
            surgeon1,
            date2,
            surgeon2,
            today,
        } => {
            let start = horizon_start(today.as_deref())?;
            let first = SwapKey::for_date(start, io::parse_date(&date1)?)?;
            let second = SwapKey::for_date(start, io::parse_date(&date2)?)?;
            if first == second {
                bail!("an exchange needs two different days");
            }
            let [to_first, to_second] = Swap::exchange(surgeon1, surgeon2);
            store.put_swaps(&[(first, to_first), (second, to_second)])?;
            println!("swaps {first} and {second} recorded");
            0
        }
        Commands::SwapRemove { week, day } => {
            if week == 0 {
                bail!("week numbers start at 1");
            }
            let key = SwapKey::new(week - 1, day)?;
            if !store.remove_swap(key)? {
                bail!("no swap recorded for {key}");
            }
            0
        }
        Commands::SwapList => {
            for (key, swap) in store.swaps()? {
                println!(
                    "Week {} day {}: {} → {}",
                    key.week() + 1,
                    key.day(),
                    swap.original_surgeon,
                    swap.new_surgeon
                );
            }
            0
        }
        Commands::OverrideSet {
            rotation,
            date,
            name,
        } => {
            if rules.rotation(&rotation).is_none() {
                bail!("unknown rotation: {rotation}");
            }
            if rules.consultant_by_name(&name).is_none() {
                bail!("unknown consultant: {name}");
            }
            let week_start = monday_on_or_before(io::parse_date(&date)?);
            let mut overrides = store.overrides()?;
            overrides.set(rotation.as_str(), week_start, name.as_str());
            let revision = store
                .replace_overrides(&overrides)
                .context("saving overrides")?;
            println!("{rotation} {week_start}: {name} (revision {revision})");
            0
        }
        Commands::OverrideClear { rotation, date } => {
            let week_start = monday_on_or_before(io::parse_date(&date)?);
            let mut overrides = store.overrides()?;
            if !overrides.clear(&rotation, week_start) {
                bail!("no override for {rotation} on {week_start}");
            }
            store
                .replace_overrides(&overrides)
                .context("saving overrides")?;
            0
        }
        Commands::OverrideList => {
            let overrides = store.overrides()?;
            for (rotation, weeks) in &overrides.rotations {
                for (week_start, name) in weeks {
                    println!("{rotation} | {week_start} | {name}");
                }
            }
            0
        }
        Commands::RulesExport { out } => {
            export_rules_json(out, &rules)?;
            0
        }
        Commands::Status => {
            let summary = StoreSummary::of(&load_ledgers(&store));
            println!("store: {}", store.dir().display());
            println!("leave: {}", summary.leave);
            println!("swaps: {}", summary.swaps);
            for (rotation, count) in &summary.overrides {
                println!("overrides {rotation}: {count}");
            }
            println!("overrides revision: {}", summary.revision);
            0
        }
    };

    std::process::exit(code);
}

fn horizon_start(today: Option<&str>) -> Result<NaiveDate> {
    let today = match today {
        Some(raw) => io::parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    Ok(monday_on_or_before(today))
}

fn warn_on_leave_entry(rules: &RuleTable, entry: &NewLeave) {
    if !rules.is_known_reason(&entry.reason) {
        tracing::warn!(reason = %entry.reason, "leave reason not in the configured list");
    }
    if rules.consultant_by_name(&entry.name).is_none() {
        tracing::warn!(name = %entry.name, "leave recorded for a name outside the roster");
    }
    if entry.end_date < entry.start_date {
        tracing::warn!(
            start = %entry.start_date,
            end = %entry.end_date,
            "leave ends before it starts and will match no day"
        );
    }
}
