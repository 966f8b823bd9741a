use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use project_timeline::{
    AppConfig, PlanningTask, ProjectPlan, TASK_COUNT, VacationSource, VacationZone, WorkflowStep,
    export_steps_to_csv, load_plan_from_json, load_vacations_from_csv, save_plan_to_json,
};
use std::io::{self, Write};
use std::sync::Arc;

type SharedSource = Arc<dyn VacationSource + Send + Sync>;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |col: &polars::prelude::Column, row_idx: usize| -> String {
        match col.get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(av) => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            widths[ci] = widths[ci].max(cell(col, row_idx).len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push_str(&format!(" {:<width$} |", name, width = widths[i]));
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            out.push_str(&format!(" {:<width$} |", cell(col, row_idx), width = widths[ci]));
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show planning and projection\n  name <text...>                     Set project name\n  dates <start> <end>                Set project dates (YYYY-MM-DD, or 'clear')\n  zone <none|A|B|C>                  Set vacation zone\n  hours <task> <hours>               Set hours of one task (1-5 or key)\n  hours <h1> <h2> <h3> <h4> <h5>     Set hours of all tasks\n  summary                            One-line projection summary\n  weeks                              Show week-by-week timeline\n  milestones                         Show projected step dates\n  steps                              Show resolved step dates\n  step <n> submit <date|clear>       Set explicit submission date\n  step <n> deadline <date|clear>     Set explicit deadline date\n  step <n> enable|disable            Toggle a student step\n  vacations load <csv_path>          Load the school calendar dataset\n  vacations show                     List vacations in the project span\n  save json <path>                   Persist plan to disk\n  load json <path>                   Load plan from disk\n  export csv <path>                  Export resolved step dates\n  quit|exit                          Exit"
    );
}

fn parse_date_arg(input: &str) -> Result<Option<NaiveDate>, String> {
    if input.eq_ignore_ascii_case("clear") {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Invalid date (YYYY-MM-DD)".to_string())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_show(plan: &ProjectPlan, source: &SharedSource) {
    let planning = plan.planning();
    println!("Project name : {}", planning.project_name);
    println!("Start date   : {}", format_date(planning.project_start));
    println!("End date     : {}", format_date(planning.project_end));
    println!("Vacation zone: {}", planning.vacation_zone);
    match plan.report(source.as_ref()) {
        Ok(report) => {
            for allocation in &report.projection.allocations {
                println!(
                    "  {:<24} {:>6.1} h  {:>5.1}%",
                    allocation.task.label(),
                    allocation.hours,
                    allocation.share * 100.0
                );
            }
            println!(
                "Total: {} h, {} week(s) needed",
                report.projection.total_hours, report.projection.total_weeks_needed
            );
            if let Some(available) = report.projection.weeks_available {
                println!("Weeks available: {available:.2}");
            }
            if report.projection.capacity_exceeded {
                println!("Warning: planned hours exceed the weeks available between the project dates.");
            }
            if let Some(notice) = report.notice {
                println!("Note: {notice}");
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn print_milestones(plan: &ProjectPlan) {
    match plan.planning().date_window() {
        Err(e) => println!("Milestones unavailable: {}", e),
        Ok(_) => match plan.milestones() {
            Ok(Some(milestones)) => {
                for milestone in &milestones {
                    println!(
                        "Step {} ({}): {}",
                        milestone.step.number(),
                        milestone.step.name(),
                        milestone.date
                    );
                }
            }
            Ok(None) => println!("No hours planned yet."),
            Err(e) => println!("Error: {}", e),
        },
    }
}

fn print_steps(plan: &ProjectPlan) {
    match plan.resolved_steps() {
        Ok(steps) => {
            println!("{:<5} {:<28} {:<12} {:<10} {:<12}", "step", "name", "submission", "source", "deadline");
            for step in steps {
                println!(
                    "{:<5} {:<28} {:<12} {:<10} {:<12}",
                    step.step.number(),
                    step.name,
                    format_date(step.submission_date),
                    step.source.as_str(),
                    format_date(step.deadline_date)
                );
            }
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_step_command<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(step_s), Some(action)) = (parts.next(), parts.next()) else {
        println!("Usage: step <n> submit|deadline <YYYY-MM-DD|clear> | step <n> enable|disable");
        return;
    };
    let step = match step_s.parse::<WorkflowStep>() {
        Ok(step) => step,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    let result = match action {
        "enable" => plan.set_step_enabled(step, true),
        "disable" => plan.set_step_enabled(step, false),
        "submit" | "deadline" => {
            let Some(date_s) = parts.next() else {
                println!("Usage: step <n> {action} <YYYY-MM-DD|clear>");
                return;
            };
            let date = match parse_date_arg(date_s) {
                Ok(date) => date,
                Err(e) => {
                    println!("{e}");
                    return;
                }
            };
            if action == "submit" {
                plan.set_submission_date(step, date)
            } else {
                plan.set_deadline_date(step, date)
            }
        }
        other => {
            println!("Unknown step action '{other}'");
            return;
        }
    };
    match result {
        Ok(()) => println!("Step {} updated.", step.number()),
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_hours_command<'a>(plan: &mut ProjectPlan, parts: impl Iterator<Item = &'a str>) {
    let args: Vec<&str> = parts.collect();
    match args.len() {
        2 => {
            let task = match args[0].parse::<PlanningTask>() {
                Ok(task) => task,
                Err(e) => {
                    println!("{e}");
                    return;
                }
            };
            match args[1].parse::<f64>() {
                Ok(hours) => {
                    plan.set_task_hours(task, hours);
                    println!("{} set to {} h.", task.label(), plan.planning().hours(task));
                }
                Err(_) => println!("Invalid hours"),
            }
        }
        TASK_COUNT => {
            let mut hours = [0.0; TASK_COUNT];
            for (slot, raw) in hours.iter_mut().zip(&args) {
                match raw.parse::<f64>() {
                    Ok(value) => *slot = value,
                    Err(_) => {
                        println!("Invalid hours '{raw}'");
                        return;
                    }
                }
            }
            plan.set_all_task_hours(hours);
            println!("Task hours updated.");
        }
        _ => println!("Usage: hours <task> <hours> | hours <h1> <h2> <h3> <h4> <h5>"),
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let mut plan = ProjectPlan::new();
    let mut source: SharedSource = match AppConfig::load()
        .map_err(|e| e.to_string())
        .and_then(|config| config.vacations.build_source().map_err(|e| e.to_string()))
    {
        Ok(source) => source,
        Err(e) => {
            println!("Vacation calendar unavailable: {e}");
            Arc::new(project_timeline::VacationCalendar::new())
        }
    };

    println!("Project Timeline (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_show(&plan, &source),
            "name" => {
                let rest = parts.collect::<Vec<_>>().join(" ");
                if rest.is_empty() {
                    println!("Usage: name <text...>");
                } else {
                    plan.set_project_name(rest);
                    println!("Project name updated.");
                }
            }
            "dates" => match (parts.next(), parts.next()) {
                (Some(start_s), Some(end_s)) => {
                    let (start, end) = match (parse_date_arg(start_s), parse_date_arg(end_s)) {
                        (Ok(start), Ok(end)) => (start, end),
                        (Err(e), _) | (_, Err(e)) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    match plan.set_project_dates(start, end) {
                        Ok(()) => println!("Project dates updated."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: dates <YYYY-MM-DD|clear> <YYYY-MM-DD|clear>"),
            },
            "zone" => match parts.next().map(str::parse::<VacationZone>) {
                Some(Ok(zone)) => {
                    plan.set_vacation_zone(zone);
                    println!("Vacation zone set to {zone}.");
                }
                Some(Err(e)) => println!("{e}"),
                None => println!("Usage: zone <none|A|B|C>"),
            },
            "hours" => handle_hours_command(&mut plan, parts),
            "summary" => match plan.refresh(source.as_ref()) {
                Ok(summary) => println!("{}", summary.to_cli_summary()),
                Err(e) => println!("Error: {}", e),
            },
            "weeks" => match plan.weekly_timeline(source.as_ref()) {
                Ok(df) => println!("{}", render_df_as_text_table(&df)),
                Err(e) => println!("Error: {}", e),
            },
            "milestones" => print_milestones(&plan),
            "steps" => print_steps(&plan),
            "step" => handle_step_command(&mut plan, parts),
            "vacations" => match parts.next() {
                Some("load") => match parts.next() {
                    Some(path) => match load_vacations_from_csv(path) {
                        Ok(calendar) => {
                            println!("Loaded {} vacation period(s) from {}", calendar.len(), path);
                            source = Arc::new(calendar);
                        }
                        Err(e) => println!("Error loading vacations: {}", e),
                    },
                    None => println!("Usage: vacations load <csv_path>"),
                },
                Some("show") => match plan.vacations(source.as_ref()) {
                    Ok(periods) if periods.is_empty() => {
                        println!("No vacation periods in the project span.")
                    }
                    Ok(periods) => {
                        for period in periods {
                            println!("{}: {} -> {}", period.name, period.start, period.end);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: vacations load <csv_path> | vacations show"),
            },
            "save" | "load" | "export" => {
                let fmt = parts.next();
                let path = parts.next();
                match (cmd, fmt, path) {
                    ("save", Some("json"), Some(path)) => match save_plan_to_json(&plan, path) {
                        Ok(()) => println!("Plan saved to {}", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    },
                    ("load", Some("json"), Some(path)) => match load_plan_from_json(path) {
                        Ok(loaded) => {
                            plan = loaded;
                            println!("Plan loaded from {}", path);
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    },
                    ("export", Some("csv"), Some(path)) => match export_steps_to_csv(&plan, path) {
                        Ok(()) => println!("Step dates exported to {}", path),
                        Err(e) => println!("Error exporting step dates: {}", e),
                    },
                    ("export", _, _) => println!("Usage: export csv <path>"),
                    _ => println!("Usage: {} json <path>", cmd),
                }
            }
            _ => {
                println!("Unknown command. Type 'help' for a list of commands.");
            }
        }
    }
}
