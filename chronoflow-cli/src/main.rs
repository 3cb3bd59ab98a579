use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use chronoflow_core::{
    format_minutes, predict::resolve, Clock, FileStore, Scheduler, SystemClock,
};

mod config;
mod state;

type Engine = Scheduler<FileStore, SystemClock>;

#[derive(Parser, Debug)]
#[command(name = "chronoflow", version, about = "Weekly energy-aware task scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task to the unscheduled pool
    Add {
        title: String,

        /// Minutes (predicted from the title, else energy * 6)
        #[arg(long)]
        duration: Option<u32>,

        /// Energy cost (predicted from the title, else 10)
        #[arg(long)]
        energy: Option<u32>,

        /// Number of copies; copies are spread over different days
        #[arg(long, default_value_t = 1)]
        frequency: usize,
    },

    /// Delete a task (and its slot, if scheduled)
    Delete { id: String },

    /// Place every unscheduled task into the week
    Assign,

    /// Drop all placements; tasks go back to the pool
    Clear,

    /// Print the week and the unscheduled pool
    Show,

    /// Energy totals across the week
    Stats,

    /// Show predicted duration/energy for a title
    Predict { title: String },

    /// Config helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.chronoflow/config.toml with defaults
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.log.level);

    match cli.command {
        Command::Add {
            title,
            duration,
            energy,
            frequency,
        } => {
            let mut engine = open_engine(&cfg)?;
            let p = resolve(&title, duration, energy);
            let added = engine.add_task_batch(&title, p.duration, p.energy, frequency.max(1));
            if added.is_empty() {
                bail!("task not added: title must not be empty and duration must be positive");
            }
            for t in &added {
                println!("Added {} | {} | {} min | {}e", t.id, t.title, t.duration, t.energy);
            }
        }

        Command::Delete { id } => {
            let mut engine = open_engine(&cfg)?;
            match engine.delete_task(&id) {
                Some(t) => println!("Deleted {} ({})", t.id, t.title),
                None => println!("No task with id {id}"),
            }
        }

        Command::Assign => {
            let mut engine = open_engine(&cfg)?;
            let report = engine.auto_assign();
            println!("Placed {} task(s)", report.placed.len());
            for id in &report.unplaced {
                if let Some(t) = engine.task(id) {
                    println!("Could not schedule task: {}", t.title);
                }
            }
            print_week(&engine);
        }

        Command::Clear => {
            let mut engine = open_engine(&cfg)?;
            engine.clear_schedule();
            println!("Schedule cleared ({} task(s) back in the pool)", engine.tasks().len());
        }

        Command::Show => {
            let engine = open_engine(&cfg)?;
            print_week(&engine);
        }

        Command::Stats => {
            let engine = open_engine(&cfg)?;
            let s = engine.stats();
            println!("Energy: {} / {}", s.total_energy_used, s.total_energy_capacity);
            println!(
                "Tasks: {} scheduled, {} unscheduled",
                s.scheduled_tasks, s.unscheduled_tasks
            );
        }

        Command::Predict { title } => match chronoflow_core::predict(&title) {
            Some(p) => println!("{title}: {} min, {}e", p.duration, p.energy),
            None => println!("{title}: no prediction"),
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(SystemClock.today())?,
        },
    }

    Ok(())
}

fn open_engine(cfg: &config::Config) -> Result<Engine> {
    let clock = SystemClock;
    let schedule = cfg
        .schedule_for(clock.today())
        .context("resolve week anchor")?;
    Ok(Scheduler::with_config(schedule, state::state_store()?, clock))
}

fn init_tracing(fallback_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("CHRONOFLOW_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_week(engine: &Engine) {
    for day in engine.days() {
        let mut flags = Vec::new();
        if day.is_passed {
            flags.push("passed".to_string());
        }
        if let Some(theme) = &day.theme {
            flags.push(theme.clone());
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!(
            "## {} {} ({}/{}e){}",
            day.name, day.date_label, day.current_energy_load, day.energy_capacity, flags
        );
        for e in &day.scheduled_items {
            let Some(t) = engine.task(&e.task_id) else { continue };
            println!(
                "- {}-{} {} ({}e) [{}]",
                format_minutes(e.start),
                format_minutes(e.end),
                t.title,
                t.energy,
                t.id
            );
        }
    }

    let pool: Vec<_> = engine.unscheduled_tasks().collect();
    println!("\n## Unscheduled ({})", pool.len());
    for t in pool {
        println!("- {} ({} min, {}e) [{}]", t.title, t.duration, t.energy, t.id);
    }
}
