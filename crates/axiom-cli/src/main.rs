//! `axiom` command-line entry point

use anyhow::{Context, Result};
use axiom_cli::{
    logging, render_galaxy, render_ideas, render_notes, score, App, AppConfig, PlanSource,
};
use axiom_core::{plan_file_name, render_markdown_plan, Scale};
use chrono::Utc;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("axiom")
        .version(axiom_cli::VERSION)
        .about("Capture notes, refine them into ideas, and export action plans")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Local store file (overrides the config)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("notes")
                .about("Brain-dump notes")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Capture a note")
                        .arg(Arg::new("text").required(true).num_args(1..).help("Note text")),
                )
                .subcommand(
                    Command::new("list").about("List notes, newest first").arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Output as JSON"),
                    ),
                ),
        )
        .subcommand(
            Command::new("ideas").about("List completed ideas").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(
            Command::new("refine")
                .about("Refine a note into a scored idea with an action plan, interactively")
                .arg(Arg::new("note").required(true).help("Note id")),
        )
        .subcommand(Command::new("galaxy").about("Show completed ideas, best scored first"))
        .subcommand(
            Command::new("score")
                .about("Compute opportunity and feasibility scores")
                .arg(
                    Arg::new("urgency")
                        .long("urgency")
                        .value_parser(value_parser!(u8))
                        .help("Urgency, 1 to 10"),
                )
                .arg(
                    Arg::new("scale")
                        .long("scale")
                        .value_parser(|s: &str| s.parse::<Scale>())
                        .help("Market scale: niche, medium, or massive"),
                )
                .arg(
                    Arg::new("excitement")
                        .long("excitement")
                        .value_parser(value_parser!(u8))
                        .help("Excitement, 1 to 10"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Render a completed idea and its plan as markdown")
                .arg(Arg::new("idea").required(true).help("Idea id"))
                .arg(
                    Arg::new("stories")
                        .long("stories")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("generate")
                        .help("JSON file with the plan's stories"),
                )
                .arg(
                    Arg::new("generate")
                        .long("generate")
                        .action(ArgAction::SetTrue)
                        .help("Ask the assistant for a plan"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the markdown file here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Export, import, or clear local data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("export")
                        .about("Write a backup file")
                        .arg(
                            Arg::new("output")
                                .long("output")
                                .short('o')
                                .value_parser(value_parser!(PathBuf))
                                .help("Backup file (default: dated file in the current directory)"),
                        ),
                )
                .subcommand(
                    Command::new("import").about("Restore from a backup file").arg(
                        Arg::new("file")
                            .required(true)
                            .value_parser(value_parser!(PathBuf)),
                    ),
                )
                .subcommand(
                    Command::new("clear").about("Remove all local data").arg(
                        Arg::new("yes")
                            .long("yes")
                            .action(ArgAction::SetTrue)
                            .help("Confirm deletion"),
                    ),
                ),
        )
}

fn open_app(matches: &ArgMatches) -> Result<App> {
    let mut config = AppConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(store) = matches.get_one::<PathBuf>("store") {
        config = config.with_store(store);
    }
    App::open(config)
}

async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("notes", args)) => {
            let app = open_app(matches)?;
            match args.subcommand() {
                Some(("add", args)) => {
                    let text = args
                        .get_many::<String>("text")
                        .unwrap_or_default()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(" ");
                    let note = app.add_note(&text)?;
                    println!("{}", note.id);
                }
                Some(("list", args)) => {
                    let notes = app.list_notes()?;
                    if args.get_flag("json") {
                        println!("{}", serde_json::to_string_pretty(&notes)?);
                    } else {
                        print!("{}", render_notes(&notes));
                    }
                }
                _ => unreachable!("subcommand required"),
            }
        }
        Some(("ideas", args)) => {
            let ideas = open_app(matches)?.list_ideas()?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&ideas)?);
            } else {
                print!("{}", render_ideas(&ideas));
            }
        }
        Some(("refine", args)) => {
            let app = open_app(matches)?;
            let note = args.get_one::<String>("note").context("missing note id")?;
            let assistant = app.assistant();
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            app.refine(note, assistant.as_ref(), stdin.lock(), stdout.lock())
                .await?;
        }
        Some(("galaxy", _)) => {
            let ideas = open_app(matches)?.galaxy()?;
            if ideas.is_empty() {
                println!("No completed ideas yet");
            } else {
                print!("{}", render_galaxy(&ideas));
            }
        }
        Some(("score", args)) => {
            let scores = score(
                args.get_one::<u8>("urgency").copied(),
                args.get_one::<Scale>("scale").copied(),
                args.get_one::<u8>("excitement").copied(),
            )?;
            println!("Opportunity: {}/10", scores.opportunity);
            println!("Feasibility: {}/10", scores.feasibility);
        }
        Some(("plan", args)) => {
            let app = open_app(matches)?;
            let id = args.get_one::<String>("idea").context("missing idea id")?;
            let idea = app.find_idea(id)?;
            let source = match args.get_one::<PathBuf>("stories") {
                Some(path) => PlanSource::File(path.clone()),
                None if args.get_flag("generate") => PlanSource::Generate,
                None => PlanSource::Fallback,
            };
            let stories = app.plan_for(&idea, &source).await?;

            let now = Utc::now();
            let markdown = render_markdown_plan(&idea, &stories, now.date_naive());
            match args.get_one::<PathBuf>("out-dir") {
                Some(dir) => {
                    let path = dir.join(plan_file_name(&idea, now.timestamp_millis()));
                    std::fs::write(&path, markdown)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("{}", path.display());
                }
                None => print!("{markdown}"),
            }
        }
        Some(("backup", args)) => {
            let app = open_app(matches)?;
            match args.subcommand() {
                Some(("export", args)) => {
                    let now = Utc::now();
                    let path = match args.get_one::<PathBuf>("output") {
                        Some(path) => {
                            app.export_to_file(path, now)?;
                            path.clone()
                        }
                        None => app.export_to_dir(&std::env::current_dir()?, now)?,
                    };
                    println!("{}", path.display());
                }
                Some(("import", args)) => {
                    let file = args
                        .get_one::<PathBuf>("file")
                        .context("missing backup file")?;
                    let written = app.import_from_file(file)?;
                    println!("Restored {written} collection(s)");
                }
                Some(("clear", args)) => {
                    anyhow::ensure!(args.get_flag("yes"), "refusing to clear without --yes");
                    app.clear()?;
                    println!("Local data cleared");
                }
                _ => unreachable!("subcommand required"),
            }
        }
        _ => unreachable!("subcommand required"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("json-logs"));
    run(&matches).await
}
