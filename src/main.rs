use anyhow::Result;
use bitacora::build::build_site;
use bitacora::config::Config;
use bitacora::scaffold::new_post;
use chrono::{Local, NaiveDate};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("bitacora")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds the blog pages and index from Markdown articles")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs progress at the info level"),
        )
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .value_name("DIR")
                .takes_value(true)
                .global(true)
                .help("Directory to search for bitacora.yaml (defaults to the current directory)"),
        )
        .subcommand(SubCommand::with_name("build").about("Builds post pages and refreshes the index page"))
        .subcommand(
            SubCommand::with_name("new")
                .about("Creates a new post source file")
                .arg(Arg::with_name("TITLE").required(true).help("The article title"))
                .arg(Arg::with_name("IMAGE").help("The hero image")),
        )
        .get_matches();

    // Global args given after the subcommand only land in its matches.
    let args = match matches.subcommand() {
        (_, Some(sub)) => sub,
        _ => &matches,
    };
    init_logging(args.is_present("verbose"));

    if let Err(e) = run(&matches, args.value_of("project")) {
        eprintln!("Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

// RUST_LOG wins; otherwise `--verbose` selects info and the default is warn.
fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("info"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches, project: Option<&str>) -> Result<()> {
    let project = match project {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = Config::from_directory(&project)?;
    let today = today();

    match matches.subcommand() {
        ("build", Some(_)) => {
            let summary = build_site(&config, today)?;
            println!(
                "Built {} posts ({} drafts skipped)",
                summary.published.len(),
                summary.drafts.len()
            );
        }
        ("new", Some(args)) => {
            // TITLE is required, so clap guarantees it's present.
            let title = args.value_of("TITLE").unwrap_or_default();
            let path = new_post(&config, title, args.value_of("IMAGE"), today)?;
            println!("Created {}", path.display());
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
