//! Directo CLI
//!
//! Command-line tool for reconciling the class roster with the family
//! directory and building roster and directory documents.

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use directo_core::{
    by_class, by_student, enrich, make_class_roster, make_student_directory, token_from_env,
    BatchDispatcher, Config, CsvSheetReader, DirectoryData, DocumentService, EnrichedMap,
    GoogleDocsClient, GoogleSheetsReader, MemoryDocumentService, RosterData, SheetData,
    SheetReader,
};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "directo")]
#[command(about = "School class roster and family directory builder", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = directo_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Treat sheet ids as paths to CSV exports, relative to the config file
    #[arg(long, global = true)]
    csv: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reconciled children as JSON
    Enrich,

    /// Print children grouped by class
    Classes {
        /// Only include this grade code
        #[arg(short, long)]
        grade: Option<String>,
    },

    /// Print students with their parents' addresses
    Students {
        /// Only include this grade code
        #[arg(short, long)]
        grade: Option<String>,
    },

    /// Build the class roster document
    BuildRoster(BuildArgs),

    /// Build the student directory document
    BuildDirectory(BuildArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Only include this grade code
    #[arg(short, long)]
    grade: Option<String>,

    /// Document title (defaults to a dated title)
    #[arg(short, long)]
    title: Option<String>,

    /// Build against an in-memory document and print its text
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy)]
enum DocumentKind {
    Roster,
    Directory,
}

impl DocumentKind {
    fn default_title(self) -> String {
        let label = match self {
            Self::Roster => "Class Roster",
            Self::Directory => "Student Directory",
        };
        format!("{} {}", label, Local::now().format("%Y-%m-%d"))
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> directo_core::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load_from_path(&cli.config)?;
    let csv_base = cli
        .csv
        .then(|| cli.config.parent().unwrap_or_else(|| Path::new("")));

    match cli.command {
        Commands::Enrich => cmd_enrich(&config, csv_base),
        Commands::Classes { grade } => cmd_classes(&config, csv_base, grade.as_deref()),
        Commands::Students { grade } => cmd_students(&config, csv_base, grade.as_deref()),
        Commands::BuildRoster(args) => cmd_build(&config, csv_base, DocumentKind::Roster, args),
        Commands::BuildDirectory(args) => {
            cmd_build(&config, csv_base, DocumentKind::Directory, args)
        }
    }
}

fn sheet_reader(
    config: &Config,
    csv_base: Option<&Path>,
) -> directo_core::Result<Box<dyn SheetReader>> {
    if let Some(base) = csv_base {
        Ok(Box::new(CsvSheetReader::with_base_dir(base)))
    } else {
        let token = token_from_env(&config.google.access_token_env)?;
        Ok(Box::new(GoogleSheetsReader::new(token)))
    }
}

fn load_children(config: &Config, csv_base: Option<&Path>) -> directo_core::Result<EnrichedMap> {
    let reader = sheet_reader(config, csv_base)?;

    let roster_sheet = SheetData::read(
        reader.as_ref(),
        &config.roster.sheet_id,
        &config.roster_layout(),
    )?;
    let directory_sheet = SheetData::read(
        reader.as_ref(),
        &config.directory.sheet_id,
        &config.directory_layout(),
    )?;

    let roster = RosterData::from_sheet(&roster_sheet)?;
    let directory = DirectoryData::from_sheet(&directory_sheet)?;
    info!(
        "roster has {} children, directory has {} children and {} parents",
        roster.children.len(),
        directory.children.len(),
        directory.parents.len()
    );

    Ok(enrich(&roster, &directory))
}

fn cmd_enrich(config: &Config, csv_base: Option<&Path>) -> directo_core::Result<()> {
    let children = load_children(config, csv_base)?;
    println!("{}", serde_json::to_string_pretty(&children)?);
    Ok(())
}

fn cmd_classes(
    config: &Config,
    csv_base: Option<&Path>,
    grade: Option<&str>,
) -> directo_core::Result<()> {
    let children = load_children(config, csv_base)?;
    let classes = by_class(&children, grade)?;

    println!("Classes ({}):", classes.len());
    println!();
    for class in &classes {
        println!("{} - {} - {}", class.teacher, class.grade_repr, class.language);
        for student in &class.students {
            println!("  {}", student);
        }
        println!();
    }

    Ok(())
}

fn cmd_students(
    config: &Config,
    csv_base: Option<&Path>,
    grade: Option<&str>,
) -> directo_core::Result<()> {
    let children = load_children(config, csv_base)?;
    let students = by_student(&children, grade)?;

    println!("Students ({}):", students.len());
    println!();
    for student in &students {
        println!("{} - {}", student.name, student.grade_repr);
        let addresses = student.addresses();
        for line in addresses.lines().filter(|l| !l.is_empty()) {
            println!("  {}", line);
        }
        println!();
    }

    Ok(())
}

fn build<S: DocumentService>(
    service: S,
    dispatcher: BatchDispatcher,
    kind: DocumentKind,
    title: &str,
    children: &EnrichedMap,
    grade: Option<&str>,
) -> directo_core::Result<String> {
    match kind {
        DocumentKind::Roster => make_class_roster(service, dispatcher, title, children, grade),
        DocumentKind::Directory => {
            make_student_directory(service, dispatcher, title, children, grade)
        }
    }
}

fn cmd_build(
    config: &Config,
    csv_base: Option<&Path>,
    kind: DocumentKind,
    args: BuildArgs,
) -> directo_core::Result<()> {
    let children = load_children(config, csv_base)?;
    let title = args.title.unwrap_or_else(|| kind.default_title());
    let grade = args.grade.as_deref();

    if args.dry_run {
        let mut service = MemoryDocumentService::new();
        let dispatcher = BatchDispatcher::new(config.document.batch_size, Duration::ZERO);
        let document_id = build(&mut service, dispatcher, kind, &title, &children, grade)?;
        if let Some(document) = service.document(&document_id) {
            print!("{}", document.plain_text());
        }
        println!();
        println!(
            "{} edits in {} batches (dry run)",
            service.edit_count(),
            service.batches().len()
        );
    } else {
        let token = token_from_env(&config.google.access_token_env)?;
        let document_id = build(
            GoogleDocsClient::new(token),
            config.dispatcher(),
            kind,
            &title,
            &children,
            grade,
        )?;
        println!("Created '{}': https://docs.google.com/document/d/{}/edit", title, document_id);
    }

    Ok(())
}
