use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use exam_results::api::{ApiClient, ApiError};
use exam_results::config::Config;
use exam_results::context::{get_state_path, AppContext};
use exam_results::output::{self, Painter, ThemePreference};
use exam_results::presenter::{LookupForm, ResultPresenter, ResultView, SubmitStatus};
use exam_results::records::{load_mark_sheet, MarkSheet};
use exam_results::scoring::{ScoringEngine, ScoringError, StudentExamResult};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_NOT_FOUND: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_VALIDATION: i32 = 5;
const EXIT_SCORING: i32 = 6;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// List exams whose results are published
    Exams,
    /// Look up a student's result by roll number and date of birth
    Lookup {
        /// Exam id (see `exams`)
        #[arg(short, long)]
        exam: Option<u64>,
        /// Roll number printed on the admit card
        #[arg(short, long, default_value = "")]
        roll: String,
        /// Date of birth, YYYY-MM-DD
        #[arg(short, long, default_value = "")]
        dob: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ranked class report from the API (requires sign-in)
    Report {
        #[arg(short, long)]
        exam: u64,
        #[arg(long)]
        class: u64,
        /// Section id; repeat to combine several sections into one ranking
        #[arg(long = "section", required = true)]
        sections: Vec<u64>,
        #[arg(long)]
        session: u64,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Compute one student's result from a local mark sheet
    Compute {
        /// Mark sheet YAML file
        #[arg(long)]
        sheet: PathBuf,
        #[arg(short, long)]
        exam: u64,
        #[arg(short, long)]
        student: u64,
        #[arg(long)]
        json: bool,
    },
    /// Rank a class section from a local mark sheet
    Rank {
        #[arg(long)]
        sheet: PathBuf,
        #[arg(short, long)]
        exam: u64,
        #[arg(long)]
        class: u64,
        #[arg(long)]
        section: u64,
        #[arg(long)]
        session: u64,
        #[arg(long)]
        tsv: bool,
    },
    /// Check the config's grade bands and, optionally, a mark sheet
    Validate {
        #[arg(long)]
        sheet: Option<PathBuf>,
    },
    /// Serve a local mark sheet over HTTP
    Serve {
        #[arg(long)]
        sheet: PathBuf,
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// Bearer token required for class reports
        #[arg(long)]
        token: Option<String>,
    },
    /// Sign in as staff
    Login,
    /// Sign out and forget the stored session
    Logout,
    /// Show or set the colour theme
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemePreference>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "exam-results")]
#[command(about = "Exam result scoring, grading and lookup", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file (defaults to ~/.config/exam-results/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Print an error and exit with the given code
fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn api_exit_code(err: &ApiError) -> i32 {
    match err {
        ApiError::Config(_) => EXIT_CONFIG,
        e if e.is_unauthorized() => EXIT_AUTH,
        _ => EXIT_NETWORK,
    }
}

fn scoring_exit_code(err: &ScoringError) -> i32 {
    if err.is_not_found() {
        EXIT_NOT_FOUND
    } else {
        EXIT_SCORING
    }
}

fn load_engine(path: &Path, config: &Config) -> ScoringEngine<MarkSheet> {
    let sheet = load_mark_sheet(path).unwrap_or_else(|e| fail(EXIT_CONFIG, format!("{:#}", e)));
    if let Err(errors) = sheet.validate() {
        eprintln!("Mark sheet errors in {}:", path.display());
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_VALIDATION);
    }
    ScoringEngine::new(sheet, config.grading_scale(), config.scoring_policy())
}

fn print_json(result: &StudentExamResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(EXIT_SCORING, format!("Failed to serialize result: {}", e)),
    }
}

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| fail(EXIT_CONFIG, "Failed to install rustls crypto provider"));

    let cli = Cli::parse();
    exam_results::logging::init_logging(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = cli.command {
        if let Err(e) = exam_results::config::run_init_wizard(config_path) {
            fail(EXIT_CONFIG, format!("Init failed: {:#}", e));
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = exam_results::config::load_config(config_path)
        .unwrap_or_else(|e| fail(EXIT_CONFIG, format!("Config error: {:#}", e)));

    // Grade bands are checked before any command runs
    if let Err(errors) = exam_results::scoring::validate_grading(&config.grading_scale()) {
        eprintln!("Grading config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let mut ctx = AppContext::hydrate(config, get_state_path())
        .unwrap_or_else(|e| fail(EXIT_CONFIG, format!("State error: {:#}", e)));
    let painter = Painter::new(output::should_use_colors(), ctx.theme());

    match cli.command {
        Commands::Init => unreachable!("handled before config is loaded"),
        Commands::Exams => {
            let client = ApiClient::new(&ctx.config().api, ctx.token())
                .unwrap_or_else(|e| fail(EXIT_CONFIG, e));
            match client.list_published_exams().await {
                Ok(exams) => println!("{}", output::format_exam_list(&exams, &painter)),
                Err(e) => fail(api_exit_code(&e), e.user_message()),
            }
        }
        Commands::Lookup {
            exam,
            roll,
            dob,
            json,
        } => {
            let client =
                ApiClient::new(&ctx.config().api, None).unwrap_or_else(|e| fail(EXIT_CONFIG, e));
            let presenter = ResultPresenter::new(client);

            let status = presenter
                .submit(&LookupForm::new(exam, &roll, &dob))
                .await;
            debug!(?status, elapsed = ?start_time.elapsed(), "lookup finished");

            match presenter.view() {
                ResultView::Found(result) if json => print_json(&result),
                ResultView::Found(result) => {
                    // The exam name is cosmetic; skip it if the list is unavailable
                    let exam_name = match exam {
                        Some(id) => presenter
                            .published_exams()
                            .await
                            .ok()
                            .and_then(|exams| exams.into_iter().find(|e| e.id == id))
                            .map(|e| e.name),
                        None => None,
                    };
                    println!(
                        "{}",
                        output::format_result_card(&result, exam_name.as_deref(), &painter)
                    );
                }
                view => {
                    let code = match (&status, &view) {
                        (SubmitStatus::Rejected(_), _) => EXIT_VALIDATION,
                        (_, ResultView::NotFound) => EXIT_NOT_FOUND,
                        _ => EXIT_NETWORK,
                    };
                    fail(code, view.message().unwrap_or("Lookup did not complete."));
                }
            }
        }
        Commands::Report {
            exam,
            class,
            sections,
            session,
            tsv,
        } => {
            let Some(token) = ctx.token() else {
                fail(EXIT_AUTH, "Not signed in. Run `exam-results login` first.");
            };
            let client = ApiClient::new(&ctx.config().api, Some(token))
                .unwrap_or_else(|e| fail(EXIT_CONFIG, e));

            let reports =
                match exam_results::report::fetch_class_reports(&client, exam, class, &sections, session)
                    .await
                {
                    Ok(reports) => reports,
                    Err(e) => match e.downcast_ref::<ApiError>() {
                        Some(api) => fail(api_exit_code(api), api.user_message()),
                        None => fail(EXIT_NETWORK, format!("{:#}", e)),
                    },
                };
            if reports.len() < sections.len() {
                eprintln!(
                    "Showing {} of {} sections; see log for failures.",
                    reports.len(),
                    sections.len()
                );
            }

            let results = if sections.len() == 1 {
                reports.into_iter().flat_map(|r| r.results).collect::<Vec<_>>()
            } else {
                exam_results::report::combine_sections(reports, ctx.config().scoring_policy().ranking())
            };

            if tsv {
                println!("{}", output::format_tsv(&results));
            } else {
                println!("{}", output::format_class_table(&results, &painter));
            }
        }
        Commands::Compute {
            sheet,
            exam,
            student,
            json,
        } => {
            let engine = load_engine(&sheet, ctx.config());
            match engine.compute_result(exam, student) {
                Ok(result) if json => print_json(&result),
                Ok(result) => {
                    let exam_name = engine
                        .published_exams()
                        .into_iter()
                        .find(|e| e.id == exam)
                        .map(|e| e.name);
                    println!(
                        "{}",
                        output::format_result_card(&result, exam_name.as_deref(), &painter)
                    );
                }
                Err(e) => fail(scoring_exit_code(&e), e),
            }
        }
        Commands::Rank {
            sheet,
            exam,
            class,
            section,
            session,
            tsv,
        } => {
            let engine = load_engine(&sheet, ctx.config());
            match engine.compute_class_results(exam, class, section, session) {
                Ok(results) if tsv => println!("{}", output::format_tsv(&results)),
                Ok(results) => println!("{}", output::format_class_table(&results, &painter)),
                Err(e) => fail(scoring_exit_code(&e), e),
            }
        }
        Commands::Validate { sheet } => {
            if let Some(path) = sheet {
                load_engine(&path, ctx.config());
                println!("Mark sheet {} is valid.", path.display());
            }
            println!("Configuration is valid.");
        }
        Commands::Serve { sheet, addr, token } => {
            let engine = load_engine(&sheet, ctx.config());
            let state = exam_results::server::ServerState::new(engine, token);
            let app = exam_results::server::router(state);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .unwrap_or_else(|e| fail(EXIT_NETWORK, format!("Failed to bind {}: {}", addr, e)));
            info!(sheet = %sheet.display(), "serving mark sheet");
            if let Err(e) = exam_results::server::serve(listener, app).await {
                fail(EXIT_NETWORK, format!("Server error: {:#}", e));
            }
        }
        Commands::Login => match exam_results::credentials::sign_in_interactive(&mut ctx).await {
            Ok(session) => println!("Signed in as {}.", session.username),
            Err(e) => {
                let code = e.downcast_ref::<ApiError>().map_or(EXIT_AUTH, api_exit_code);
                fail(code, format!("{:#}", e));
            }
        },
        Commands::Logout => match ctx.logout() {
            Ok(true) => println!("Signed out."),
            Ok(false) => println!("Not signed in."),
            Err(e) => fail(EXIT_CONFIG, format!("{:#}", e)),
        },
        Commands::Theme { theme } => match theme {
            Some(theme) => match ctx.set_theme(theme) {
                Ok(()) => println!("Theme set to {}.", theme.as_str()),
                Err(e) => fail(EXIT_CONFIG, format!("{:#}", e)),
            },
            None => println!("{}", ctx.theme().as_str()),
        },
    }

    std::process::exit(EXIT_SUCCESS);
}
