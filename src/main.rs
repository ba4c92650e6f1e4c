//! `medlink` terminal client.
//!
//! One-shot subcommands (`login`, `patients`, `show`, ...) talk to the API and
//! print a result. `browse` is interactive: every input line is a new value
//! of the search box, fed through the same debounced coordinator the library
//! uses, and lines starting with `:` are commands.

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use medlink::components::add_patient_modal::AddPatientModal;
use medlink::components::add_report_modal::AddReportModal;
use medlink::config::{ClientConfig, ConfigError};
use medlink::net::api::{ApiError, HttpApi, PatientsApi};
use medlink::net::types::{PatientId, RecordType};
use medlink::pages::login::{LoginOutcome, LoginPage};
use medlink::pages::patients::PatientsPage;
use medlink::search::SearchPhase;
use medlink::state::detail::{DetailState, DetailView, NO_RECORDS, NO_TAGS, RecordsView, TagsView};
use medlink::state::patients::{FETCHING_DATA, ListView, NO_PATIENT_DATA};
use medlink::state::session::{FileTokenStore, Session, SessionError};
use medlink::state::ui::{MISSING_TOKEN_NOTICE, Notice, NoticeLevel, Notices};
use medlink::util::highlight::{Segment, highlight_match, render_brackets};

const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", MISSING_TOKEN_NOTICE)]
    NotSignedIn,
    #[error("{0}")]
    Api(ApiError),
    #[error("session store failed: {0}")]
    Session(#[from] SessionError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("no patient with id {0}")]
    PatientNotFound(String),
    #[error("request not completed: {0}")]
    Rejected(String),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingToken => Self::NotSignedIn,
            other => Self::Api(other),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "medlink", about = "MedLink patient records client")]
struct Cli {
    /// Overrides MEDLINK_API_BASE_URL and MEDLINK_AUTH_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides MEDLINK_TOKEN_PATH.
    #[arg(long)]
    token_path: Option<PathBuf>,

    /// Log more (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long, short)]
        username: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "MEDLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session token.
    Logout,
    /// List patients, optionally filtered by name.
    Patients {
        #[arg(long, short, default_value = "")]
        search: String,
    },
    /// Show one patient and their records.
    Show { patient_id: String },
    AddPatient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        gender: String,
    },
    AddReport {
        patient_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long = "type")]
        record_type: RecordType,
    },
    /// Interactive search-and-browse session.
    Browse,
}

struct Context {
    config: ClientConfig,
    api: Arc<dyn PatientsApi>,
    session: Session,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = build_context(&cli)?;
    match cli.command {
        Command::Login { username, password } => run_login(&ctx, &username, password).await,
        Command::Logout => run_logout(&ctx),
        Command::Patients { search } => run_patients(&ctx, &search).await,
        Command::Show { patient_id } => run_show(&ctx, PatientId::new(patient_id)).await,
        Command::AddPatient { name, age, gender } => run_add_patient(&ctx, name, age, gender).await,
        Command::AddReport { patient_id, name, url, record_type } => {
            run_add_report(&ctx, PatientId::new(patient_id), name, url, record_type).await
        }
        Command::Browse => run_browse(&ctx).await,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_context(cli: &Cli) -> Result<Context, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = &cli.token_path {
        config.token_path.clone_from(path);
    }
    let api: Arc<dyn PatientsApi> = Arc::new(HttpApi::new(&config)?);
    let session = Session::open(Arc::new(FileTokenStore::new(config.token_path.clone())));
    Ok(Context { config, api, session })
}

// =============================================================================
// ONE-SHOT COMMANDS
// =============================================================================

async fn run_login(ctx: &Context, username: &str, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => prompt("password: ")?,
    };
    let mut page = LoginPage::new(Arc::clone(&ctx.api), ctx.session.clone(), ctx.config.demo_login);
    page.set_username(username);
    page.set_password(&password);

    match page.submit().await {
        LoginOutcome::SignedIn { demo } => {
            if demo {
                println!("signed in (demo account)");
            } else {
                println!("signed in as {username}");
            }
            Ok(())
        }
        LoginOutcome::Failed(message) => Err(CliError::LoginFailed(message)),
    }
}

fn run_logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session.end()?;
    println!("signed out");
    Ok(())
}

async fn run_patients(ctx: &Context, search: &str) -> Result<(), CliError> {
    let token = ctx.session.require_token()?;
    let patients = ctx.api.search_patients(&token, search).await?;
    let names: Vec<Vec<Segment>> = patients.iter().map(|p| highlight_match(&p.name, search)).collect();
    let view = if patients.is_empty() { ListView::NoData } else { ListView::Rows(patients) };
    println!("{}", render_list(&view, &names));
    Ok(())
}

async fn run_show(ctx: &Context, patient_id: PatientId) -> Result<(), CliError> {
    let token = ctx.session.require_token()?;
    let patient = ctx
        .api
        .search_patients(&token, "")
        .await?
        .into_iter()
        .find(|p| p.id == patient_id)
        .ok_or_else(|| CliError::PatientNotFound(patient_id.to_string()))?;

    let mut detail = DetailState::default();
    detail.select(patient);
    match ctx.api.fetch_records(&token, &patient_id).await {
        Ok(records) => detail.apply_records(records),
        Err(e) => {
            tracing::warn!(error = %e, "records fetch failed");
            detail.apply_failure();
        }
    }
    if let Some(view) = detail.view() {
        println!("{}", render_detail(&view));
    }
    Ok(())
}

async fn run_add_patient(ctx: &Context, name: String, age: String, gender: String) -> Result<(), CliError> {
    let notices = Notices::new();
    let mut modal = AddPatientModal::new(Arc::clone(&ctx.api), ctx.session.clone(), notices.clone());
    modal.name = name;
    modal.age = age;
    modal.gender = gender;

    let created = modal.submit().await;
    let messages = drain_messages(&notices);
    match created {
        Some(patient) => {
            println!("{} (id {})", messages.join("; "), patient.id);
            Ok(())
        }
        None => Err(CliError::Rejected(messages.join("; "))),
    }
}

async fn run_add_report(
    ctx: &Context,
    patient_id: PatientId,
    name: String,
    url: String,
    record_type: RecordType,
) -> Result<(), CliError> {
    let notices = Notices::new();
    let mut modal = AddReportModal::new(Arc::clone(&ctx.api), ctx.session.clone(), notices.clone(), Some(patient_id));
    modal.name = name;
    modal.url = url;
    modal.record_type = Some(record_type);

    let stored = modal.submit().await;
    let messages = drain_messages(&notices);
    match stored {
        Some(_) => {
            println!("{}", messages.join("; "));
            Ok(())
        }
        None => Err(CliError::Rejected(messages.join("; "))),
    }
}

fn drain_messages(notices: &Notices) -> Vec<String> {
    notices.drain().into_iter().map(|n| n.message).collect()
}

fn prompt(label: &str) -> Result<String, CliError> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

// =============================================================================
// BROWSE
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum BrowseInput {
    Query(String),
    Open(usize),
    Refresh,
    AddPatient { age: String, gender: String, name: String },
    AddReport { record_type: RecordType, url: String, name: String },
    Help,
    Quit,
    Invalid(String),
}

const BROWSE_HELP: &str = "\
type to search (empty line lists everyone)
  :open N                          show the Nth listed patient
  :add-patient AGE SEX NAME...     create a patient
  :add-report TYPE URL NAME...     attach a report to the shown patient
                                   (TYPE: diagnoses | medications | labresult)
  :refresh                         re-run the current search
  :help                            this text
  :quit                            leave";

fn parse_browse_input(line: &str) -> BrowseInput {
    let Some(command) = line.trim().strip_prefix(':') else {
        return BrowseInput::Query(line.to_owned());
    };
    let mut words = command.split_whitespace();
    match words.next() {
        Some("q" | "quit") => BrowseInput::Quit,
        Some("h" | "help") => BrowseInput::Help,
        Some("r" | "refresh") => BrowseInput::Refresh,
        Some("o" | "open") => match words.next().map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => BrowseInput::Open(n),
            _ => BrowseInput::Invalid("usage: :open N (N starts at 1)".to_owned()),
        },
        Some("add-patient") => {
            let (Some(age), Some(gender)) = (words.next(), words.next()) else {
                return BrowseInput::Invalid("usage: :add-patient AGE SEX NAME...".to_owned());
            };
            let name = words.collect::<Vec<_>>().join(" ");
            BrowseInput::AddPatient { age: age.to_owned(), gender: gender.to_owned(), name }
        }
        Some("add-report") => {
            let (Some(kind), Some(url)) = (words.next(), words.next()) else {
                return BrowseInput::Invalid("usage: :add-report TYPE URL NAME...".to_owned());
            };
            match kind.parse::<RecordType>() {
                Ok(record_type) => BrowseInput::AddReport {
                    record_type,
                    url: url.to_owned(),
                    name: words.collect::<Vec<_>>().join(" "),
                },
                Err(e) => BrowseInput::Invalid(e),
            }
        }
        Some(other) => BrowseInput::Invalid(format!("unknown command :{other} (try :help)")),
        None => BrowseInput::Invalid("empty command (try :help)".to_owned()),
    }
}

async fn run_browse(ctx: &Context) -> Result<(), CliError> {
    let notices = Notices::new();
    let mut page = PatientsPage::new(
        Arc::clone(&ctx.api),
        ctx.session.clone(),
        notices.clone(),
        ctx.config.search_debounce,
    );
    let _ = page.mount();
    eprintln!("{BROWSE_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(REDRAW_INTERVAL);
    let mut drawn: Option<(u64, u64, SearchPhase)> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_browse_input(&line) {
                    BrowseInput::Quit => break,
                    BrowseInput::Query(query) => page.set_query(&query),
                    BrowseInput::Open(n) => {
                        if matches!(page.list_view(), ListView::Rows(rows) if rows.len() >= n) {
                            let _ = page.select(n - 1);
                        } else {
                            eprintln!("no patient #{n} in the list");
                        }
                    }
                    BrowseInput::Refresh => {
                        if page.refresh().is_none() {
                            eprintln!("a search is already running");
                        }
                    }
                    BrowseInput::AddPatient { age, gender, name } => {
                        let mut modal = page.add_patient_modal();
                        modal.name = name;
                        modal.age = age;
                        modal.gender = gender;
                        let _ = page.add_patient(&mut modal).await;
                    }
                    BrowseInput::AddReport { record_type, url, name } => {
                        let mut modal = page.add_report_modal();
                        modal.name = name;
                        modal.url = url;
                        modal.record_type = Some(record_type);
                        let _ = page.add_report(&mut modal).await;
                    }
                    BrowseInput::Help => eprintln!("{BROWSE_HELP}"),
                    BrowseInput::Invalid(message) => eprintln!("{message}"),
                }
            }
            _ = ticker.tick() => {
                let now = (page.list_revision(), page.detail_revision(), page.search_phase());
                if drawn != Some(now) {
                    drawn = Some(now);
                    redraw(&page);
                }
                for notice in notices.drain() {
                    eprintln!("{}", render_notice(&notice));
                }
            }
        }
    }

    page.teardown();
    Ok(())
}

fn redraw(page: &PatientsPage) {
    println!();
    println!("search: {:?}", page.query());
    println!("{}", render_list(&page.list_view(), &page.highlighted_names()));
    if let Some(view) = page.detail_view() {
        println!();
        println!("{}", render_detail(&view));
    }
}

// =============================================================================
// RENDERING
// =============================================================================

fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("* {}", notice.message),
        NoticeLevel::Error => format!("! {}", notice.message),
    }
}

fn render_list(view: &ListView, names: &[Vec<Segment>]) -> String {
    match view {
        ListView::Fetching => FETCHING_DATA.to_owned(),
        ListView::NoData => NO_PATIENT_DATA.to_owned(),
        ListView::Rows(patients) => patients
            .iter()
            .enumerate()
            .map(|(i, patient)| {
                let name = names
                    .get(i)
                    .map_or_else(|| patient.name.clone(), |segments| render_brackets(segments));
                format!("{:>3}. {name}", i + 1)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_detail(view: &DetailView) -> String {
    let patient = &view.patient;
    let age = patient.age.map_or_else(|| "-".to_owned(), |age| age.to_string());
    let sex = patient.gender.as_deref().unwrap_or("-");
    let mut out = vec![
        format!("{} (id {})", patient.name, patient.id),
        format!("  Age: {age}  Sex: {sex}"),
        format!("  Summary: {}", view.summary.as_deref().unwrap_or(FETCHING_DATA)),
    ];
    if !view.tags.is_empty() {
        out.push(format!("  Tags: {}", view.tags.join(", ")));
    }
    out.push("  Records:".to_owned());
    match &view.records {
        RecordsView::Loading => out.push(format!("    {FETCHING_DATA}")),
        RecordsView::NoRecords => out.push(format!("    {NO_RECORDS}")),
        RecordsView::Records(records) => {
            for record in records {
                out.push(format!("    - {} ({})", record.report_type, record.date.as_deref().unwrap_or("undated")));
                if let Some(summary) = &record.summary {
                    out.push(format!("      {summary}"));
                }
                match &record.tags {
                    TagsView::Tags(tags) => out.push(format!("      Tags: {}", tags.join(", "))),
                    TagsView::NoTags => out.push(format!("      {NO_TAGS}")),
                }
                if let Some(url) = &record.url {
                    out.push(format!("      {url}"));
                }
            }
        }
    }
    out.join("\n")
}
