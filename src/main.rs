//! Job Test Run CLI
//!
//! Entry point for the `testrun` command-line tool.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use job_testrun::config::{default_user_path, REPO_CONFIG_PATH};
use job_testrun::{ClientConfig, EditorEvent, Effect, LoadedConfig, TestEditor};
use testrun_protocol::{FlashKind, PageRequest, PageResponse, SubmitFields, TestPageData};
use testrun_server::{logging, Catalog, InMemoryStore, PageHandler, RouteParams};

#[derive(Parser)]
#[command(name = "testrun")]
#[command(about = "Author and submit job test payloads", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the environments, examples and recent runs for a job
    Show {
        #[command(flatten)]
        job: JobArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the fields that would be submitted
    Compose {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Submit a test run
    Submit {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Write the catalog back so the run shows up under recent runs
        #[arg(long)]
        persist: bool,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Path to repo config file (default: .testrun/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Organization slug
    #[arg(long)]
    org: Option<String>,

    /// Project slug
    #[arg(long)]
    project: Option<String>,

    /// Job slug
    #[arg(long)]
    job: Option<String>,

    /// Catalog file with environments, examples and recent runs
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Args)]
struct PayloadArgs {
    /// Read the payload from a file instead of a stored source
    #[arg(long, conflicts_with_all = ["example", "run"])]
    payload_file: Option<PathBuf>,

    /// Start from an example payload
    #[arg(long, conflicts_with = "run")]
    example: Option<String>,

    /// Start from a recent run's payload
    #[arg(long)]
    run: Option<String>,

    /// Environment id or slug (default: configured, else the first)
    #[arg(long, short = 'e')]
    environment: Option<String>,

    /// Account id, for environments with an auth resolver
    #[arg(long)]
    account_id: Option<String>,
}

/// A loaded page ready for editing.
struct Page {
    config: ClientConfig,
    route: RouteParams,
    catalog_path: PathBuf,
    store: InMemoryStore,
    data: TestPageData,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { job, json } => run_show(&job, json),
        Commands::Compose { job, payload } => run_compose(&job, &payload),
        Commands::Submit {
            job,
            payload,
            json,
            persist,
        } => run_submit(&job, &payload, json, persist),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_config(args: &JobArgs) -> LoadedConfig {
    let mut overrides = serde_json::Map::new();
    for (key, value) in [("organization", &args.org), ("project", &args.project), ("job", &args.job)] {
        if let Some(value) = value {
            overrides.insert(key.to_string(), serde_json::json!(value));
        }
    }
    if let Some(ref catalog) = args.catalog {
        overrides.insert("catalog".to_string(), serde_json::json!(catalog));
    }
    if args.verbose {
        overrides.insert("log_level".to_string(), serde_json::json!("debug"));
    }

    let repo_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(REPO_CONFIG_PATH));
    let user_path = default_user_path();

    match ClientConfig::build(
        user_path.as_deref(),
        Some(&repo_path),
        Some(serde_json::Value::Object(overrides)),
    ) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    }
}

fn open_page(args: &JobArgs) -> Page {
    let loaded = load_config(args);
    let config = loaded.config;
    logging::init(&config.log_level);
    tracing::debug!(sources = ?loaded.sources, "configuration loaded");

    let route = config.route().unwrap_or_else(|e| fail(e));
    let catalog_path = config
        .catalog_path()
        .unwrap_or_else(|e| fail(e))
        .to_path_buf();
    let catalog = Catalog::from_file(&catalog_path)
        .unwrap_or_else(|e| fail(format!("loading catalog {}: {}", catalog_path.display(), e)));
    let store = InMemoryStore::new(catalog, &Default::default());

    let handler = PageHandler::new(store.clone(), store.clone());
    let data = match handler.handle(&PageRequest::get(route.test_path())) {
        Ok(PageResponse::View(data)) => data,
        Ok(other) => fail(format!("unexpected response to page load: {:?}", other)),
        Err(e) => fail(e),
    };

    Page {
        config,
        route,
        catalog_path,
        store,
        data,
    }
}

/// Replay the CLI's choices as editor events.
fn build_editor(page: &Page, args: &PayloadArgs) -> TestEditor {
    let mut editor = TestEditor::new(page.data.clone()).unwrap_or_else(|e| fail(e));

    let mut events = Vec::new();
    if let Some(id) = args.example.as_ref().or(args.run.as_ref()) {
        events.push(EditorEvent::SelectSource(id.clone()));
    }
    if let Some(ref path) = args.payload_file {
        let text = fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("reading {}: {}", path.display(), e)));
        events.push(EditorEvent::EditText(text));
    }
    if let Some(key) = args.environment.as_ref().or(page.config.environment.as_ref()) {
        let env = page
            .data
            .find_environment(key)
            .unwrap_or_else(|| fail(format!("unknown environment: {}", key)));
        events.push(EditorEvent::SelectEnvironment(env.id.clone()));
    }
    if let Some(ref account_id) = args.account_id {
        events.push(EditorEvent::SetAccountId(account_id.clone()));
    }

    for event in events {
        if let Err(e) = editor.apply(event) {
            fail(e);
        }
    }

    if args.account_id.is_some() && !editor.environment().account_id_field_visible() {
        eprintln!(
            "Warning: environment '{}' has no auth resolver; --account-id is ignored",
            editor.environment().selected_environment().slug
        );
    }
    editor
}

fn submit_fields(editor: &mut TestEditor) -> SubmitFields {
    match editor.apply(EditorEvent::Submit) {
        Ok(Effect::Post(fields)) => fields,
        Ok(other) => fail(format!("unexpected submit effect: {:?}", other)),
        Err(e) => fail(e),
    }
}

fn run_show(args: &JobArgs, json: bool) {
    let page = open_page(args);

    if json {
        match serde_json::to_string_pretty(&page.data) {
            Ok(out) => println!("{}", out),
            Err(e) => fail(format!("serializing output: {}", e)),
        }
        return;
    }

    println!("Job: {}", page.route);
    println!();
    if page.data.environments.is_empty() {
        println!("  Can't run a test: this job has no environments");
    } else {
        println!("Environments:");
        for env in &page.data.environments {
            let auth = if env.has_auth_resolver { " (account id required)" } else { "" };
            println!(
                "  {:<12} {:<8} {} version {}{}",
                env.slug,
                env.kind.to_string(),
                env.id,
                env.version_id,
                auth
            );
        }
    }
    if !page.data.examples.is_empty() {
        println!("Examples:");
        for example in &page.data.examples {
            println!("  {:<16} {}", example.id, example.name);
        }
    }
    if !page.data.runs.is_empty() {
        println!("Recent runs:");
        for run in &page.data.runs {
            println!("  #{:<5} {}  {}", run.number, run.id, run.created_at.format("%Y-%m-%d %H:%M:%S"));
        }
    }
}

fn run_compose(args: &JobArgs, payload: &PayloadArgs) {
    let page = open_page(args);
    let mut editor = build_editor(&page, payload);
    let fields = submit_fields(&mut editor);

    match serde_json::to_string_pretty(&fields) {
        Ok(out) => println!("{}", out),
        Err(e) => fail(format!("serializing output: {}", e)),
    }
}

fn run_submit(args: &JobArgs, payload: &PayloadArgs, json: bool, persist: bool) {
    let page = open_page(args);
    let mut editor = build_editor(&page, payload);
    let fields = submit_fields(&mut editor);

    let handler = PageHandler::new(page.store.clone(), page.store.clone());
    let test_path = page.route.test_path();
    let request = PageRequest::post(&test_path, fields.to_form()).with_referer(&test_path);
    let response = match handler.handle(&request) {
        Ok(response) => response,
        Err(e) => {
            let _ = editor.apply(EditorEvent::Fail(e.to_failure()));
            fail(e)
        }
    };

    if json {
        match serde_json::to_string_pretty(&response) {
            Ok(out) => println!("{}", out),
            Err(e) => fail(format!("serializing output: {}", e)),
        }
    }

    let effect = editor
        .apply(EditorEvent::Settle(response))
        .unwrap_or_else(|e| fail(e));

    let succeeded = match effect {
        Effect::Navigate { location, flash } => {
            if !json {
                println!("{}", flash.message);
                println!("  -> {}", location);
            }
            flash.kind == FlashKind::Success
        }
        Effect::None | Effect::Post(_) => {
            if !json {
                println!("Submission is invalid:");
                for (field, messages) in editor.field_errors().iter() {
                    for message in messages {
                        println!("  {}: {}", field, message);
                    }
                }
            }
            false
        }
    };

    if succeeded && persist {
        let out = serde_json::to_string_pretty(&page.store.catalog())
            .unwrap_or_else(|e| fail(format!("serializing catalog: {}", e)));
        if let Err(e) = fs::write(&page.catalog_path, out) {
            fail(format!("writing catalog {}: {}", page.catalog_path.display(), e));
        }
    }

    process::exit(if succeeded { 0 } else { 1 });
}
