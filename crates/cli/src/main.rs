// Vitrine CLI - build product catalogues from photos and a spreadsheet

mod exit_codes;
mod script;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vitrine_config::{Settings, SettingsError};
use vitrine_core::{project, CatalogueError, CataloguePage};
use vitrine_io::IoError;

// Re-export exit codes from registry (single source of truth)
use exit_codes::{
    EXIT_DATA_PARSE, EXIT_ERROR, EXIT_IO, EXIT_SCRIPT, EXIT_SUCCESS, EXIT_USAGE, EXIT_VALIDATION,
};
use script::ScriptError;
use session::SessionInputs;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Match product photos to spreadsheet rows and lay them out as a catalogue")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/vitrine/settings.json)
    #[arg(long, global = true, env = "VITRINE_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a catalogue document
    #[command(after_help = "\
Examples:
  vitrine build -i photos/ -d products.xlsx -o catalogue.html
  vitrine build -i photos/ -d products.csv --format json -o catalogue.json
  vitrine build -i photos/ -d products.xlsx --script edits.toml --contact 919000000000
  vitrine build --script session.toml --logo logo.png")]
    Build {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Document format
        #[arg(long, short = 'f', default_value = "html")]
        format: DocumentFormat,

        /// Logo shown on every page (overrides export.logoPath)
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Enquiry contact number (overrides export.contactNumber)
        #[arg(long)]
        contact: Option<String>,
    },

    /// List the pages a build would produce
    #[command(after_help = "\
Examples:
  vitrine preview -i photos/ -d products.xlsx
  vitrine preview -i photos/ --script edits.toml")]
    Preview {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show the rows a data file normalizes to
    #[command(after_help = "\
Examples:
  vitrine rows products.xlsx
  vitrine rows products.csv --json | jq '.rows[].title'")]
    Rows {
        /// Spreadsheet or CSV file
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Settings file helpers
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Image files or directories (directories add their images, one level deep)
    #[arg(long, short = 'i', num_args = 1..)]
    images: Vec<PathBuf>,

    /// Spreadsheet or CSV with one row per product
    #[arg(long, short = 'd')]
    data: Option<PathBuf>,

    /// TOML edit script applied after images and data
    #[arg(long, short = 's')]
    script: Option<PathBuf>,
}

impl From<InputArgs> for SessionInputs {
    fn from(args: InputArgs) -> Self {
        SessionInputs {
            images: args.images,
            data: args.data,
            script: args.script,
        }
    }
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the settings file location
    Path,
    /// Write a commented default settings file
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentFormat {
    Html,
    Json,
}

impl DocumentFormat {
    fn default_output(self) -> PathBuf {
        match self {
            Self::Html => PathBuf::from("catalogue.html"),
            Self::Json => PathBuf::from("catalogue.json"),
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("VITRINE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: vitrine <command> [options]");
            eprintln!("       vitrine --help for more information");
            Ok(())
        }
        Some(Commands::Build { inputs, output, format, logo, contact }) => {
            cmd_build(cli.settings, inputs.into(), output, format, logo, contact).await
        }
        Some(Commands::Preview { inputs }) => cmd_preview(cli.settings, inputs.into()).await,
        Some(Commands::Rows { file, json }) => cmd_rows(cli.settings, file, json),
        Some(Commands::Settings { action }) => cmd_settings(cli.settings, action),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(&path),
        None => Settings::load(),
    }
    .map_err(CliError::settings)
}

async fn cmd_build(
    settings_path: Option<PathBuf>,
    inputs: SessionInputs,
    output: Option<PathBuf>,
    format: DocumentFormat,
    logo: Option<PathBuf>,
    contact: Option<String>,
) -> Result<(), CliError> {
    let settings = load_settings(settings_path)?;
    let store = session::assemble(&inputs, &settings).await?;
    let options = session::export_options(&settings, contact, logo)?;

    if let Some(report) = session::unmatched_report(&store) {
        eprintln!("warning: {}", report);
    }
    if store.products().is_empty() {
        return Err(CliError::validation("catalogue has no products")
            .with_hint("check that image filenames match the data file's image column"));
    }
    if options.contact_number.is_empty() {
        eprintln!("warning: no contact number set; enquiry links will be incomplete");
    }

    let pages = project(store.products(), &options);
    let output = output.unwrap_or_else(|| format.default_output());
    match format {
        DocumentFormat::Html => vitrine_io::document::write_html(&pages, &options, &output),
        DocumentFormat::Json => vitrine_io::json::export(&pages, &output),
    }
    .map_err(CliError::from)?;

    eprintln!("wrote {} page(s) to {}", pages.len(), output.display());
    Ok(())
}

async fn cmd_preview(settings_path: Option<PathBuf>, inputs: SessionInputs) -> Result<(), CliError> {
    let settings = load_settings(settings_path)?;
    let store = session::assemble(&inputs, &settings).await?;
    let pages = project(store.products(), &settings.export_options());

    for page in &pages {
        println!("{}", preview_line(page));
    }
    if let Some(name) = store.data_file_name() {
        println!("data file: {} ({} rows)", name, store.rows().len());
    }
    if let Some(report) = session::unmatched_report(&store) {
        println!("{}", report);
    }
    Ok(())
}

fn preview_line(page: &CataloguePage) -> String {
    let image = page
        .image
        .as_deref()
        .map(|img| img.filename.as_str())
        .unwrap_or("-");
    let price = page.price_label.as_deref().unwrap_or("");
    format!("{:>3}  {:<28}  {:<24}  {}", page.page_number, page.title, image, price)
        .trim_end()
        .to_string()
}

fn cmd_rows(settings_path: Option<PathBuf>, file: PathBuf, json: bool) -> Result<(), CliError> {
    let settings = load_settings(settings_path)?;
    let normalized = vitrine_io::parse_data_file(&file, &settings.headers)
        .map_err(|e| CliError::catalogue(e.into()))?;

    if json {
        let value = serde_json::json!({
            "file": vitrine_io::data_file::display_name(&file),
            "rows": normalized.rows,
            "dropped": normalized.dropped,
        });
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    for row in &normalized.rows {
        println!("{:<24}  {:<28}  {}", row.image_key, row.title, row.price);
    }
    println!("{} row(s), {} dropped without an image key", normalized.rows.len(), normalized.dropped);
    Ok(())
}

fn cmd_settings(settings_path: Option<PathBuf>, action: SettingsAction) -> Result<(), CliError> {
    let path = settings_path.unwrap_or_else(Settings::config_path);
    match action {
        SettingsAction::Path => println!("{}", path.display()),
        SettingsAction::Init => {
            if Settings::write_default_file(&path).map_err(CliError::settings)? {
                println!("wrote {}", path.display());
            } else {
                return Err(CliError::args(format!("{} already exists", path.display()))
                    .with_hint("edit it in place or delete it first"));
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self { code: EXIT_VALIDATION, message: msg.into(), hint: None }
    }

    pub fn catalogue(err: CatalogueError) -> Self {
        let (code, hint) = match &err {
            CatalogueError::DataFileParse(_) => (
                EXIT_DATA_PARSE,
                Some("the catalogue was left as it was; fix the file and load it again".to_string()),
            ),
            CatalogueError::Validation(_)
            | CatalogueError::UnknownProduct(_)
            | CatalogueError::IndexOutOfRange { .. } => (EXIT_VALIDATION, None),
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn script(err: ScriptError) -> Self {
        match err {
            // Keep the underlying exit code, prefixed with the step.
            ScriptError::Catalogue { step, op, source } => {
                let inner = Self::catalogue(source);
                Self { message: format!("step {} ({}): {}", step, op, inner.message), ..inner }
            }
            ScriptError::Io { .. } => Self { code: EXIT_IO, message: err.to_string(), hint: None },
            ScriptError::UnconfirmedReset { .. } => Self {
                code: EXIT_SCRIPT,
                message: err.to_string(),
                hint: Some("add `confirm = true` to the reset step".to_string()),
            },
            ScriptError::Read { .. } | ScriptError::Parse(_) => {
                Self { code: EXIT_SCRIPT, message: err.to_string(), hint: None }
            }
        }
    }

    pub fn settings(err: SettingsError) -> Self {
        let hint = match &err {
            SettingsError::Parse { .. } => Some("run `vitrine settings path` to locate the file".to_string()),
            _ => None,
        };
        let code = match &err {
            SettingsError::Parse { .. } => EXIT_ERROR,
            SettingsError::Read { .. } | SettingsError::Write { .. } => EXIT_IO,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CatalogueError> for CliError {
    fn from(err: CatalogueError) -> Self {
        Self::catalogue(err)
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::NotAnImage(_) => Some("supported: jpg, png, gif, webp, bmp, svg".to_string()),
            _ => None,
        };
        Self { code: EXIT_IO, message: err.to_string(), hint }
    }
}
