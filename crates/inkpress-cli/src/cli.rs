//! Argument parsing and command dispatch for the `inkpress` binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inkpress_api_models::{
    CompressQuality, RotationAngle, SplitMethod, WatermarkPages, WatermarkPosition,
};
use inkpress_client::{ApiClient, SessionStore};
use inkpress_events::EventBus;
use reqwest::Url;
use tracing::debug;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{account, auth, split, tools};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_API_URL: &str = "https://api.inkpress.app";

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let session_file = cli.session_file.unwrap_or_else(default_session_file);
    debug!(session_file = %session_file.display(), "opening session store");

    let bus = EventBus::new();
    let session = SessionStore::open(session_file, bus.clone());
    let api = ApiClient::with_timeout(
        cli.api_url,
        session,
        Duration::from_secs(cli.timeout),
    )
    .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

    let ctx = AppContext {
        api,
        bus,
        output: cli.output,
    };

    match cli.command {
        Command::Auth(auth) => match auth {
            AuthCommand::Register(args) => auth::handle_register(&ctx, args).await,
            AuthCommand::Login(args) => auth::handle_login(&ctx, args).await,
            AuthCommand::Logout => auth::handle_logout(&ctx).await,
            AuthCommand::Validate => auth::handle_validate(&ctx).await,
            AuthCommand::ResetPassword(args) => auth::handle_reset_password(&ctx, args).await,
            AuthCommand::ResetConfirm(args) => auth::handle_reset_confirm(&ctx, args).await,
            AuthCommand::VerifyEmail(args) => auth::handle_verify_email(&ctx, args).await,
        },
        Command::Compress(args) => tools::handle_compress(&ctx, args).await,
        Command::Convert(args) => tools::handle_convert(&ctx, args).await,
        Command::Merge(args) => tools::handle_merge(&ctx, args).await,
        Command::Split(args) => split::handle_split(&ctx, args).await,
        Command::Protect(args) => tools::handle_protect(&ctx, args).await,
        Command::Unlock(args) => tools::handle_unlock(&ctx, args).await,
        Command::Rotate(args) => tools::handle_rotate(&ctx, args).await,
        Command::Watermark(args) => tools::handle_watermark(&ctx, args).await,
        Command::Pagenumber(args) => tools::handle_page_numbers(&ctx, args).await,
        Command::Remove(args) => tools::handle_remove_pages(&ctx, args).await,
        Command::Sign(args) => tools::handle_sign(&ctx, args).await,
        Command::ExtractText(args) => tools::handle_extract_text(&ctx, args).await,
        Command::SaveText(args) => tools::handle_save_text(&ctx, args).await,
        Command::Ocr(args) => tools::handle_ocr(&ctx, args).await,
        Command::OcrExtract(args) => tools::handle_ocr_extract(&ctx, args).await,
        Command::Account(account_cmd) => match account_cmd {
            AccountCommand::Profile => account::handle_profile(&ctx).await,
            AccountCommand::Update(args) => account::handle_update_profile(&ctx, args).await,
            AccountCommand::Password => account::handle_change_password(&ctx).await,
            AccountCommand::Balance => account::handle_balance(&ctx).await,
            AccountCommand::Deposit(args) => account::handle_deposit(&ctx, args).await,
            AccountCommand::VerifyDeposit(args) => account::handle_verify_deposit(&ctx, args).await,
        },
        Command::Keys(keys) => match keys {
            KeysCommand::List => account::handle_keys_list(&ctx).await,
            KeysCommand::Create(args) => account::handle_keys_create(&ctx, args).await,
            KeysCommand::Revoke(args) => account::handle_keys_revoke(&ctx, args).await,
        },
        Command::Pricing(pricing) => match pricing {
            PricingCommand::Info => account::handle_pricing_info(&ctx).await,
            PricingCommand::Operation(args) => account::handle_pricing_operation(&ctx, args).await,
            PricingCommand::Calc(args) => account::handle_pricing_calc(&ctx, args).await,
        },
        Command::Usage(usage) => match usage {
            UsageCommand::Stats => account::handle_usage_stats(&ctx).await,
            UsageCommand::Track(args) => account::handle_usage_track(&ctx, args).await,
        },
        Command::Health => account::handle_health(&ctx).await,
    }
}

fn default_session_file() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || PathBuf::from(".inkpress-session.json"),
        |home| PathBuf::from(home).join(".inkpress").join("session.json"),
    )
}

fn parse_url(raw: &str) -> Result<Url, String> {
    Url::parse(raw).map_err(|err| format!("invalid URL: {err}"))
}

#[derive(Parser)]
#[command(name = "inkpress", about = "Command-line client for the Inkpress PDF service")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "INKPRESS_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "INKPRESS_SESSION_FILE",
        help = "Path of the session file (defaults to ~/.inkpress/session.json)"
    )]
    session_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "INKPRESS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

/// Output format for commands that render structured data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Command {
    #[command(subcommand, about = "Account registration and session management")]
    Auth(AuthCommand),
    #[command(about = "Compress a PDF")]
    Compress(CompressArgs),
    #[command(about = "Convert a PDF to another format")]
    Convert(ConvertArgs),
    #[command(about = "Merge two or more PDFs into one")]
    Merge(MergeArgs),
    #[command(about = "Split a PDF into multiple documents")]
    Split(SplitArgs),
    #[command(about = "Password-protect a PDF")]
    Protect(ProtectArgs),
    #[command(about = "Remove password protection from a PDF")]
    Unlock(UnlockArgs),
    #[command(about = "Rotate pages of a PDF")]
    Rotate(RotateArgs),
    #[command(about = "Stamp a text or image watermark on a PDF")]
    Watermark(WatermarkArgs),
    #[command(about = "Add page numbers to a PDF")]
    Pagenumber(PagenumberArgs),
    #[command(about = "Remove pages from a PDF")]
    Remove(RemoveArgs),
    #[command(about = "Place a signature image on a PDF page")]
    Sign(SignArgs),
    #[command(name = "extract-text", about = "Open a text-edit session for a PDF")]
    ExtractText(ExtractTextArgs),
    #[command(name = "save-text", about = "Save edited text back into a session")]
    SaveText(SaveTextArgs),
    #[command(about = "Run OCR over a scanned PDF")]
    Ocr(OcrArgs),
    #[command(name = "ocr-extract", about = "Extract recognised text from a scanned PDF")]
    OcrExtract(OcrExtractArgs),
    #[command(subcommand, about = "Profile, password, balance, and deposits")]
    Account(AccountCommand),
    #[command(subcommand, about = "API key management")]
    Keys(KeysCommand),
    #[command(subcommand, about = "Pricing information")]
    Pricing(PricingCommand),
    #[command(subcommand, about = "Usage statistics and tracking")]
    Usage(UsageCommand),
    #[command(about = "Check service health")]
    Health,
}

#[derive(Subcommand)]
enum AuthCommand {
    Register(RegisterArgs),
    Login(LoginArgs),
    Logout,
    Validate,
    ResetPassword(ResetPasswordArgs),
    ResetConfirm(ResetConfirmArgs),
    VerifyEmail(VerifyEmailArgs),
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, help = "Prompted for interactively when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, help = "Prompted for interactively when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct ResetPasswordArgs {
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args)]
pub(crate) struct ResetConfirmArgs {
    #[arg(long)]
    pub(crate) token: String,
    #[arg(long, help = "Prompted for interactively when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct VerifyEmailArgs {
    #[arg(long, help = "Confirm a token; omit to request a new email")]
    pub(crate) token: Option<String>,
}

/// Quality levels accepted by the compress endpoint.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum QualityArg {
    High,
    Medium,
    Low,
}

impl From<QualityArg> for CompressQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::High => Self::High,
            QualityArg::Medium => Self::Medium,
            QualityArg::Low => Self::Low,
        }
    }
}

#[derive(Args)]
pub(crate) struct CompressArgs {
    #[arg(help = "Path of the PDF to compress")]
    pub(crate) file: PathBuf,
    #[arg(long, value_enum, default_value_t = QualityArg::Medium)]
    pub(crate) quality: QualityArg,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ConvertArgs {
    #[arg(help = "Path of the PDF to convert")]
    pub(crate) file: PathBuf,
    #[arg(long = "to", help = "Target format, e.g. docx")]
    pub(crate) target_format: String,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct MergeArgs {
    #[arg(required = true, num_args = 2.., help = "Paths of the PDFs to merge, in order")]
    pub(crate) files: Vec<PathBuf>,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

/// Split strategies accepted by the split endpoint.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum SplitMethodArg {
    Range,
    Extract,
    Every,
}

impl From<SplitMethodArg> for SplitMethod {
    fn from(arg: SplitMethodArg) -> Self {
        match arg {
            SplitMethodArg::Range => Self::Range,
            SplitMethodArg::Extract => Self::Extract,
            SplitMethodArg::Every => Self::Every,
        }
    }
}

#[derive(Args)]
pub(crate) struct SplitArgs {
    #[arg(help = "Path of the PDF to split")]
    pub(crate) file: PathBuf,
    #[arg(long, value_enum, default_value_t = SplitMethodArg::Range)]
    pub(crate) method: SplitMethodArg,
    #[arg(long, help = "Page ranges for --method range, e.g. 1-3,4,5-7")]
    pub(crate) ranges: Option<String>,
    #[arg(long = "every", help = "Pages per document for --method every")]
    pub(crate) every_n_pages: Option<u32>,
    #[arg(long, help = "Queue the job and print its id instead of waiting")]
    pub(crate) no_wait: bool,
    #[arg(long, help = "Directory to download the results into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ProtectArgs {
    #[arg(help = "Path of the PDF to protect")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Prompted for interactively when omitted")]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct UnlockArgs {
    #[arg(help = "Path of the PDF to unlock")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Prompted for interactively when omitted")]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

/// Rotation angles accepted by the rotate endpoint.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum AngleArg {
    #[value(name = "90")]
    Quarter,
    #[value(name = "180")]
    Half,
    #[value(name = "270")]
    ThreeQuarter,
}

impl From<AngleArg> for RotationAngle {
    fn from(arg: AngleArg) -> Self {
        match arg {
            AngleArg::Quarter => Self::Quarter,
            AngleArg::Half => Self::Half,
            AngleArg::ThreeQuarter => Self::ThreeQuarter,
        }
    }
}

#[derive(Args)]
pub(crate) struct RotateArgs {
    #[arg(help = "Path of the PDF to rotate")]
    pub(crate) file: PathBuf,
    #[arg(long, value_enum)]
    pub(crate) angle: AngleArg,
    #[arg(long, default_value = "all", help = "Page selection, e.g. all or 1,3-5")]
    pub(crate) pages: String,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

/// Watermark placements accepted by the watermark endpoint.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum PositionArg {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<PositionArg> for WatermarkPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Center => Self::Center,
            PositionArg::TopLeft => Self::TopLeft,
            PositionArg::TopRight => Self::TopRight,
            PositionArg::BottomLeft => Self::BottomLeft,
            PositionArg::BottomRight => Self::BottomRight,
        }
    }
}

/// Watermark page selections accepted by the watermark endpoint.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum PagesArg {
    All,
    First,
    Last,
    Odd,
    Even,
    Custom,
}

impl From<PagesArg> for WatermarkPages {
    fn from(arg: PagesArg) -> Self {
        match arg {
            PagesArg::All => Self::All,
            PagesArg::First => Self::First,
            PagesArg::Last => Self::Last,
            PagesArg::Odd => Self::Odd,
            PagesArg::Even => Self::Even,
            PagesArg::Custom => Self::Custom,
        }
    }
}

#[derive(Args)]
pub(crate) struct WatermarkArgs {
    #[arg(help = "Path of the PDF to watermark")]
    pub(crate) file: PathBuf,
    #[arg(long, conflicts_with = "image", help = "Text to stamp on the pages")]
    pub(crate) text: Option<String>,
    #[arg(long, help = "Path of an image to stamp on the pages")]
    pub(crate) image: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub(crate) position: Option<PositionArg>,
    #[arg(long, help = "Opacity percentage, 0-100")]
    pub(crate) opacity: Option<u8>,
    #[arg(long, help = "Rotation in degrees")]
    pub(crate) rotation: Option<i32>,
    #[arg(long, help = "Scale percentage")]
    pub(crate) scale: Option<u32>,
    #[arg(long, help = "Text color as a hex value, e.g. #ff0000")]
    pub(crate) color: Option<String>,
    #[arg(long, value_enum)]
    pub(crate) pages: Option<PagesArg>,
    #[arg(long, help = "Explicit page list for --pages custom")]
    pub(crate) custom_pages: Option<String>,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct PagenumberArgs {
    #[arg(help = "Path of the PDF to number")]
    pub(crate) file: PathBuf,
    #[arg(long, default_value = "bottom-center")]
    pub(crate) position: String,
    #[arg(long = "start", default_value_t = 1)]
    pub(crate) start_number: u32,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    #[arg(help = "Path of the PDF to trim")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Pages to remove, e.g. 2,4-6")]
    pub(crate) pages: String,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct SignArgs {
    #[arg(help = "Path of the PDF to sign")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Path of the signature image")]
    pub(crate) signature: PathBuf,
    #[arg(long, default_value_t = 0, help = "Horizontal offset in points")]
    pub(crate) x: i32,
    #[arg(long, default_value_t = 0, help = "Vertical offset in points")]
    pub(crate) y: i32,
    #[arg(long, default_value_t = 1, help = "One-based page number")]
    pub(crate) page: u32,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ExtractTextArgs {
    #[arg(help = "Path of the PDF to extract text from")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct SaveTextArgs {
    #[arg(long, help = "Edit session identifier from extract-text")]
    pub(crate) session: String,
    #[arg(long, help = "Path of a file holding the edited text")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct OcrArgs {
    #[arg(help = "Path of the scanned PDF")]
    pub(crate) file: PathBuf,
    #[arg(long, default_value = "eng", help = "OCR language code")]
    pub(crate) language: String,
    #[arg(long, help = "Directory to download the result into")]
    pub(crate) download: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct OcrExtractArgs {
    #[arg(help = "Path of the scanned PDF")]
    pub(crate) file: PathBuf,
}

#[derive(Subcommand)]
enum AccountCommand {
    Profile,
    Update(UpdateProfileArgs),
    Password,
    Balance,
    Deposit(DepositArgs),
    VerifyDeposit(VerifyDepositArgs),
}

#[derive(Args)]
pub(crate) struct UpdateProfileArgs {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
}

#[derive(Args)]
pub(crate) struct DepositArgs {
    #[arg(long)]
    pub(crate) amount: f64,
    #[arg(long, default_value = "USD")]
    pub(crate) currency: String,
}

#[derive(Args)]
pub(crate) struct VerifyDepositArgs {
    #[arg(long, help = "Transaction identifier from the deposit response")]
    pub(crate) transaction: String,
}

#[derive(Subcommand)]
enum KeysCommand {
    List,
    Create(KeyCreateArgs),
    Revoke(KeyRevokeArgs),
}

#[derive(Args)]
pub(crate) struct KeyCreateArgs {
    #[arg(long, help = "Label for the new key")]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct KeyRevokeArgs {
    #[arg(help = "Key identifier")]
    pub(crate) id: String,
}

#[derive(Subcommand)]
enum PricingCommand {
    Info,
    Operation(PricingOperationArgs),
    Calc(PricingCalcArgs),
}

#[derive(Args)]
pub(crate) struct PricingOperationArgs {
    #[arg(help = "Operation name, e.g. compress")]
    pub(crate) operation: String,
}

#[derive(Args)]
pub(crate) struct PricingCalcArgs {
    #[arg(
        long = "op",
        required = true,
        value_parser = parse_price_query,
        help = "Operation and count as name=count; repeatable"
    )]
    pub(crate) operations: Vec<(String, u32)>,
}

fn parse_price_query(raw: &str) -> Result<(String, u32), String> {
    let (name, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=count, got '{raw}'"))?;
    let count: u32 = count
        .parse()
        .map_err(|err| format!("invalid count in '{raw}': {err}"))?;
    if name.is_empty() {
        return Err(format!("missing operation name in '{raw}'"));
    }
    Ok((name.to_owned(), count))
}

#[derive(Subcommand)]
enum UsageCommand {
    Stats,
    Track(UsageTrackArgs),
}

#[derive(Args)]
pub(crate) struct UsageTrackArgs {
    #[arg(long)]
    pub(crate) operation: String,
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub(crate) success: bool,
    #[arg(long, default_value_t = 0)]
    pub(crate) file_size: u64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) processing_time: f64,
}
