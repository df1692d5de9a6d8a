use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use cbx_life::net::api;
use cbx_life::net::types::{CareerProfileUpdate, QuestionKind, Registration};
use cbx_life::pages::accounting::{AccountingPage, ExpenseForm};
use cbx_life::pages::career::{ApplicationForm, CareerPage, parse_skills};
use cbx_life::pages::portal::PortalPage;
use cbx_life::pages::profile::ProfileForm;
use cbx_life::pages::supply::{SupplyForm, SupplyPage};
use cbx_life::pages::survey::{SurveyDraft, SurveyResponder, SurveysPage};
use cbx_life::state::resource::Resource;
use cbx_life::state::route::Route;
use cbx_life::util::storage::TOKEN_KEY;
use cbx_life::{
    ApiClient, ApiError, ClientConfig, FileTokenStore, FormError, PageError, SessionError, SessionStore, TokenStore,
    generate_uuid,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no config directory found; pass --token-file or set CBX_TOKEN_FILE")]
    NoConfigDir,
    #[error("not logged in; run `cbx login` first")]
    NotLoggedIn,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    Request(String),
    #[error("no {0} with id {1}")]
    NotFound(&'static str, i64),
    #[error("invalid question `{0}`; expected kind:label")]
    InvalidQuestion(String),
    #[error("invalid answer `{0}`; expected question_id=value")]
    InvalidAnswer(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PageError> for CliError {
    fn from(error: PageError) -> Self {
        match error {
            PageError::Form(error) => Self::Form(error),
            PageError::Api(error) => Self::Api(error),
        }
    }
}

impl From<Route> for CliError {
    fn from(_: Route) -> Self {
        Self::NotLoggedIn
    }
}

#[derive(Parser, Debug)]
#[command(name = "cbx", about = "cbx.life command-line client")]
struct Cli {
    #[arg(long, env = "CBX_API_URL", default_value = cbx_life::config::DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "CBX_TOKEN_FILE", help = "Where the session token is kept")]
    token_file: Option<PathBuf>,

    #[arg(long, short, help = "Log requests to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Health,
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CBX_PASSWORD")]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: Option<String>,
    },
    Login {
        #[arg(help = "Email or phone")]
        username: String,
        #[arg(long, env = "CBX_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    Profile(ProfileCommand),
    Portal,
    Accounting(AccountingCommand),
    Career(CareerCommand),
    Supply(SupplyCommand),
    Survey(SurveyCommand),
    Uuid {
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long, help = "Empty string removes the phone")]
        phone: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AccountingCommand {
    #[command(subcommand)]
    command: AccountingSubcommand,
}

#[derive(Args, Debug)]
struct ExpenseArgs {
    #[arg(long, help = "Amount in dollars")]
    amount: String,
    #[arg(long)]
    description: String,
    #[arg(long, help = "YYYY-MM-DD")]
    date: String,
    #[arg(long)]
    category: i64,
    #[arg(long, default_value_t = false)]
    income: bool,
}

impl ExpenseArgs {
    fn into_form(self) -> ExpenseForm {
        ExpenseForm {
            amount: self.amount,
            description: self.description,
            date: self.date,
            is_income: self.income,
            category_id: Some(self.category),
        }
    }
}

#[derive(Subcommand, Debug)]
enum AccountingSubcommand {
    Categories,
    List,
    Summary,
    Add(ExpenseArgs),
    Update {
        expense_id: i64,
        #[command(flatten)]
        expense: ExpenseArgs,
    },
    Delete {
        expense_id: i64,
    },
}

#[derive(Args, Debug)]
struct CareerCommand {
    #[command(subcommand)]
    command: CareerSubcommand,
}

#[derive(Subcommand, Debug)]
enum CareerSubcommand {
    List,
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        #[arg(long, default_value = "Applied")]
        status: String,
        #[arg(long, default_value = "")]
        salary_range: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Status {
        application_id: i64,
        status: String,
    },
    Profile,
    ProfileSet {
        #[arg(long)]
        headline: Option<String>,
        #[arg(long, help = "Comma-separated; replaces the current list")]
        skills: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SupplyCommand {
    #[command(subcommand)]
    command: SupplySubcommand,
}

#[derive(Subcommand, Debug)]
enum SupplySubcommand {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
    },
    Toggle {
        item_id: i64,
    },
    Status {
        item_id: i64,
        status: String,
    },
    Delete {
        item_id: i64,
    },
}

#[derive(Args, Debug)]
struct SurveyCommand {
    #[command(subcommand)]
    command: SurveySubcommand,
}

#[derive(Subcommand, Debug)]
enum SurveySubcommand {
    List,
    Show {
        survey_id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "question", help = "kind:label[*][|option...]; kind is text, long_text, multiple_choice, checkbox or rating; * marks required")]
        questions: Vec<String>,
    },
    Respond {
        survey_id: i64,
        #[arg(long = "answer", help = "question_id=value; value parsed as JSON when possible")]
        answers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
    if let Err(error) = dotenv {
        tracing::debug!(%error, "no .env loaded");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Uuid { count } = cli.command {
        for _ in 0..count {
            println!("{}", generate_uuid());
        }
        return Ok(());
    }

    let token_file = match cli.token_file {
        Some(path) => path,
        None => default_token_file()?,
    };
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(token_file));
    let api = ApiClient::new(&ClientConfig::new(&cli.api_url), tokens);
    let session = SessionStore::new(api);
    session.restore().await;

    let result = dispatch(&session, cli.command).await;
    if let Err(CliError::Api(error)) = &result {
        if session.handle_error(error) {
            tracing::warn!("stored token rejected; log in again");
        }
    }
    result
}

fn default_token_file() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("cbx").join(TOKEN_KEY))
        .ok_or(CliError::NoConfigDir)
}

async fn dispatch(session: &SessionStore, command: Command) -> Result<(), CliError> {
    let api = session.api();
    match command {
        Command::Health => print_json(&api::health(api).await?),
        Command::Register {
            email,
            password,
            full_name,
            phone,
        } => {
            let registration = Registration {
                email,
                password,
                full_name,
                phone: phone.filter(|p| !p.trim().is_empty()),
            };
            print_json(&api::register(api, &registration).await?)
        }
        Command::Login { username, password } => {
            let identity = session.sign_in(&username, &password).await?;
            print_json(&identity)
        }
        Command::Logout => {
            let next = session.logout()?;
            print_json(&json!({ "logged_out": true, "next": next.path() }))
        }
        Command::Whoami => print_json(&session.identity().ok_or(CliError::NotLoggedIn)?),
        Command::Profile(profile) => run_profile(session, profile).await,
        Command::Portal => {
            let mut page = PortalPage::default();
            page.load(session).await?;
            print_resource(&page.stats)
        }
        Command::Accounting(accounting) => run_accounting(session, accounting).await,
        Command::Career(career) => run_career(session, career).await,
        Command::Supply(supply) => run_supply(session, supply).await,
        Command::Survey(survey) => run_survey(session, survey).await,
        Command::Uuid { .. } => Ok(()),
    }
}

async fn run_profile(session: &SessionStore, profile: ProfileCommand) -> Result<(), CliError> {
    match profile.command {
        ProfileSubcommand::Update { full_name, phone } => {
            let current = session.identity().ok_or(CliError::NotLoggedIn)?;
            let mut form = ProfileForm::from_identity(&current);
            if let Some(full_name) = full_name {
                form.full_name = full_name;
            }
            if let Some(phone) = phone {
                form.phone = phone;
            }
            print_json(&form.save(session).await?)
        }
    }
}

async fn run_accounting(session: &SessionStore, accounting: AccountingCommand) -> Result<(), CliError> {
    let api = session.api();
    let mut page = AccountingPage::default();
    page.load(session).await?;
    match accounting.command {
        AccountingSubcommand::Categories => print_resource(&page.categories),
        AccountingSubcommand::List => print_resource(&page.expenses),
        AccountingSubcommand::Summary => print_resource(&page.summary),
        AccountingSubcommand::Add(expense) => {
            let created = page.add(api, &expense.into_form()).await?;
            print_json(&created)
        }
        AccountingSubcommand::Update { expense_id, expense } => {
            if page.find(expense_id).is_none() {
                return Err(CliError::NotFound("expense", expense_id));
            }
            let updated = page.update(api, expense_id, &expense.into_form()).await?;
            print_json(&updated)
        }
        AccountingSubcommand::Delete { expense_id } => {
            page.delete(api, expense_id).await?;
            print_resource(&page.summary)
        }
    }
}

async fn run_career(session: &SessionStore, career: CareerCommand) -> Result<(), CliError> {
    let api = session.api();
    let mut page = CareerPage::default();
    page.load(session).await?;
    match career.command {
        CareerSubcommand::List => print_resource(&page.applications),
        CareerSubcommand::Add {
            company,
            position,
            status,
            salary_range,
            notes,
        } => {
            let form = ApplicationForm {
                company,
                position,
                status,
                salary_range,
                notes,
            };
            print_json(&page.add(api, &form).await?)
        }
        CareerSubcommand::Status { application_id, status } => {
            page.set_status(api, application_id, &status).await?;
            print_resource(&page.applications)
        }
        CareerSubcommand::Profile => print_resource(&page.profile),
        CareerSubcommand::ProfileSet { headline, skills } => {
            let mut update = page.profile.data().map(CareerProfileUpdate::from).unwrap_or_default();
            if let Some(headline) = headline {
                update.headline = Some(headline).filter(|h| !h.trim().is_empty());
            }
            if let Some(skills) = skills {
                update.skills = parse_skills(&skills);
            }
            page.save_profile(api, &update).await?;
            print_resource(&page.profile)
        }
    }
}

async fn run_supply(session: &SessionStore, supply: SupplyCommand) -> Result<(), CliError> {
    let api = session.api();
    let mut page = SupplyPage::default();
    page.load(session).await?;
    match supply.command {
        SupplySubcommand::List => print_json(&json!({
            "to_buy": page.to_buy(),
            "in_stock": page.in_stock(),
        })),
        SupplySubcommand::Add {
            name,
            category,
            quantity,
        } => {
            let form = SupplyForm {
                name,
                category,
                quantity,
                ..SupplyForm::default()
            };
            print_json(&page.add(api, &form).await?)
        }
        SupplySubcommand::Toggle { item_id } => {
            if page.find(item_id).is_none() {
                return Err(CliError::NotFound("item", item_id));
            }
            page.toggle(api, item_id).await?;
            print_json(&page.find(item_id))
        }
        SupplySubcommand::Status { item_id, status } => {
            page.set_status(api, item_id, &status).await?;
            print_json(&page.find(item_id))
        }
        SupplySubcommand::Delete { item_id } => {
            page.delete(api, item_id).await?;
            print_resource(&page.items)
        }
    }
}

async fn run_survey(session: &SessionStore, survey: SurveyCommand) -> Result<(), CliError> {
    let api = session.api();
    match survey.command {
        SurveySubcommand::List => {
            let mut page = SurveysPage::default();
            page.load(session).await?;
            print_resource(&page.surveys)
        }
        SurveySubcommand::Show { survey_id } => {
            let mut responder = SurveyResponder::default();
            responder.load(api, survey_id).await;
            print_resource(&responder.survey)
        }
        SurveySubcommand::Create {
            title,
            description,
            questions,
        } => {
            let mut draft = SurveyDraft {
                title,
                description,
                questions: Vec::new(),
            };
            for question in &questions {
                add_question(&mut draft, question)?;
            }
            let mut page = SurveysPage::default();
            page.load(session).await?;
            print_json(&page.publish(api, &draft).await?)
        }
        SurveySubcommand::Respond { survey_id, answers } => {
            let mut responder = SurveyResponder::default();
            responder.load(api, survey_id).await;
            if let Some(error) = responder.survey.error() {
                return Err(CliError::Request(error.to_owned()));
            }
            for answer in &answers {
                let (question_id, value) = parse_answer(answer)?;
                responder.set_answer(question_id, value);
            }
            print_json(&responder.submit(api).await?)
        }
    }
}

/// `kind:label`, with a trailing `*` on the label marking it required.
/// Choice questions take further options as `kind:label|opt|opt`.
fn add_question(draft: &mut SurveyDraft, raw: &str) -> Result<(), CliError> {
    let invalid = || CliError::InvalidQuestion(raw.to_owned());
    let (kind, rest) = raw.split_once(':').ok_or_else(invalid)?;
    let kind: QuestionKind = serde_json::from_value(Value::String(kind.trim().to_owned())).map_err(|_| invalid())?;
    let mut parts = rest.split('|');
    let label = parts.next().unwrap_or_default().trim();
    let (label, required) = match label.strip_suffix('*') {
        Some(label) => (label.trim(), true),
        None => (label, false),
    };
    if label.is_empty() {
        return Err(invalid());
    }
    let options: Vec<String> = parts.map(|o| o.trim().to_owned()).filter(|o| !o.is_empty()).collect();

    let id = draft.add_question(kind);
    draft.update_question(&id, |question| {
        label.clone_into(&mut question.label);
        question.required = required;
        if !options.is_empty() {
            question.options = Some(options);
        }
    });
    Ok(())
}

fn parse_answer(raw: &str) -> Result<(&str, Value), CliError> {
    let (question_id, value) = raw
        .split_once('=')
        .filter(|(id, _)| !id.trim().is_empty())
        .ok_or_else(|| CliError::InvalidAnswer(raw.to_owned()))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((question_id.trim(), value))
}

fn print_resource<T: Serialize>(resource: &Resource<T>) -> Result<(), CliError> {
    match (resource.data(), resource.error()) {
        (_, Some(error)) => Err(CliError::Request(error.to_owned())),
        (Some(data), None) => print_json(data),
        (None, None) => print_json(&Value::Null),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
