use anyhow::{anyhow, Context, Error};
use clea_admin::{
    endpoints::{self, resources, resources::Resource, Registration},
    validation, AuthError, Config, FileStore, HttpTransport, SessionManager,
    SessionState,
};
use serde_json::Value;
use std::path::PathBuf;
use structopt::StructOpt;

type Session = SessionManager<HttpTransport, FileStore>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    let config = args.config();
    log::debug!("Starting application with {:#?}", config);

    let transport = HttpTransport::new(&config)?;
    let store = FileStore::new(&config.store_path);
    let session = SessionManager::new(transport, store);

    // make sure any previously saved session is still valid before doing
    // anything else
    let state = session.bootstrap().await;
    log::debug!("Session state: {:?}", state);

    run(&session, args.cmd).await
}

async fn run(session: &Session, cmd: Command) -> Result<(), Error> {
    match cmd {
        Command::Whoami => match session.current_user() {
            Some(user) => println!(
                "{} {} <{}> ({})",
                user.first_name,
                user.last_name,
                user.email,
                user.role.as_deref().unwrap_or("no role"),
            ),
            None => println!("Not logged in"),
        },
        Command::Login { email, password } => {
            let logged_in =
                session.login(&email, &password).await.map_err(explain)?;
            print_message(logged_in.message.as_deref());
            println!("Logged in as {}", logged_in.user.email);
        },
        Command::Register {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            let registration = Registration {
                first_name,
                last_name,
                email,
                password,
            };
            validation::validate_registration(&registration, &confirm_password)?;

            let registered =
                session.register(&registration).await.map_err(explain)?;
            print_message(registered.message.as_deref());
            if registered.requires_verification {
                println!(
                    "Check {} for a verification link",
                    registered.email.as_deref().unwrap_or(&registration.email)
                );
            }
        },
        Command::Logout => {
            session.logout();
            println!("Logged out");
        },
        Command::Refresh => match session.refresh_profile().await {
            Some(result) => {
                let user = result.map_err(explain)?;
                println!("Refreshed the profile for {}", user.email);
            },
            None => return Err(anyhow!("Not logged in")),
        },
        Command::ResendVerification { email } => {
            let message =
                endpoints::resend_verification(session.transport(), &email)
                    .await
                    .map_err(explain)?;
            print_message(message.as_deref());
        },
        Command::ForgotPassword { email } => {
            let message = endpoints::forgot_password(session.transport(), &email)
                .await
                .map_err(explain)?;
            print_message(message.as_deref());
        },
        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            validation::validate_new_password(&password, &confirm_password)?;
            let message =
                endpoints::reset_password(session.transport(), &token, &password)
                    .await
                    .map_err(explain)?;
            print_message(message.as_deref());
        },
        Command::VerifyEmail { token } => {
            let verified = endpoints::verify_email(session.transport(), &token)
                .await
                .map_err(explain)?;
            print_message(verified.message.as_deref());

            if let Some(credentials) = verified.credentials {
                session.adopt_credentials(credentials);
                println!("Logged in");
            }
        },
        Command::Resource(cmd) => resource(session, cmd).await?,
    }

    Ok(())
}

async fn resource(session: &Session, cmd: ResourceCommand) -> Result<(), Error> {
    let transport = session.transport();
    let token = session.current_token();
    let token = token.as_deref();

    match cmd {
        ResourceCommand::List { resource } => {
            let items = resources::list(transport, resource, token).await?;
            print_json(&Value::Array(items))?;
        },
        ResourceCommand::Get { resource, id } => {
            let item = resources::get(transport, resource, &id, token).await?;
            print_json(&item)?;
        },
        ResourceCommand::Create { resource, payload } => {
            require_login(session)?;
            let payload = parse_payload(&payload)?;
            let item =
                resources::create(transport, resource, &payload, token).await?;
            print_json(&item)?;
        },
        ResourceCommand::Update {
            resource,
            id,
            payload,
        } => {
            require_login(session)?;
            let payload = parse_payload(&payload)?;
            let item =
                resources::update(transport, resource, &id, &payload, token)
                    .await?;
            print_json(&item)?;
        },
        ResourceCommand::Delete { resource, id } => {
            require_login(session)?;
            resources::delete(transport, resource, &id, token).await?;
            println!("Deleted {} from {}", id, resource);
        },
        ResourceCommand::Tags => {
            for tag in resources::ingredient_tags(transport, token).await? {
                println!("{}", tag);
            }
        },
    }

    Ok(())
}

fn require_login(session: &Session) -> Result<(), Error> {
    match session.state() {
        SessionState::Authenticated => Ok(()),
        _ => Err(anyhow!("You need to log in first")),
    }
}

/// Turn an [`AuthError`] into something worth showing the user.
fn explain(error: AuthError) -> Error {
    match error.verification_required() {
        Some(v) => anyhow!(
            "{} (run `clea resend-verification --email {}` to get a new link)",
            v.message,
            v.email
        ),
        None => anyhow!("{}", error.message()),
    }
}

fn print_message(message: Option<&str>) {
    if let Some(message) = message {
        println!("{}", message);
    }
}

fn parse_payload(raw: &str) -> Result<Value, Error> {
    serde_json::from_str(raw).context("The payload isn't valid JSON")
}

fn print_json(value: &Value) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Manage the Clea dashboard from the command line")]
struct Args {
    #[structopt(
        long = "api-url",
        env = "CLEA_API_URL",
        help = "The Clea server's base URL"
    )]
    api_url: Option<String>,
    #[structopt(
        long = "store",
        env = "CLEA_STORE",
        parse(from_os_str),
        help = "Where to remember the logged in user"
    )]
    store: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();

        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(store) = &self.store {
            config = config.with_store_path(store.clone());
        }

        config
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(about = "Show the logged in user")]
    Whoami,
    #[structopt(about = "Log in with your email and password")]
    Login {
        #[structopt(short = "e", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    #[structopt(about = "Create a new account")]
    Register {
        #[structopt(long = "first-name")]
        first_name: String,
        #[structopt(long = "last-name")]
        last_name: String,
        #[structopt(short = "e", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
        #[structopt(long = "confirm-password")]
        confirm_password: String,
    },
    Logout,
    #[structopt(about = "Fetch the latest profile from the server")]
    Refresh,
    ResendVerification {
        #[structopt(short = "e", long = "email")]
        email: String,
    },
    #[structopt(about = "Email yourself a password reset link")]
    ForgotPassword {
        #[structopt(short = "e", long = "email")]
        email: String,
    },
    ResetPassword {
        #[structopt(short = "t", long = "token")]
        token: String,
        #[structopt(short = "p", long = "password")]
        password: String,
        #[structopt(long = "confirm-password")]
        confirm_password: String,
    },
    #[structopt(about = "Confirm your email address using the emailed token")]
    VerifyEmail { token: String },
    #[structopt(name = "resource", about = "Work with the dashboard's records")]
    Resource(ResourceCommand),
}

#[derive(Debug, StructOpt)]
enum ResourceCommand {
    #[structopt(about = "List articles, products, ingredients, or tag-conflicts")]
    List { resource: Resource },
    Get { resource: Resource, id: String },
    #[structopt(about = "Create an entry from a JSON payload")]
    Create { resource: Resource, payload: String },
    Update {
        resource: Resource,
        id: String,
        payload: String,
    },
    Delete { resource: Resource, id: String },
    #[structopt(about = "List every ingredient tag")]
    Tags,
}
