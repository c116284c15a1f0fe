//! Operator CLI for the Autamedica backend.
//!
//! Reads `SUPABASE_URL` / `SUPABASE_ANON_KEY` (and an optional `.env`),
//! optionally signs in, runs one command, and prints the result as
//! pretty JSON.


use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use backend::realtime::ChangeStream;
use backend::{BackendError, SignUpOutcome, Supabase};
use model::{AppointmentKind, AppointmentStatus, AppointmentUpdate, NewAppointment, Role, SignUpProfile, UserUpdate};
use session::{SessionError, SessionState, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("not signed in; pass --email and --password or set AUTAMEDICA_EMAIL and AUTAMEDICA_PASSWORD")]
    NotSignedIn,
    #[error("signed-in {0} has no profile row")]
    MissingProfile(Role),
    #[error("{0} accounts have no appointments")]
    NoAppointments(Role),
    #[error("session did not settle: {0}")]
    SessionClosed(String),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("signal handler failed: {0}")]
    Signal(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "autamedica", about = "Autamedica session and data CLI")]
struct Cli {
    /// Sign in with this account before running the command.
    #[arg(long, env = "AUTAMEDICA_EMAIL", requires = "password")]
    email: Option<String>,

    #[arg(long, env = "AUTAMEDICA_PASSWORD", requires = "email", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve and print the current session.
    Whoami,
    /// Email a sign-in link.
    MagicLink { email: String },
    /// Create an account.
    SignUp(SignUpArgs),
    Profile(ProfileCommand),
    Doctors(DoctorsCommand),
    Users(UsersCommand),
    Appointments(AppointmentsCommand),
    /// Stream row changes until interrupted.
    Watch(WatchCommand),
}

#[derive(Args, Debug)]
struct SignUpArgs {
    email: String,
    #[arg(long, env = "AUTAMEDICA_NEW_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    role: Option<Role>,
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
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[derive(Args, Debug)]
struct DoctorsCommand {
    #[command(subcommand)]
    command: DoctorsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DoctorsSubcommand {
    /// Verified doctors currently accepting appointments.
    Available,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    ByRole { role: Role },
}

#[derive(Args, Debug)]
struct AppointmentsCommand {
    #[command(subcommand)]
    command: AppointmentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppointmentsSubcommand {
    /// Appointments of the signed-in patient or doctor.
    Mine,
    /// Next scheduled appointments visible to the caller.
    Upcoming,
    Create {
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        doctor_id: String,
        /// RFC 3339 timestamp, e.g. 2026-11-02T15:30:00Z.
        #[arg(long, value_parser = parse_timestamp)]
        at: OffsetDateTime,
        #[arg(long, default_value = "consultation")]
        kind: AppointmentKind,
        #[arg(long)]
        notes: Option<String>,
    },
    Update {
        appointment_id: String,
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<OffsetDateTime>,
        #[arg(long)]
        status: Option<AppointmentStatus>,
        #[arg(long)]
        kind: Option<AppointmentKind>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args, Debug)]
struct WatchCommand {
    #[command(subcommand)]
    command: WatchSubcommand,
}

#[derive(Subcommand, Debug)]
enum WatchSubcommand {
    Appointments,
    /// Changes to the signed-in user's own row.
    Profile,
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

struct CliContext {
    backend: Arc<Supabase>,
    store: SessionStore,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let backend = Arc::new(Supabase::from_env()?);
    let store = SessionStore::new(backend.clone());
    let ctx = CliContext { backend, store };

    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        ctx.store.sign_in(email, Some(password.as_str())).await?;
    }

    match cli.command {
        Command::Whoami => run_whoami(&ctx).await,
        Command::MagicLink { email } => {
            ctx.store.send_magic_link(&email).await?;
            print_json(&json!({ "sent_to": email }))
        }
        Command::SignUp(args) => run_sign_up(&ctx, args).await,
        Command::Profile(profile) => run_profile(&ctx, profile).await,
        Command::Doctors(doctors) => match doctors.command {
            DoctorsSubcommand::Available => print_json(&ctx.backend.doctors().available().await?),
        },
        Command::Users(users) => match users.command {
            UsersSubcommand::ByRole { role } => print_json(&ctx.backend.users().by_role(role).await?),
        },
        Command::Appointments(appointments) => run_appointments(&ctx, appointments).await,
        Command::Watch(watch) => run_watch(&ctx, watch).await,
    }
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let _subscription = ctx.store.mount();
    let mut changes = ctx.store.watch();
    let state = changes
        .wait_for(|state| !state.loading)
        .await
        .map_err(|e| CliError::SessionClosed(e.to_string()))?
        .clone();
    print_json(&session_json(&state))
}

fn session_json(state: &SessionState) -> serde_json::Value {
    json!({
        "user": state.user,
        "patient": state.patient,
        "doctor": state.doctor,
        "company": state.company,
        "loading": state.loading,
        "error": state.error,
    })
}

async fn run_sign_up(ctx: &CliContext, args: SignUpArgs) -> Result<(), CliError> {
    let profile = SignUpProfile { name: args.name, role: args.role };
    let outcome = ctx.backend.auth().sign_up(&args.email, &args.password, &profile).await?;
    let body = match outcome {
        SignUpOutcome::Session(session) => json!({ "user_id": session.user.id, "confirmed": true }),
        SignUpOutcome::ConfirmationRequired(identity) => json!({ "user_id": identity.id, "confirmed": false }),
    };
    print_json(&body)
}

async fn run_profile(ctx: &CliContext, profile: ProfileCommand) -> Result<(), CliError> {
    match profile.command {
        ProfileSubcommand::Update { name, phone, avatar_url } => {
            require_user(&ctx.store)?;
            ctx.store.update_profile(&UserUpdate { name, phone, avatar_url }).await?;
            print_json(&ctx.store.snapshot().user)
        }
    }
}

async fn run_appointments(ctx: &CliContext, appointments: AppointmentsCommand) -> Result<(), CliError> {
    match appointments.command {
        AppointmentsSubcommand::Mine => {
            let state = ctx.store.snapshot();
            let role = require_user(&ctx.store)?;
            let list = match role {
                Role::Patient => {
                    let patient = state.patient.ok_or(CliError::MissingProfile(role))?;
                    ctx.backend.patients().appointments(&patient.id).await?
                }
                Role::Doctor => {
                    let doctor = state.doctor.ok_or(CliError::MissingProfile(role))?;
                    ctx.backend.doctors().appointments(&doctor.id).await?
                }
                Role::CompanyAdmin | Role::PlatformAdmin => return Err(CliError::NoAppointments(role)),
            };
            print_json(&list)
        }
        AppointmentsSubcommand::Upcoming => print_json(&ctx.backend.appointments().upcoming().await?),
        AppointmentsSubcommand::Create { patient_id, doctor_id, at, kind, notes } => {
            let appointment = NewAppointment {
                patient_id,
                doctor_id,
                scheduled_at: at,
                status: AppointmentStatus::default(),
                kind,
                notes,
            };
            print_json(&ctx.backend.appointments().create(&appointment).await?)
        }
        AppointmentsSubcommand::Update { appointment_id, at, status, kind, notes } => {
            let updates = AppointmentUpdate { scheduled_at: at, status, kind, notes };
            print_json(&ctx.backend.appointments().update(&appointment_id, &updates).await?)
        }
    }
}

async fn run_watch(ctx: &CliContext, watch: WatchCommand) -> Result<(), CliError> {
    let realtime = ctx.backend.realtime();
    let stream = match watch.command {
        WatchSubcommand::Appointments => realtime.appointments().await?,
        WatchSubcommand::Profile => {
            require_user(&ctx.store)?;
            let user_id = ctx.store.snapshot().user.map(|u| u.id).ok_or(CliError::NotSignedIn)?;
            realtime.user_profile(&user_id).await?
        }
    };
    stream_changes(stream).await
}

async fn stream_changes(mut stream: ChangeStream) -> Result<(), CliError> {
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            change = stream.recv() => match change {
                Some(change) => print_json(&change)?,
                None => return Err(BackendError::Realtime("change feed closed".to_owned()).into()),
            },
        }
    }
    tracing::info!("interrupted; closing change feed");
    stream.unsubscribe();
    Ok(())
}

fn require_user(store: &SessionStore) -> Result<Role, CliError> {
    store.snapshot().role().ok_or(CliError::NotSignedIn)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
