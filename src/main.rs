use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use job_platform_client::{
    config::{get_config, init_config},
    dto::{
        auth_dto::RegisterPayload,
        job_dto::{FilterField, JobFormField},
        profile_dto::ProfileField,
    },
    models::{ApplicationStatus, Role},
    views::{
        candidate::profile_completeness, ActionOutcome, CandidateDashboard, HrDashboard,
        LoginView, Navigation, Notifier, RegisterView, Route, Severity,
    },
    AppState,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "job-platform")]
#[command(about = "Browse and apply to jobs, or post jobs and review applications")]
struct Cli {
    #[command(subcommand)]
    role: RoleCommand,
}

#[derive(Subcommand)]
enum RoleCommand {
    /// Act as a candidate
    Candidate {
        #[command(subcommand)]
        command: CandidateCommand,
    },
    /// Act as an HR user
    Hr {
        #[command(subcommand)]
        command: HrCommand,
    },
}

#[derive(Args)]
struct Credentials {
    #[arg(short, long)]
    email: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Args)]
struct Registration {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long)]
    password: String,
    /// Sign in straight after registering
    #[arg(long)]
    login: bool,
}

#[derive(Subcommand)]
enum CandidateCommand {
    /// Sign in and store the session
    Login(Credentials),
    /// Create a candidate account
    Register {
        #[command(flatten)]
        account: Registration,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        resume: Option<String>,
    },
    /// Forget the stored candidate session
    Logout,
    /// List jobs with your application status
    Jobs {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        company: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Apply to a job
    Apply {
        /// Job ID
        job_id: i64,
    },
    /// Show the profile, or update it when any field is given
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        resume: Option<String>,
    },
}

#[derive(Subcommand)]
enum HrCommand {
    /// Sign in and store the session
    Login(Credentials),
    /// Create an HR account
    Register(Registration),
    /// Forget the stored HR session
    Logout,
    /// List the jobs you posted
    Jobs,
    /// Post a new job
    Post {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        company: String,
        #[arg(short, long)]
        location: String,
        #[arg(short, long)]
        description: String,
    },
    /// List applications for one of your jobs
    Applications {
        /// Job ID
        job_id: i64,
    },
    /// Move an application to a new status
    SetStatus {
        /// Job ID the application belongs to
        job_id: i64,
        /// Application ID
        application_id: i64,
        /// PENDING, REVIEWED, ACCEPTED or REJECTED
        status: ApplicationStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    init_config()?;
    let config = get_config();
    info!(base_url = %config.api_base_url, "Using backend");

    let state = AppState::from_config(config.clone())?;

    match cli.role {
        RoleCommand::Candidate { command } => run_candidate(&state, command).await,
        RoleCommand::Hr { command } => run_hr(&state, command).await,
    }
}

async fn run_candidate(state: &AppState, command: CandidateCommand) -> Result<()> {
    let navigation = Navigation::new(Route::Home(Role::Candidate));
    match command {
        CandidateCommand::Login(creds) => login(state, Role::Candidate, creds).await,
        CandidateCommand::Register {
            account,
            phone,
            resume,
        } => register(state, Role::Candidate, account, phone, resume).await,
        CandidateCommand::Logout => {
            let dashboard = CandidateDashboard::new(state, navigation);
            let route = dashboard.logout();
            report(dashboard.notifier())?;
            println!("Signed out. Next: {}", route);
            Ok(())
        }
        CandidateCommand::Jobs {
            title,
            company,
            location,
        } => {
            let dashboard = CandidateDashboard::new(state, navigation);
            for (field, value) in [
                (FilterField::Title, title),
                (FilterField::Company, company),
                (FilterField::Location, location),
            ] {
                if let Some(value) = value {
                    dashboard.set_filter(field, value);
                }
            }
            finish(dashboard.apply_filters().await, dashboard.notifier())?;

            let summary = dashboard.summary();
            println!(
                "{} jobs available, {} applications submitted, profile {}% complete",
                summary.jobs_available, summary.applications_submitted, summary.profile_completeness
            );
            for card in dashboard.job_cards() {
                println!(
                    "#{:<5} {} @ {} ({})  [{}]",
                    card.job.id,
                    card.job.title,
                    card.job.company,
                    card.job.location,
                    card.action.label()
                );
            }
            Ok(())
        }
        CandidateCommand::Apply { job_id } => {
            let dashboard = CandidateDashboard::new(state, navigation);
            finish(dashboard.apply(job_id).await, dashboard.notifier())?;
            let status = dashboard
                .job_cards()
                .into_iter()
                .find(|card| card.job.id == job_id)
                .and_then(|card| card.status);
            match status {
                Some(status) => println!("Applied to job {} ({})", job_id, status),
                None => println!("Applied to job {}", job_id),
            }
            Ok(())
        }
        CandidateCommand::Profile {
            name,
            email,
            phone,
            resume,
        } => {
            let dashboard = CandidateDashboard::new(state, navigation);
            finish(dashboard.load().await, dashboard.notifier())?;

            let edits = [
                (ProfileField::Name, name),
                (ProfileField::Email, email),
                (ProfileField::Phone, phone),
                (ProfileField::Resume, resume),
            ];
            if edits.iter().any(|(_, v)| v.is_some()) {
                dashboard.open_profile_editor();
                for (field, value) in edits {
                    if let Some(value) = value {
                        dashboard.edit_profile(field, value);
                    }
                }
                finish(dashboard.save_profile().await, dashboard.notifier())?;
            }

            let view = dashboard.view();
            let profile = view
                .profile
                .as_ref()
                .ok_or_else(|| anyhow!("profile was not returned"))?;
            println!("Name:    {}", profile.name);
            println!("Email:   {}", profile.email);
            println!("Phone:   {}", profile.phone.as_deref().unwrap_or("-"));
            println!("Resume:  {}", profile.resume.as_deref().unwrap_or("-"));
            println!("Profile {}% complete", profile_completeness(Some(profile)));
            Ok(())
        }
    }
}

async fn run_hr(state: &AppState, command: HrCommand) -> Result<()> {
    let navigation = Navigation::new(Route::Home(Role::Hr));
    match command {
        HrCommand::Login(creds) => login(state, Role::Hr, creds).await,
        HrCommand::Register(account) => register(state, Role::Hr, account, None, None).await,
        HrCommand::Logout => {
            let dashboard = HrDashboard::new(state, navigation);
            let route = dashboard.logout();
            report(dashboard.notifier())?;
            println!("Signed out. Next: {}", route);
            Ok(())
        }
        HrCommand::Jobs => {
            let dashboard = HrDashboard::new(state, navigation);
            finish(dashboard.load().await, dashboard.notifier())?;
            let view = dashboard.view();
            if let Some(profile) = &view.profile {
                println!("Welcome, {}", profile.name);
            }
            for job in view.jobs {
                println!("#{:<5} {} @ {} ({})", job.id, job.title, job.company, job.location);
            }
            Ok(())
        }
        HrCommand::Post {
            title,
            company,
            location,
            description,
        } => {
            let dashboard = HrDashboard::new(state, navigation);
            finish(dashboard.load().await, dashboard.notifier())?;
            dashboard.set_form_field(JobFormField::Title, title);
            dashboard.set_form_field(JobFormField::Company, company);
            dashboard.set_form_field(JobFormField::Location, location);
            dashboard.set_form_field(JobFormField::Description, description);
            finish(dashboard.add_job().await, dashboard.notifier())?;
            println!("{} jobs posted", dashboard.view().jobs.len());
            Ok(())
        }
        HrCommand::Applications { job_id } => {
            let dashboard = open_job(state, navigation, job_id).await?;
            print_applications(&dashboard);
            Ok(())
        }
        HrCommand::SetStatus {
            job_id,
            application_id,
            status,
        } => {
            let dashboard = open_job(state, navigation, job_id).await?;
            finish(
                dashboard.update_application_status(application_id, status).await,
                dashboard.notifier(),
            )?;
            print_applications(&dashboard);
            Ok(())
        }
    }
}

async fn open_job(state: &AppState, navigation: Navigation, job_id: i64) -> Result<HrDashboard> {
    let dashboard = HrDashboard::new(state, navigation);
    finish(dashboard.load().await, dashboard.notifier())?;
    let job = dashboard
        .view()
        .jobs
        .into_iter()
        .find(|job| job.id == job_id)
        .ok_or_else(|| anyhow!("job {} is not one of your postings", job_id))?;
    finish(dashboard.view_applications(job).await, dashboard.notifier())?;
    Ok(dashboard)
}

fn print_applications(dashboard: &HrDashboard) {
    let panel = dashboard.panel();
    if let Some(job) = &panel.job {
        println!("Applications for {}", job.title);
    }
    if panel.applications.is_empty() {
        println!("No applications yet.");
    }
    for app in panel.applications {
        println!("#{:<5} candidate {:<6} {}", app.id, app.candidate_id, app.status);
    }
}

async fn login(state: &AppState, role: Role, creds: Credentials) -> Result<()> {
    let navigation = Navigation::new(Route::Login(role));
    let view = LoginView::new(state, role, navigation.clone());
    finish(view.submit(&creds.email, &creds.password).await, view.notifier())?;
    println!("Next: {}", navigation.current());
    Ok(())
}

async fn register(
    state: &AppState,
    role: Role,
    account: Registration,
    phone: Option<String>,
    resume: Option<String>,
) -> Result<()> {
    let navigation = Navigation::new(Route::Register(role));
    let view = RegisterView::new(state, role, navigation.clone());
    let payload = RegisterPayload {
        name: account.name,
        email: account.email,
        password: account.password,
        phone,
        resume,
    };
    finish(view.submit(&payload).await, view.notifier())?;
    if account.login {
        let login_view = LoginView::new(state, role, navigation.clone());
        finish(
            login_view.submit(&payload.email, &payload.password).await,
            login_view.notifier(),
        )?;
    }
    println!("Next: {}", navigation.current());
    Ok(())
}

fn finish(outcome: ActionOutcome, notifier: &Notifier) -> Result<()> {
    report(notifier)?;
    if outcome == ActionOutcome::Failed {
        // Only failures the views chose not to surface get this far.
        tracing::warn!("Action failed without a notification");
    }
    Ok(())
}

/// Prints the pending notification; an error notification fails the command.
fn report(notifier: &Notifier) -> Result<()> {
    let Some(notification) = notifier.latest() else {
        return Ok(());
    };
    notifier.dismiss_all();
    match notification.severity {
        Severity::Error => bail!(notification.message),
        _ => {
            println!("{}", notification.message);
            Ok(())
        }
    }
}
