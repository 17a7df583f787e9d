#[cfg(feature = "ssr")]
mod cli {
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::sync::Arc;

    use clap::{Parser, Subcommand, ValueEnum};
    use lumera::core::api::{
        ClassScope, ClassesApi, ClientError, LiveClassFilters, ReqwestTransport,
    };
    use lumera::core::auth::session::{LOGIN_FAILED, REGISTRATION_FAILED};
    use lumera::core::auth::{AuthSession, RegisterRequest, Role, SessionError};
    use lumera::core::{ClientConfig, FileStore, SystemClock};
    use serde::Serialize;
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "lumera")]
    #[command(about = "Luméra CLI - sign in and query the live-class marketplace", long_about = None)]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Sign in and store the session
        Login {
            #[arg(short = 'e', long)]
            email: String,

            #[arg(short = 'p', long)]
            password: String,
        },
        /// Create an account and sign in
        Register {
            #[arg(short = 'f', long)]
            first_name: String,

            #[arg(short = 'l', long)]
            last_name: String,

            #[arg(short = 'e', long)]
            email: String,

            #[arg(short = 'p', long)]
            password: String,

            #[arg(short = 'r', long, value_enum, default_value = "student")]
            role: RoleArg,

            #[arg(long)]
            phone: Option<String>,

            /// Educator specialty
            #[arg(long)]
            specialty: Option<String>,

            #[arg(long)]
            bio: Option<String>,
        },
        /// Show the signed-in user
        Me,
        /// Sign out and forget the stored session
        Logout,
        /// List categories
        Categories {
            /// Include hidden categories (admin only)
            #[arg(long)]
            all: bool,
        },
        /// List your classes (educator)
        Classes {
            #[arg(long, value_enum)]
            filter: Option<ScopeArg>,

            #[arg(long)]
            search: Option<String>,

            #[arg(long)]
            category_id: Option<String>,

            #[arg(long, default_value = "0")]
            page: u32,

            #[arg(long, default_value = "12")]
            size: u32,
        },
        /// List your students (educator)
        Students {
            #[arg(long)]
            search: Option<String>,

            #[arg(long, default_value = "0")]
            page: u32,

            #[arg(long, default_value = "20")]
            size: u32,
        },
        /// Dashboard statistics (educator)
        Stats,
        /// Download the earnings report PDF (educator)
        Report {
            #[arg(short = 'o', long)]
            out: PathBuf,
        },
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum RoleArg {
        Student,
        Educator,
    }

    impl From<RoleArg> for Role {
        fn from(role: RoleArg) -> Self {
            match role {
                RoleArg::Student => Role::Student,
                RoleArg::Educator => Role::Educator,
            }
        }
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum ScopeArg {
        Upcoming,
        Past,
        Draft,
        All,
    }

    impl From<ScopeArg> for ClassScope {
        fn from(scope: ScopeArg) -> Self {
            match scope {
                ScopeArg::Upcoming => ClassScope::Upcoming,
                ScopeArg::Past => ClassScope::Past,
                ScopeArg::Draft => ClassScope::Draft,
                ScopeArg::All => ClassScope::All,
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    enum CliError {
        #[error("Not signed in. Run `lumera login` first.")]
        NotSignedIn,

        #[error("{0}")]
        Session(String),

        #[error("{}", .0.display_message("Request failed"))]
        Client(#[from] ClientError),

        #[error("Failed to write {path}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },

        #[error("Failed to print output: {0}")]
        Output(#[from] serde_json::Error),
    }

    type Session = AuthSession<ReqwestTransport>;

    fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn session_failed(fallback: &str) -> impl Fn(SessionError) -> CliError + '_ {
        move |e| CliError::Session(e.display_message(fallback))
    }

    async fn require_session(session: &Session) -> Result<(), CliError> {
        session.initialize().await;
        if session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }

    async fn run(command: Commands, session: &Session) -> Result<(), CliError> {
        let classes = ClassesApi::new(session.client().clone());

        match command {
            Commands::Login { email, password } => {
                let user = session
                    .login(&email, &password)
                    .await
                    .map_err(session_failed(LOGIN_FAILED))?;
                tracing::info!(dashboard = session.dashboard_path(), "signed in");
                print_json(&user)
            }
            Commands::Register {
                first_name,
                last_name,
                email,
                password,
                role,
                phone,
                specialty,
                bio,
            } => {
                let request = RegisterRequest {
                    first_name,
                    last_name,
                    email,
                    password,
                    role: role.into(),
                    phone,
                    specialty,
                    bio,
                };
                let user = session
                    .register(&request)
                    .await
                    .map_err(session_failed(REGISTRATION_FAILED))?;
                print_json(&user)
            }
            Commands::Me => {
                require_session(session).await?;
                match session.profile() {
                    Some(profile) => print_json(&profile),
                    None => print_json(&session.refresh_user().await?),
                }
            }
            Commands::Logout => {
                session.logout().await;
                print_json(&serde_json::json!({"message": "Signed out"}))
            }
            Commands::Categories { all } => {
                if all {
                    require_session(session).await?;
                    print_json(&classes.get_all_categories().await?)
                } else {
                    print_json(&classes.get_categories().await?)
                }
            }
            Commands::Classes {
                filter,
                search,
                category_id,
                page,
                size,
            } => {
                require_session(session).await?;
                let filters = LiveClassFilters {
                    filter: filter.map(Into::into),
                    category_id,
                    search,
                    ..Default::default()
                };
                print_json(&classes.get_my_classes(&filters, page, size).await?)
            }
            Commands::Students { search, page, size } => {
                require_session(session).await?;
                print_json(&classes.get_my_students(search.as_deref(), page, size).await?)
            }
            Commands::Stats => {
                require_session(session).await?;
                let dashboard = lumera::core::load_educator_dashboard(&classes).await?;
                print_json(&serde_json::json!({
                    "totalClasses": dashboard.total_classes,
                    "studentCount": dashboard.student_count,
                    "stats": dashboard.stats,
                }))
            }
            Commands::Report { out } => {
                require_session(session).await?;
                let pdf = classes.download_earnings_report_pdf().await?;
                tokio::fs::write(&out, &pdf)
                    .await
                    .map_err(|source| CliError::Io {
                        path: out.clone(),
                        source,
                    })?;
                tracing::info!(path = %out.display(), bytes = pdf.len(), "earnings report saved");
                Ok(())
            }
        }
    }

    pub async fn main() -> ExitCode {
        // Load .env file (if exists)
        let _ = dotenvy::dotenv();

        let config = ClientConfig::from_env();

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(&config.log_filter))
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();

        let store = FileStore::new(config.session_file());
        tracing::debug!(api = %config.api_url, session = %store.path().display(), "config loaded");

        let session = AuthSession::from_parts(
            &config,
            ReqwestTransport::new(),
            Arc::new(store),
            Arc::new(SystemClock),
        );

        match run(cli.command, &session).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    cli::main().await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // browser builds use `hydrate` in lib.rs
}
