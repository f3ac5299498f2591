use clap::{Args, Parser, Subcommand};
use coursepay::application::checkout::CheckoutService;
use coursepay::config::AppConfig;
use coursepay::domain::ids::UserId;
use coursepay::domain::course::CourseStatus;
use coursepay::domain::ports::{
    CourseStoreRef, EnrollmentStoreRef, MailerRef, PaymentGatewayRef, StudentStoreRef,
};
use coursepay::domain::signature::{sign, verify_signature};
use coursepay::infrastructure::in_memory::{InMemoryCatalog, InMemoryGateway, InMemoryMailer};
use coursepay::infrastructure::mail::{HttpMailer, LogMailer};
use coursepay::infrastructure::razorpay::RazorpayGateway;
use coursepay::interfaces::csv::catalog_reader::CatalogReader;
use coursepay::interfaces::http::auth::TokenKeys;
use coursepay::interfaces::http::{AppState, build_router};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Course checkout and enrollment service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print the gateway signature for an order/payment pair
    Sign {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long, env = "RAZORPAY_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Check a gateway signature, printing `valid` or `invalid`
    Verify {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
        #[arg(long, env = "RAZORPAY_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Mint a student bearer token for local testing
    Token {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 3600)]
        ttl_secs: u64,
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on (overrides COURSEPAY_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Courses CSV to seed the store with
    #[arg(long)]
    courses: Option<PathBuf>,

    /// Students CSV to seed the store with
    #[arg(long)]
    students: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Use an in-process gateway and mail outbox instead of external services
    #[arg(long)]
    offline: bool,
}

struct Stores {
    courses: CourseStoreRef,
    students: StudentStoreRef,
    enrollments: EnrollmentStoreRef,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Sign {
            order_id,
            payment_id,
            secret,
        } => {
            let signature = sign(&order_id, &payment_id, &secret)
                .ok_or_else(|| miette::miette!("could not key HMAC with the given secret"))?;
            println!("{signature}");
            Ok(())
        }
        Command::Verify {
            order_id,
            payment_id,
            signature,
            secret,
        } => {
            let check = verify_signature(&order_id, &payment_id, &signature, &secret);
            println!("{}", if check.is_valid() { "valid" } else { "invalid" });
            Ok(())
        }
        Command::Token {
            student_id,
            email,
            ttl_secs,
            jwt_secret,
        } => {
            let token = TokenKeys::new(&jwt_secret)
                .issue_student(UserId::from(student_id), email, ttl_secs)
                .into_diagnostic()?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::from_env(args.offline).into_diagnostic()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    init_tracing(config.log_json);
    info!(?config, "starting coursepay");

    let stores = open_stores(args.db_path.as_deref())?;
    if let Some(path) = &args.courses {
        seed_courses(&stores.courses, path).await?;
    }
    if let Some(path) = &args.students {
        seed_students(&stores.students, path).await?;
    }
    let courses = stores.courses.all_courses().await.into_diagnostic()?;
    let published = courses
        .iter()
        .filter(|c| c.status == CourseStatus::Published)
        .count();
    info!(courses = courses.len(), published, "catalog ready");

    let (gateway, mailer): (PaymentGatewayRef, MailerRef) = if args.offline {
        warn!("offline mode: orders are issued locally and mail is kept in memory");
        (
            Arc::new(InMemoryGateway::new(config.gateway.key_id.clone())),
            Arc::new(InMemoryMailer::new()),
        )
    } else {
        let gateway = Arc::new(RazorpayGateway::new(&config.gateway).into_diagnostic()?);
        let mailer: MailerRef = match config.mail.clone() {
            Some(mail) => Arc::new(HttpMailer::new(mail).into_diagnostic()?),
            None => {
                warn!("MAIL_API_URL not set, notifications will only be logged");
                Arc::new(LogMailer)
            }
        };
        (gateway, mailer)
    };

    let checkout = CheckoutService::assemble(
        stores.courses,
        stores.students,
        stores.enrollments,
        gateway,
        mailer,
        &config.gateway.key_secret,
        &config.gateway.currency,
    );
    let app = build_router(AppState::new(checkout, TokenKeys::new(&config.jwt_secret)));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .into_diagnostic()?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;
    info!("shutdown complete");
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    let Some(db_path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store =
        coursepay::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?;
    info!(path = %db_path.display(), "using RocksDB storage");
    Ok(Stores {
        courses: Arc::new(store.clone()),
        students: Arc::new(store.clone()),
        enrollments: Arc::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    let catalog = InMemoryCatalog::new();
    Stores {
        courses: Arc::new(catalog.clone()),
        students: Arc::new(catalog.clone()),
        enrollments: Arc::new(catalog),
    }
}

async fn seed_courses(store: &CourseStoreRef, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut loaded = 0usize;
    for course in CatalogReader::new(file).courses() {
        match course {
            Ok(course) => {
                store.store(course).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => warn!(error = %e, "Error reading course"),
        }
    }
    info!(loaded, path = %path.display(), "courses seeded");
    Ok(())
}

async fn seed_students(store: &StudentStoreRef, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut loaded = 0usize;
    for student in CatalogReader::new(file).students() {
        match student {
            Ok(student) => {
                store.store(student).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => warn!(error = %e, "Error reading student"),
        }
    }
    info!(loaded, path = %path.display(), "students seeded");
    Ok(())
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
