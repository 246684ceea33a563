use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use openlms::store::PgStore;
use openlms_cli::commands::{self, NewUser, TokenKind, TokenRequest};
use openlms_cli::seeder::{self, SeedConfig};
use openlms_config::JwtConfig;
use openlms_db::{init_db_pool, run_migrations};
use openlms_models::CourseMode;

#[derive(Parser)]
#[command(name = "openlms-cli")]
#[command(about = "OpenLMS CLI - Administrative tools for OpenLMS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account
    CreateUser {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Full name shown on the profile
        #[arg(short = 'n', long)]
        name: Option<String>,

        #[arg(long)]
        year_of_birth: Option<i32>,

        /// Grant staff access
        #[arg(long)]
        staff: bool,

        /// Grant superuser access
        #[arg(long)]
        superuser: bool,
    },
    /// Issue an access token for a user
    IssueToken {
        username: String,

        #[arg(long, value_enum, default_value = "jwt")]
        kind: TokenKind,

        /// Scope to grant, repeatable
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Filter such as `user:me` or `content_org:edX`, repeatable
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Issue the JWT as a restricted application
        #[arg(long)]
        restricted: bool,

        /// Lifetime of opaque tokens in seconds
        #[arg(long, default_value = "36000")]
        expires_in: i64,
    },
    /// Enroll a user in a course, or change their mode
    Enroll {
        username: String,
        course_id: String,

        #[arg(short = 'm', long, default_value = "audit")]
        mode: CourseMode,
    },
    /// Deactivate a user's enrollment
    Unenroll { username: String, course_id: String },
    /// Seed the database with fake users, courses, enrollments and certificates
    Seed {
        #[arg(short = 'u', long, default_value = "20")]
        users: usize,

        #[arg(short = 'c', long, default_value = "5")]
        courses: usize,

        /// Courses each user is enrolled in
        #[arg(long, default_value = "3")]
        enrollments: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = init_db_pool().await.context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    let store = PgStore::new(pool);

    match cli.command {
        Commands::CreateUser {
            username,
            email,
            password,
            name,
            year_of_birth,
            staff,
            superuser,
        } => {
            let username = prompt_missing(username, "Username")?;
            let email = prompt_missing(email, "Email address")?;
            let name = prompt_missing(name, "Full name")?;
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()
                    .context("failed to read password")?,
            };

            let user = commands::create_user(
                &store,
                NewUser {
                    username,
                    email,
                    password,
                    name,
                    year_of_birth,
                    is_staff: staff,
                    is_superuser: superuser,
                },
            )
            .await
            .map_err(|e| e.error)?;

            println!("\n✅ User created successfully!");
            println!("   Username: {}", user.username);
            println!("   Email: {}", user.email);
            println!("   ID: {}", user.id);
        }
        Commands::IssueToken {
            username,
            kind,
            scopes,
            filters,
            restricted,
            expires_in,
        } => {
            let token = commands::issue_token(
                &store,
                &JwtConfig::from_env(),
                &username,
                TokenRequest {
                    kind,
                    scopes,
                    filters,
                    restricted,
                    expires_in,
                },
            )
            .await
            .map_err(|e| e.error)?;
            println!("{token}");
        }
        Commands::Enroll {
            username,
            course_id,
            mode,
        } => {
            let enrollment = commands::enroll(&store, &username, &course_id, mode)
                .await
                .map_err(|e| e.error)?;
            println!(
                "✅ {} enrolled in {} as {}",
                username, enrollment.course_id, enrollment.mode
            );
        }
        Commands::Unenroll {
            username,
            course_id,
        } => match commands::unenroll(&store, &username, &course_id)
            .await
            .map_err(|e| e.error)?
        {
            Some(_) => println!("✅ {username} unenrolled from {course_id}"),
            None => println!("{username} is not enrolled in {course_id}"),
        },
        Commands::Seed {
            users,
            courses,
            enrollments,
        } => {
            let config = SeedConfig::new(users, courses).with_enrollments_per_user(enrollments);
            seeder::seed_all(&store, config)
                .await
                .map_err(|e| e.error)?;
        }
    }

    Ok(())
}

fn prompt_missing(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("failed to read {}", prompt.to_lowercase())),
    }
}
