use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, Role};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, SharedStore};
use crate::server::{self, AppState};

#[derive(Parser)]
#[command(name = "campus-timetable")]
#[command(about = "University timetable API with conflict detection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Port to bind (defaults to API_PORT / PORT / 5000)")]
        port: Option<u16>,

        #[arg(long, help = "Keep all data in process memory instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Print a signed access token for local use")]
    Token {
        #[arg(long, help = "admin, chef_departement or professor")]
        role: Role,

        #[arg(long, help = "Subject user id (random when omitted)")]
        user: Option<Uuid>,

        #[arg(long, help = "Department the user belongs to")]
        department: Option<i64>,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, memory } => {
            if config.security.jwt_secret.is_empty() {
                anyhow::bail!("JWT_SECRET must be set to serve the API");
            }

            let store: SharedStore = if memory {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            } else {
                let pool = DatabaseManager::connect(&config.database).await?;
                Arc::new(PgStore::new(pool))
            };

            let port = port.unwrap_or(config.api.port);
            server::serve(AppState::new(store, config), port).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Token { role, user, department } => {
            let claims = Claims::new(
                user.unwrap_or_else(Uuid::new_v4),
                role,
                department,
                config.security.jwt_expiry_hours,
            );
            println!("{}", generate_jwt(&claims, &config.security.jwt_secret)?);
            Ok(())
        }
    }
}
