//! Operator CLI for a FitClub database.
//!
//! Bootstraps the schema and the first admin, and runs member queries
//! through the same role-gated API an HTTP layer would use.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fitclub_core::model::member::MemberDraft;
use fitclub_core::{
    core_version, default_log_level, init_logging, open_db, ApiContext, ApiError,
    MemberListQuery, MemberService, SqliteRepository,
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fitclub", version, about = "FitClub membership database tool")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "FITCLUB_DB", default_value = "fitclub.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "FITCLUB_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, env = "FITCLUB_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or migrate the database.
    Init,
    /// Register an admin member without an authenticated caller.
    CreateAdmin {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long, env = "FITCLUB_PASSWORD")]
        password: String,
        #[arg(long)]
        membership_end: NaiveDate,
    },
    /// Show the caller's own member record.
    Whoami {
        #[arg(long)]
        phone: String,
        #[arg(long, env = "FITCLUB_PASSWORD")]
        password: String,
    },
    /// List members visible to the caller.
    Members {
        #[arg(long)]
        phone: String,
        #[arg(long, env = "FITCLUB_PASSWORD")]
        password: String,
        /// Keep only members active today.
        #[arg(long, default_value_t = false)]
        active: bool,
    },
}

#[derive(Serialize)]
struct InitReport {
    version: &'static str,
    db: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("fitclub: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fitclub: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(&cli.db)?;
    let api = ApiContext::new(&conn);

    match cli.command {
        Commands::Init => print_json(&InitReport {
            version: core_version(),
            db: cli.db.display().to_string(),
        }),
        Commands::CreateAdmin {
            phone,
            name,
            surname,
            password,
            membership_end,
        } => {
            let draft = MemberDraft {
                phone_number: phone,
                name,
                surname,
                password,
                membership_end: Some(membership_end),
                is_admin: true,
                ..MemberDraft::default()
            };
            let service = MemberService::new(SqliteRepository::try_new(&conn)?);
            let admin = service
                .register(&draft, api.today())
                .map_err(|err| api_failure(ApiError::from(err)))?;
            info!("event=cli_create_admin module=cli status=ok");
            let principal = fitclub_core::Principal::admin(admin.id);
            print_json(&api.retrieve_member(Some(&principal), admin.id).map_err(api_failure)?)
        }
        Commands::Whoami { phone, password } => {
            let principal = api.login(&phone, &password).map_err(api_failure)?;
            let view = api
                .retrieve_member(Some(&principal), principal.member_id)
                .map_err(api_failure)?;
            print_json(&view)
        }
        Commands::Members {
            phone,
            password,
            active,
        } => {
            let principal = api.login(&phone, &password).map_err(api_failure)?;
            let query = MemberListQuery {
                active_on: active.then(|| api.today()),
                ..MemberListQuery::default()
            };
            print_json(&api.list_members(Some(&principal), &query).map_err(api_failure)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the error body and hands back the error for the exit path.
fn api_failure(err: ApiError) -> ApiError {
    if let Ok(body) = serde_json::to_string_pretty(&err.body()) {
        println!("{body}");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn parses_members_command_with_global_flags() {
        let cli = Cli::try_parse_from([
            "fitclub",
            "--db",
            "/tmp/club.sqlite3",
            "members",
            "--phone",
            "+905551112233",
            "--password",
            "secret",
            "--active",
        ])
        .unwrap();
        assert_eq!(cli.db.to_str(), Some("/tmp/club.sqlite3"));
        assert!(matches!(cli.command, Commands::Members { active: true, .. }));
    }

    #[test]
    fn create_admin_requires_membership_end() {
        let result = Cli::try_parse_from([
            "fitclub",
            "create-admin",
            "--phone",
            "+905551112233",
            "--name",
            "Deniz",
            "--surname",
            "Kaya",
            "--password",
            "secret",
        ]);
        assert!(result.is_err());
    }
}
