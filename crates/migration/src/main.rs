use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./ledger.db?mode=rwc";
const USAGE: &str = "usage: migration [up [N] | down [N] | fresh | status]";

/// Schema action for the ledger database.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Status,
}

impl Action {
    /// Parse the arguments after the program name; no action means `up`.
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let action = args.next();
        let steps = args
            .next()
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| format!("invalid step count {raw:?}"))
            })
            .transpose()?;

        match (action.as_deref(), steps) {
            (None | Some("up"), steps) => Ok(Self::Up(steps)),
            (Some("down"), steps) => Ok(Self::Down(steps)),
            (Some("fresh"), None) => Ok(Self::Fresh),
            (Some("status"), None) => Ok(Self::Status),
            (Some(other), _) => Err(format!("unknown action {other:?}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let action = match Action::parse(std::env::args().skip(1)) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match action {
        Action::Up(steps) => migration::Migrator::up(&db, steps).await?,
        Action::Down(steps) => migration::Migrator::down(&db, steps).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
