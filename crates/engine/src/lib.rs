//! Data layer of the ledger.
//!
//! [`Engine`] owns the database connection and exposes one method per
//! repository operation. List and count operations take caller supplied
//! [`query::QueryOptions`] / [`query::Filters`] and run them through the
//! allow-list of the table they touch.
use sea_orm::DatabaseConnection;

pub use categories::Category;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseParams};
pub use recurrent_expenses::{RecurrentExpense, RecurrentExpenseParams};
pub use tags::{Tag, parse_tag_names};
pub use users::User;

pub mod query;

mod categories;
mod error;
mod expenses;
mod listing;
mod ops;
mod recurrent_expenses;
mod taggings;
mod tags;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, checking the database is reachable.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
        })
    }
}
