use crate::{EngineError, ResultEngine};

mod categories;
mod expenses;
mod recurrent_expenses;
mod tags;
mod users;

/// Convert storage models into their domain counterparts.
fn into_domain<M, T>(models: Vec<M>) -> ResultEngine<Vec<T>>
where
    T: TryFrom<M, Error = EngineError>,
{
    models.into_iter().map(T::try_from).collect()
}
