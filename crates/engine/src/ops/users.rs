use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    Engine, EngineError, ResultEngine, User, listing,
    query::{Filters, QueryOptions},
    users,
    util::{hash_password, normalize_text, now_unix, verify_password},
};

use super::into_domain;

impl Engine {
    /// Add a new user. Usernames are unique; the password is stored as an
    /// Argon2 hash.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<User> {
        let username = normalize_text(username, "username", 1, 50)?;
        let email = normalize_text(email, "email", 3, 255)?;
        if !email.contains('@') {
            return Err(EngineError::InvalidInput("email must contain '@'".to_string()));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        if self.find_user(&username).await?.is_some() {
            return Err(EngineError::ExistingKey(username));
        }

        let password = hash_password(password)?;
        let now = now_unix();
        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(username),
            email: ActiveValue::Set(email),
            password: ActiveValue::Set(password),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.database)
        .await?;

        User::try_from(model)
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        self.find_user(username)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))
            .and_then(User::try_from)
    }

    /// Return the user when `password` matches the stored one.
    ///
    /// Unknown users and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        match self.find_user(username).await? {
            Some(model)
                if !password.is_empty() && verify_password(password, &model.password)? =>
            {
                User::try_from(model)
            }
            _ => Err(EngineError::KeyNotFound("user".to_string())),
        }
    }

    pub async fn list_users(&self, opts: QueryOptions) -> ResultEngine<Vec<User>> {
        let models = listing::list::<users::Entity, _>(&self.database, opts).await?;
        into_domain(models)
    }

    pub async fn count_users(&self, filters: &Filters) -> ResultEngine<u64> {
        listing::count::<users::Entity, _>(&self.database, filters).await
    }

    async fn find_user(&self, username: &str) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let alice = engine
            .create_user("alice", "alice@example.com", "hunter2")
            .await
            .unwrap();

        let stored = users::Entity::find_by_id(alice.id)
            .one(&engine.database)
            .await
            .unwrap()
            .unwrap()
            .password;
        assert_ne!(stored, "hunter2");
        assert!(stored.starts_with("$argon2"));

        assert_eq!(
            engine.authenticate("alice", "hunter2").await.unwrap().id,
            alice.id
        );
        assert!(matches!(
            engine.authenticate("alice", "$argon2").await.unwrap_err(),
            EngineError::KeyNotFound(_)
        ));
    }
}
