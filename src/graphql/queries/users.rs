use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// All registered users
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .users()
            .list_all()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(user_record_to_graphql).collect())
    }

    /// A single user by username
    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<User> {
        let db = ctx.data_unchecked::<Database>();
        let record = db
            .users()
            .get_by_username(&username)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("User not found"))?;

        Ok(user_record_to_graphql(record))
    }

    /// The current authenticated user
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = ctx.auth_user()?;
        let db = ctx.data_unchecked::<Database>();
        let record = db
            .users()
            .get_by_id(&user.user_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found_error("User not found"))?;

        Ok(user_record_to_graphql(record))
    }
}
