//! User repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{branch, user, user_branch};

/// Repository for user-related database operations.
pub struct UserRepository;

/// Field bundle for user creation. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub group_uuid: Uuid,
    pub is_active: bool,
    pub last_login: Option<String>,
}

impl UserRepository {
    /// Get all users ordered by username.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<user::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(user::Entity::find().order_by_asc(user::Column::Username).all(conn).await?)
    }

    /// Get a single user by username.
    pub async fn get_by_username<C>(conn: &C, username: &str) -> Result<Option<user::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(user::Entity::find().filter(user::Column::Username.eq(username)).one(conn).await?)
    }

    /// Get a single user by email.
    pub async fn get_by_email<C>(conn: &C, email: &str) -> Result<Option<user::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(user::Entity::find().filter(user::Column::Email.eq(email)).one(conn).await?)
    }

    /// Create a user, enforcing username and email uniqueness.
    pub async fn create<C>(conn: &C, new: NewUser) -> Result<user::Model>
    where
        C: ConnectionTrait,
    {
        if Self::get_by_username(conn, &new.username).await?.is_some() {
            anyhow::bail!("username '{}' already exists", new.username);
        }
        if Self::get_by_email(conn, &new.email).await?.is_some() {
            anyhow::bail!("email '{}' already exists", new.email);
        }

        let user = user::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            username: ActiveValue::Set(new.username),
            full_name: ActiveValue::Set(new.full_name),
            email: ActiveValue::Set(new.email),
            password: ActiveValue::Set(new.password),
            group_uuid: ActiveValue::Set(new.group_uuid),
            is_active: ActiveValue::Set(new.is_active),
            last_login: ActiveValue::Set(new.last_login),
        };
        Ok(user.insert(conn).await?)
    }

    /// Replace a user's branch assignments.
    pub async fn set_branches<C>(conn: &C, user_uuid: &Uuid, branch_uuids: &[Uuid]) -> Result<()>
    where
        C: ConnectionTrait,
    {
        user_branch::Entity::delete_many()
            .filter(user_branch::Column::UserUuid.eq(*user_uuid))
            .exec(conn)
            .await?;

        for branch_uuid in branch_uuids {
            let assignment = user_branch::ActiveModel {
                user_uuid: ActiveValue::Set(*user_uuid),
                branch_uuid: ActiveValue::Set(*branch_uuid),
            };
            user_branch::Entity::insert(assignment).exec(conn).await?;
        }

        Ok(())
    }

    /// Get the branches assigned to a user, ordered by name.
    pub async fn get_branches<C>(conn: &C, user_uuid: &Uuid) -> Result<Vec<branch::Model>>
    where
        C: ConnectionTrait,
    {
        let assignments = user_branch::Entity::find()
            .filter(user_branch::Column::UserUuid.eq(*user_uuid))
            .all(conn)
            .await?;

        let mut branches = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            if let Some(branch) = branch::Entity::find_by_id(assignment.branch_uuid).one(conn).await? {
                branches.push(branch);
            }
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    /// Delete all users and their branch assignments.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        user_branch::Entity::delete_many().exec(conn).await?;
        Ok(user::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count users.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(user::Entity::find().count(conn).await?)
    }
}
