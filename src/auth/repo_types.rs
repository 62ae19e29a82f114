use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                    // unique user ID
    pub email: String,              // user email, unique
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
}

/// Profile linked 1:1 to a user; removed together with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<String>,
    pub picture: Option<String>,
    pub college: Option<String>,
    pub review: Option<String>,
    pub admin: bool,
}

/// Profile fields supplied when a user is created.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<String>,
    pub picture: Option<String>,
    pub college: Option<String>,
    pub review: Option<String>,
    pub admin: bool,
}

impl NewProfile {
    pub(crate) fn into_profile(self, user_id: i64) -> Profile {
        Profile {
            user_id,
            name: self.name,
            lastname: self.lastname,
            birthday: self.birthday,
            picture: self.picture,
            college: self.college,
            review: self.review,
            admin: self.admin,
        }
    }
}
