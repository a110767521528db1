use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of the seeded `user_data` table. Also the CSV record layout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserData {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub age: Decimal,
}
