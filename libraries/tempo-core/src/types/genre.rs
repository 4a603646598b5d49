//! Genre types

use crate::types::GenreId;
use serde::{Deserialize, Serialize};

/// A music genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Data for creating a new genre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGenre {
    pub name: String,
}
