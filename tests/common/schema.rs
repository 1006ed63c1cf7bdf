use chrono::NaiveDateTime;
use tabula::prelude::*;

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Person {
    /// @autoIncrement
    /// @primaryKey
    pub id: u32,
    /// @varchar(64)
    pub name: String,
}

#[derive(Debug, Clone, Entity)]
pub struct Car {
    /// @autoIncrement
    /// @unsigned
    /// @primaryKey
    pub id: u32,
    /// @varchar(50)
    /// @unique
    pub brand: String,
    /// @decimal(9,2)
    /// Asking price in euros.
    pub price: f64,
    pub sold: bool,
    /// @onDelete(SET NULL)
    pub owner: Option<Ref<Person>>,
    #[entity(skip)]
    pub notes: Vec<String>,
}

/// No primary key: rows are matched on every column
#[derive(Debug, Clone, Entity)]
pub struct LogLine {
    /// @text
    pub message: String,
    pub level: i32,
}

#[derive(Debug, Clone, Entity)]
pub struct ServiceVisit {
    /// @primaryKey
    pub code: String,
    /// @onDelete(CASCADE)
    pub car: Ref<Car>,
    /// @timestamp
    pub visited_at: NaiveDateTime,
    pub mileage: Option<i64>,
}

/// `@varchar` on an integer field
#[derive(Debug, Clone, Entity)]
pub struct Mismatched {
    /// @primaryKey
    pub id: i32,
    /// @varchar(10)
    pub amount: i32,
}

/// Auto-increment on a string column
#[derive(Debug, Clone, Entity)]
pub struct BadCounter {
    /// @autoIncrement
    /// @primaryKey
    pub id: String,
}

#[derive(Debug, Clone, Entity)]
pub struct Pair {
    /// @primaryKey
    pub left: i32,
    /// @primaryKey
    pub right: i32,
}

/// References an entity with a composite key
#[derive(Debug, Clone, Entity)]
pub struct PairLink {
    /// @primaryKey
    pub id: i32,
    pub pair: Ref<Pair>,
}
