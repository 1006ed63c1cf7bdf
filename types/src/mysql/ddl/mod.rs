//! MySQL DDL vocabulary

mod foreign_key;

pub use foreign_key::ReferentialAction;
