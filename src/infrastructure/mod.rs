// Store infrastructure - connection accessor, schema initializer and name resolvers
pub mod sqlite_database;

pub use sqlite_database::SqliteDatabase;
