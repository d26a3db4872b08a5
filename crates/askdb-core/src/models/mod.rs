pub mod query;

pub use query::{QueryRequest, QueryResponse};
