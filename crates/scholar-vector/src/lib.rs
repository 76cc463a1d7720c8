pub mod flat;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use flat::FlatIndex;
pub use search::LanceIndex;
pub use writer::LanceWriter;
