pub mod outline_parser;
pub mod outline_serializer;

pub use outline_parser::parse_outline;
pub use outline_serializer::serialize_outline;
