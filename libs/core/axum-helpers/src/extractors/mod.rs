//! Custom extractors for Axum handlers.

pub mod object_id_path;
pub mod validated_json;

pub use object_id_path::{ObjectIdPairPath, ObjectIdPath, parse_object_id};
pub use validated_json::ValidatedJson;
