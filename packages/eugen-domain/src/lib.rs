pub mod context;
pub mod display;
pub mod flatten;
pub mod message;
pub mod suggestions;

pub use context::{PageContext, Route};
pub use flatten::{DEFAULT_FLATTEN_LIMIT, flatten_results};
pub use message::{ChatMessage, MessageMeta, ProductHit, ResultGroups, Role};
