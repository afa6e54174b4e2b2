mod common;
pub use common::{OrError, topic_name, validate_topic};

mod logging;
pub use logging::init_tracing;
