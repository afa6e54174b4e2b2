use crate::iris_error;

pub type OrError<T> = Result<T, String>;

/// Creates standardized Iris error message
#[macro_export]
macro_rules! iris_error {
    ($component:expr, $method:expr, $msg:expr) => {
        format!("Iris {} Error: {}", concat!($component, "::", $method), $msg)
    };
}

/// Creates error with cause chain
#[macro_export]
macro_rules! iris_error_cause {
    ($component:expr, $method:expr, $msg:expr, $cause:expr) => {
        format!("Iris {} Error: {}\nCaused by: {}",
            concat!($component, "::", $method), $msg, $cause)
    };
}

/// Joins a table path and an entry key into a full topic name, e.g.
/// `("/SmartDashboard", "NVIDIA ORIN ARRAY TEST")` → `/SmartDashboard/NVIDIA ORIN ARRAY TEST`.
///
/// Validates:
/// - Table path is absolute, has no trailing slash and no empty segments (`/` alone is the root table)
/// - Key is non-empty, has no leading/trailing slash and no `//`
/// - No control characters anywhere
///
/// Keys may contain spaces and `/` (nested subtables).
pub fn topic_name(table_path: &str, key: &str) -> OrError<String> {
    validate_table_path(table_path)?;
    if key.is_empty() {
        return Err(iris_error!("utils", "topic_name", "key cannot be empty"));
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(iris_error!("utils", "topic_name",
            &format!("key '{}' cannot start or end with '/'", key)));
    }
    if key.contains("//") {
        return Err(iris_error!("utils", "topic_name",
            &format!("key '{}' contains double slashes '//' - not allowed", key)));
    }
    if key.chars().any(char::is_control) {
        return Err(iris_error!("utils", "topic_name", "key cannot contain control characters"));
    }

    if table_path == "/" {
        Ok(format!("/{}", key))
    } else {
        Ok(format!("{}/{}", table_path, key))
    }
}

/// Checks a full topic name as produced by [`topic_name`].
/// Called by: `TableState` on every request, since topics arrive over the wire.
pub fn validate_topic(topic: &str) -> OrError<()> {
    if topic.is_empty() {
        return Err(iris_error!("utils", "validate_topic", "topic cannot be empty"));
    }
    if !topic.starts_with('/') || topic == "/" {
        return Err(iris_error!("utils", "validate_topic",
            &format!("topic '{}' must be an absolute path with at least one segment", topic)));
    }
    if topic.ends_with('/') {
        return Err(iris_error!("utils", "validate_topic",
            &format!("topic '{}' cannot end with '/' - trailing slashes not allowed", topic)));
    }
    if topic.contains("//") {
        return Err(iris_error!("utils", "validate_topic",
            &format!("topic '{}' contains double slashes '//' - not allowed", topic)));
    }
    if topic.chars().any(char::is_control) {
        return Err(iris_error!("utils", "validate_topic", "topic cannot contain control characters"));
    }
    Ok(())
}

fn validate_table_path(table_path: &str) -> OrError<()> {
    if table_path.is_empty() {
        return Err(iris_error!("utils", "validate_table_path", "table path cannot be empty"));
    }
    if !table_path.starts_with('/') {
        return Err(iris_error!("utils", "validate_table_path",
            &format!("table path '{}' must start with '/'", table_path)));
    }
    if table_path == "/" {
        return Ok(());
    }
    if table_path.ends_with('/') {
        return Err(iris_error!("utils", "validate_table_path",
            &format!("table path '{}' cannot end with '/' - trailing slashes not allowed", table_path)));
    }
    if table_path.contains("//") {
        return Err(iris_error!("utils", "validate_table_path",
            &format!("table path '{}' contains double slashes '//' - not allowed", table_path)));
    }
    if table_path.chars().any(char::is_control) {
        return Err(iris_error!("utils", "validate_table_path",
            "table path cannot contain control characters"));
    }
    Ok(())
}
