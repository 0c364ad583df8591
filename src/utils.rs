//! # Utility Functions Module
//!
//! Helpers for building external tool command lines.

/// Converts an iterable of string-like items to `Vec<String>`.
///
/// Saves the `.to_string()` on every element when assembling vtfcmd
/// arguments.
///
/// # Example
/// ```rust
/// use vtf_texture_optimizer::utils::to_string_vec;
///
/// let width = 1024;
/// let args = to_string_vec(["-rwidth", &width.to_string(), "-silent"]);
/// assert_eq!(args, vec!["-rwidth", "1024", "-silent"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Macro for building argument vectors from mixed types.
///
/// # Example
/// ```rust
/// use vtf_texture_optimizer::args;
///
/// let width = 1024;
/// let args = args!["-rwidth", width, "-silent"];
/// assert_eq!(args, vec!["-rwidth", "1024", "-silent"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        {
            let args: Vec<String> = vec![$($item.to_string()),*];
            args
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_vec_string_literals() {
        let result = to_string_vec(["-exportformat", "png"]);
        assert_eq!(result, vec!["-exportformat".to_string(), "png".to_string()]);
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert_eq!(result, Vec::<String>::new());
    }

    #[test]
    fn test_args_macro_mixed_types() {
        let height = 512u32;
        let result = args!["-rheight", height, "-silent"];
        assert_eq!(result, vec!["-rheight".to_string(), "512".to_string(), "-silent".to_string()]);
    }
}
