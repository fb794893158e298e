//! Small helpers shared across the suite.

/// Fully qualified case name, e.g. `books/read-unknown-id`.
pub fn case_name(resource: &str, case: &str) -> String {
    format!("{resource}/{case}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_name_joins_with_slash() {
        assert_eq!(case_name("roles", "update-empty"), "roles/update-empty");
    }
}
