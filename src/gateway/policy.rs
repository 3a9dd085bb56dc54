//! Statement allow-list
//!
//! Keyword matching is a case-insensitive prefix test against the trimmed
//! statement. There is no SQL parsing: trailing statements after a `;` and
//! keywords hidden behind comments are not detected. See DESIGN.md.

use super::errors::{GatewayError, GatewayResult};

/// Which leading keywords a route accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementPolicy {
    /// `POST /insert` with a `query` body
    InsertOnly,
    /// `GET /query?sql=...`
    SelectOrInsert,
}

impl StatementPolicy {
    pub fn allowed_keywords(&self) -> &'static [&'static str] {
        match self {
            StatementPolicy::InsertOnly => &["INSERT"],
            StatementPolicy::SelectOrInsert => &["SELECT", "INSERT"],
        }
    }

    pub fn rejection_message(&self) -> &'static str {
        match self {
            StatementPolicy::InsertOnly => "only INSERT queries allowed",
            StatementPolicy::SelectOrInsert => "only SELECT/INSERT allowed",
        }
    }

    pub fn permits(&self, statement: &str) -> bool {
        self.allowed_keywords()
            .iter()
            .any(|keyword| starts_with_keyword(statement, keyword))
    }

    /// Reject the statement unless it starts with an allowed keyword
    pub fn check(&self, statement: &str) -> GatewayResult<()> {
        if self.permits(statement) {
            Ok(())
        } else {
            Err(GatewayError::validation(self.rejection_message()))
        }
    }
}

/// Case-insensitive prefix test on the trimmed statement
pub fn starts_with_keyword(statement: &str, keyword: &str) -> bool {
    statement
        .trim()
        .get(..keyword.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_case_insensitive_and_trimmed() {
        assert!(starts_with_keyword("INSERT INTO patient VALUES (1)", "INSERT"));
        assert!(starts_with_keyword("  insert into patient", "INSERT"));
        assert!(starts_with_keyword("\n\tInSeRt", "INSERT"));
        assert!(!starts_with_keyword("INS", "INSERT"));
        assert!(!starts_with_keyword("", "INSERT"));
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert!(!starts_with_keyword("éééééé", "INSERT"));
        assert!(!starts_with_keyword("ins€rt", "INSERT"));
    }

    #[test]
    fn test_insert_only() {
        let policy = StatementPolicy::InsertOnly;
        assert!(policy.check("INSERT INTO patient (name) VALUES ('x')").is_ok());
        for statement in ["SELECT * FROM patient", "DELETE FROM patient", "DROP TABLE patient", ""] {
            assert_eq!(
                policy.check(statement),
                Err(GatewayError::validation("only INSERT queries allowed"))
            );
        }
    }

    #[test]
    fn test_select_or_insert() {
        let policy = StatementPolicy::SelectOrInsert;
        assert!(policy.check("select 1").is_ok());
        assert!(policy.check(" INSERT INTO patient VALUES ()").is_ok());
        assert_eq!(
            policy.check("UPDATE patient SET name = 'x'"),
            Err(GatewayError::validation("only SELECT/INSERT allowed"))
        );
    }

    /// Documented limitation: only the leading keyword is inspected.
    #[test]
    fn test_prefix_match_does_not_inspect_rest_of_statement() {
        let policy = StatementPolicy::SelectOrInsert;
        assert!(policy.permits("SELECT 1; DROP TABLE patient"));
        assert!(policy.permits("SELECTED"));
        assert!(!policy.permits("/* SELECT */ DELETE FROM patient"));
    }
}
