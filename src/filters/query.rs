// src/filters/query.rs
//! Compilation of a `FilterSelection` into a storage-level WHERE clause.
//!
//! Every active dimension becomes one AND'd clause appended to the caller's
//! `QueryBuilder`, with all user input carried as bound parameters. The
//! clause set is the same for the count query and the page query so both run
//! against an identical predicate.

use sqlx::{QueryBuilder, Sqlite};

use super::range::{parse_range, EXPERIENCE_OPEN_END, PAY_OPEN_END};
use super::selection::FilterSelection;

/// Append the WHERE clause for `selection` to `qb`. An empty selection
/// appends nothing, leaving the caller's base query untouched.
pub fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, selection: &FilterSelection) {
    if selection.is_empty() {
        return;
    }

    qb.push(" WHERE 1 = 1");

    let search = selection.search.trim();
    if !search.is_empty() {
        qb.push(" AND lower(title) LIKE ")
            .push_bind(format!("%{}%", escape_like(&search.to_lowercase())))
            .push(" ESCAPE '\\'");
    }

    if !selection.commitments.is_empty() {
        qb.push(" AND job_type IN (");
        let mut types = qb.separated(", ");
        for token in &selection.commitments {
            types.push_bind(token.clone());
        }
        types.push_unseparated(")");
    }

    if !selection.experience.is_empty() {
        push_overlap_clauses(
            qb,
            &selection.experience,
            "min_experience",
            "max_experience",
            EXPERIENCE_OPEN_END,
            1,
        );
    }

    if !selection.pay.is_empty() {
        // Pay tokens are expressed in thousands; salaries are stored in raw
        // currency units. NULL salaries fail the comparison and drop out.
        push_overlap_clauses(
            qb,
            &selection.pay,
            "min_salary",
            "max_salary",
            PAY_OPEN_END,
            1000,
        );
    }

    if !selection.skills.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM json_each(jobs.skills) WHERE json_each.value IN (");
        let mut skills = qb.separated(", ");
        for token in &selection.skills {
            skills.push_bind(token.trim().to_lowercase());
        }
        skills.push_unseparated("))");
    }
}

/// One AND'd clause OR-ing an interval-overlap test per range token:
/// `(min_col <= token.max AND max_col >= token.min)`. A token that fails to
/// parse keeps its slot as a never-true arm, so a lone malformed token makes
/// its dimension match nothing while valid siblings still match.
fn push_overlap_clauses(
    qb: &mut QueryBuilder<'_, Sqlite>,
    tokens: &[String],
    min_col: &str,
    max_col: &str,
    open_end: i64,
    scale: i64,
) {
    qb.push(" AND (");

    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }

        match parse_range(token, open_end) {
            Some(range) => {
                qb.push("(")
                    .push(min_col)
                    .push(" <= ")
                    .push_bind(range.max * scale)
                    .push(" AND ")
                    .push(max_col)
                    .push(" >= ")
                    .push_bind(range.min * scale)
                    .push(")");
            }
            None => {
                qb.push("0 = 1");
            }
        }
    }

    qb.push(")");
}

/// Escape LIKE metacharacters so user text matches as a literal substring.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterDimension;

    fn compiled(selection: &FilterSelection) -> String {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        push_filters(&mut qb, selection);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_selection_appends_nothing() {
        assert_eq!(compiled(&FilterSelection::new()), "SELECT COUNT(*) FROM jobs");
    }

    #[test]
    fn test_text_clause() {
        let sql = compiled(&FilterSelection::new().with_search("rust"));
        assert!(sql.contains("lower(title) LIKE"));
        assert!(sql.contains("ESCAPE"));
    }

    #[test]
    fn test_commitment_clause_binds_each_token() {
        let sql = compiled(&FilterSelection::new().with_commitments(&["FULL_TIME", "FREELANCE"]));
        assert!(sql.contains("job_type IN (?, ?)"));
    }

    #[test]
    fn test_experience_tokens_are_ored() {
        let sql = compiled(&FilterSelection::new().with_experience(&["0-1 YOE", "6+ YOE"]));
        assert!(sql.contains("(min_experience <= ? AND max_experience >= ?) OR (min_experience <= ? AND max_experience >= ?)"));
    }

    #[test]
    fn test_malformed_token_matches_nothing() {
        let sql = compiled(&FilterSelection::new().with_experience(&["abc-def YOE"]));
        assert!(sql.contains("0 = 1"));
    }

    #[test]
    fn test_malformed_token_keeps_valid_siblings() {
        let sql = compiled(&FilterSelection::new().with_experience(&["abc YOE", "1-3 YOE"]));
        assert!(sql.contains("0 = 1 OR (min_experience <= ? AND max_experience >= ?)"));
    }

    #[test]
    fn test_skills_clause_uses_set_overlap() {
        let sql = compiled(&FilterSelection::new().with_skills(&["react"]));
        assert!(sql.contains("json_each(jobs.skills)"));
        assert!(sql.contains("value IN (?)"));
    }

    #[test]
    fn test_dimensions_are_anded() {
        let mut selection = FilterSelection::new().with_pay(&["20-50"]);
        selection.toggle(FilterDimension::Commitment, "FREELANCE");

        let sql = compiled(&selection);
        let salary = sql.find("min_salary").unwrap();
        let commitment = sql.find("job_type").unwrap();
        assert!(commitment < salary);
        assert!(sql.matches(" AND (").count() >= 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
