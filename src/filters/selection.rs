// src/filters/selection.rs
//! The active filter selection and its URL query-string form.
//!
//! The selection is a plain value object owned by whoever drives a search
//! session. The browser address bar only ever sees its serialized form;
//! `to_query_string` / `parse_query` are that serialization boundary.

use serde::{Deserialize, Serialize};

/// Filter tokens offered for the commitment dimension.
pub const COMMITMENT_FILTER_ITEMS: [&str; 4] =
    ["FULL_TIME", "PART_TIME", "INTERNSHIP", "FREELANCE"];

/// Filter tokens offered for the experience dimension.
pub const EXPERIENCE_FILTER_ITEMS: [&str; 4] = ["0-1 YOE", "1-3 YOE", "3-6 YOE", "6+ YOE"];

/// Filter tokens offered for the pay dimension, in thousands.
pub const PAY_FILTER_ITEMS: [&str; 5] = ["0-10", "10-20", "20-50", "50-100", "100+"];

/// One togglable filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    Commitment,
    Experience,
    Pay,
    Skill,
}

/// The set of active search constraints.
///
/// Tokens within a dimension are OR'd together; dimensions are AND'd against
/// each other. An entirely empty selection is the pass-through fast path that
/// paginates all jobs by `posted_at` descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub search: String,
    pub commitments: Vec<String>,
    pub experience: Vec<String>,
    pub pay: Vec<String>,
    pub skills: Vec<String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_commitments(mut self, tokens: &[&str]) -> Self {
        self.commitments = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_experience(mut self, tokens: &[&str]) -> Self {
        self.experience = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_pay(mut self, tokens: &[&str]) -> Self {
        self.pay = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_skills(mut self, tokens: &[&str]) -> Self {
        self.skills = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Assemble a selection from already-split query parts, as a web route
    /// receives them (repeated keys collected per dimension).
    pub fn from_parts(
        search: Option<String>,
        commitments: Vec<String>,
        experience: Vec<String>,
        pay: Vec<String>,
        skills: Vec<String>,
    ) -> Self {
        Self {
            search: search.unwrap_or_default(),
            commitments,
            experience,
            pay,
            skills,
        }
    }

    /// True when no dimension is active. Callers use this to skip predicate
    /// composition entirely.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.commitments.is_empty()
            && self.experience.is_empty()
            && self.pay.is_empty()
            && self.skills.is_empty()
    }

    /// Toggle one token in one dimension: remove it if present, append it
    /// otherwise.
    pub fn toggle(&mut self, dimension: FilterDimension, token: &str) {
        let tokens = match dimension {
            FilterDimension::Commitment => &mut self.commitments,
            FilterDimension::Experience => &mut self.experience,
            FilterDimension::Pay => &mut self.pay,
            FilterDimension::Skill => &mut self.skills,
        };

        if let Some(pos) = tokens.iter().position(|t| t == token) {
            tokens.remove(pos);
        } else {
            tokens.push(token.to_string());
        }
    }

    /// Serialize as a URL query string. Repeated keys carry the OR'd sets
    /// within a dimension, e.g. `commitment=FULL_TIME&commitment=FREELANCE`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if !self.search.trim().is_empty() {
            serializer.append_pair("q", &self.search);
        }
        for token in &self.commitments {
            serializer.append_pair("commitment", token);
        }
        for token in &self.experience {
            serializer.append_pair("exp", token);
        }
        for token in &self.pay {
            serializer.append_pair("pay", token);
        }
        for token in &self.skills {
            serializer.append_pair("skills", token);
        }

        serializer.finish()
    }

    /// Reconstruct a selection from a URL query string (with or without a
    /// leading `?`). Unknown keys are ignored.
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut selection = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "q" => selection.search = value,
                "commitment" => selection.commitments.push(value),
                "exp" => selection.experience.push(value),
                "pay" => selection.pay.push(value),
                "skills" => selection.skills.push(value),
                _ => {}
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        assert!(FilterSelection::new().is_empty());
        assert!(FilterSelection::new().with_search("   ").is_empty());
        assert!(!FilterSelection::new().with_skills(&["react"]).is_empty());
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = FilterSelection::new();
        let original = selection.clone();

        selection.toggle(FilterDimension::Commitment, "FREELANCE");
        assert_eq!(selection.commitments, vec!["FREELANCE"]);

        selection.toggle(FilterDimension::Commitment, "FREELANCE");
        assert_eq!(selection, original);
    }

    #[test]
    fn test_toggle_keeps_other_tokens() {
        let mut selection = FilterSelection::new()
            .with_experience(&["0-1 YOE", "1-3 YOE", "6+ YOE"]);

        selection.toggle(FilterDimension::Experience, "1-3 YOE");
        assert_eq!(selection.experience, vec!["0-1 YOE", "6+ YOE"]);
    }

    #[test]
    fn test_query_string_round_trip() {
        let selection = FilterSelection::new()
            .with_search("rust backend")
            .with_commitments(&["FULL_TIME", "FREELANCE"])
            .with_experience(&["1-3 YOE"])
            .with_pay(&["20-50"])
            .with_skills(&["react", "sqlx"]);

        let query = selection.to_query_string();
        assert_eq!(FilterSelection::parse_query(&query), selection);
    }

    #[test]
    fn test_parse_query_ignores_unknown_keys() {
        let selection = FilterSelection::parse_query("?commitment=FULL_TIME&page=3&utm_source=x");
        assert_eq!(selection.commitments, vec!["FULL_TIME"]);
        assert!(selection.search.is_empty());
    }

    #[test]
    fn test_catalog_tokens_survive_encoding() {
        for token in EXPERIENCE_FILTER_ITEMS {
            let selection = FilterSelection::new().with_experience(&[token]);
            let parsed = FilterSelection::parse_query(&selection.to_query_string());
            assert_eq!(parsed.experience, vec![token]);
        }
    }
}
