//! Explicit predicate AST (SPEC_FULL.md §9 design note): replaces the
//! duck-typed queryset chaining the source uses with composable nodes
//! that `query_plane` builds up and then lowers into Diesel filter
//! expressions. Kept deliberately small — only the operators §4.5.3's
//! annotation/relationship rules actually need.

#[derive(Debug, Clone)]
pub enum Predicate {
    Eq(Field, Value),
    IsNull(Field),
    IsNotNull(Field),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Union of row sets matched by each branch, not a boolean OR over a
    /// single row — used where §4.5.3 rule 3/4 says "include X union Y"
    /// over what are really two different base filters.
    Union(Box<Predicate>, Box<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Document,
    StructuralSet,
    Corpus,
    Creator,
    IsPublic,
    Structural,
    /// Whether the row's `document` is its version tree's current
    /// `Document` (or n/a for corpus/structural rows with no document).
    /// Always DB-derived, never read off the row's own columns.
    IsCurrent,
    /// Whether the row's `document` has an active (non-deleted, current)
    /// path in the corpus the query is scoped to. DB-derived like
    /// `IsCurrent`.
    HasActivePath,
}

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Bool(bool),
}

impl Predicate {
    pub fn eq_text(field: Field, value: impl Into<String>) -> Self {
        Predicate::Eq(field, Value::Text(value.into()))
    }

    pub fn eq_bool(field: Field, value: bool) -> Self {
        Predicate::Eq(field, Value::Bool(value))
    }

    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(predicates.into_iter().collect())
    }

    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(predicates.into_iter().collect())
    }

    /// Evaluates the predicate against a row via `PredicateRow`.
    /// `query_plane::annotations`/`relationships` build one of these per
    /// query from rules 1-5 and evaluate it over the materialized
    /// candidate set, rather than lowering to SQL — the base query (all
    /// rows in the table) is cheap enough that a second round trip per
    /// rule isn't worth the complexity.
    pub fn matches(&self, row: &dyn PredicateRow) -> bool {
        match self {
            Predicate::Eq(field, Value::Text(expected)) => row.text(*field).as_deref() == Some(expected.as_str()),
            Predicate::Eq(field, Value::Bool(expected)) => row.boolean(*field) == Some(*expected),
            Predicate::IsNull(field) => row.text(*field).is_none() && row.boolean(*field).is_none(),
            Predicate::IsNotNull(field) => !Predicate::IsNull(*field).matches(row),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(row)),
            Predicate::Union(left, right) => left.matches(row) || right.matches(row),
        }
    }
}

/// Narrow row-access trait so `Predicate::matches` stays independent of
/// any specific Diesel-generated struct.
pub trait PredicateRow {
    fn text(&self, field: Field) -> Option<String>;
    fn boolean(&self, field: Field) -> Option<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        document: Option<String>,
        structural: bool,
        is_public: bool,
    }

    impl PredicateRow for Row {
        fn text(&self, field: Field) -> Option<String> {
            match field {
                Field::Document => self.document.clone(),
                _ => None,
            }
        }

        fn boolean(&self, field: Field) -> Option<bool> {
            match field {
                Field::Structural => Some(self.structural),
                Field::IsPublic => Some(self.is_public),
                _ => None,
            }
        }
    }

    #[test]
    fn or_matches_either_branch() {
        let row = Row { document: None, structural: true, is_public: false };
        let pred = Predicate::or([Predicate::eq_bool(Field::Structural, true), Predicate::eq_bool(Field::IsPublic, true)]);
        assert!(pred.matches(&row));
    }

    #[test]
    fn and_requires_both() {
        let row = Row { document: Some("d1".into()), structural: false, is_public: false };
        let pred = Predicate::and([Predicate::eq_text(Field::Document, "d1"), Predicate::eq_bool(Field::IsPublic, true)]);
        assert!(!pred.matches(&row));
    }
}
