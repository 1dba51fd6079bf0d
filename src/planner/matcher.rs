//! Case-insensitive substring lookup that refuses to guess. All "check by text snippet"
//! operations go through here.

use super::error::{Candidate, PlannerError};

#[derive(Debug, PartialEq)]
pub enum MatchOutcome<T> {
    Found { index: usize, entry: T },
    Ambiguous(Vec<Candidate>),
    NotFound,
}

impl<T> MatchOutcome<T> {
    /// Converts the outcome into a result, turning absence and ambiguity into errors that name the
    /// query.
    pub fn into_result(self, query: &str) -> Result<(usize, T), PlannerError> {
        match self {
            MatchOutcome::Found { index, entry } => Ok((index, entry)),
            MatchOutcome::Ambiguous(candidates) => Err(PlannerError::Ambiguous {
                query: query.to_string(),
                candidates,
            }),
            MatchOutcome::NotFound => Err(PlannerError::NotFound(query.to_string())),
        }
    }
}

/// Returns every entry whose key contains `query`, ignoring case, in original order together with
/// its 0-based index.
pub fn find_matches<'a, T, K>(entries: &'a [T], key_fn: K, query: &str) -> Vec<(usize, &'a T)>
where
    K: Fn(&T) -> &str,
{
    let query = query.to_lowercase();
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| key_fn(entry).to_lowercase().contains(&query))
        .collect()
}

pub fn match_one<'a, T, K>(entries: &'a [T], key_fn: K, query: &str) -> MatchOutcome<&'a T>
where
    K: Fn(&T) -> &str,
{
    let mut matches = find_matches(entries, &key_fn, query);
    match matches.len() {
        0 => MatchOutcome::NotFound,
        1 => {
            let (index, entry) = matches.remove(0);
            MatchOutcome::Found { index, entry }
        }
        _ => MatchOutcome::Ambiguous(
            matches
                .into_iter()
                .map(|(index, entry)| Candidate {
                    position: index + 1,
                    key: key_fn(entry).to_string(),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec![
            "Morning run".into(),
            "Read a book".into(),
            "Evening run".into(),
            "Meditate".into(),
        ]
    }

    #[test]
    fn test_single_match_ignores_case() {
        let entries = labels();
        let outcome = match_one(&entries, |v| v.as_str(), "MEDI");
        assert_eq!(
            outcome,
            MatchOutcome::Found {
                index: 3,
                entry: &entries[3]
            }
        );
    }

    #[test]
    fn test_multiple_matches_are_reported_not_picked() {
        let entries = labels();
        let outcome = match_one(&entries, |v| v.as_str(), "run");
        assert_eq!(
            outcome,
            MatchOutcome::Ambiguous(vec![
                Candidate {
                    position: 1,
                    key: "Morning run".into()
                },
                Candidate {
                    position: 3,
                    key: "Evening run".into()
                },
            ])
        );
    }

    #[test]
    fn test_no_match() {
        let entries = labels();
        assert_eq!(
            match_one(&entries, |v| v.as_str(), "swim"),
            MatchOutcome::NotFound
        );
        assert_eq!(
            match_one(&entries, |v| v.as_str(), "swim").into_result("swim"),
            Err(PlannerError::NotFound("swim".into()))
        );
    }

    #[test]
    fn test_empty_list() {
        let entries: Vec<String> = vec![];
        assert_eq!(
            match_one(&entries, |v| v.as_str(), ""),
            MatchOutcome::NotFound
        );
    }

    #[test]
    fn test_find_matches_keeps_order() {
        let entries = labels();
        let found = find_matches(&entries, |v| v.as_str(), "R");
        let indices = found.iter().map(|v| v.0).collect::<Vec<_>>();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
