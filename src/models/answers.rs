use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Selected option per question identifier.
///
/// Entries can be overwritten but never removed; a fresh quiz starts from an
/// empty set instead. Serializes as a flat JSON object, which is also the
/// persisted resume format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, returning the option it replaced.
    pub fn record(&mut self, question_id: impl Into<String>, option: impl Into<String>) -> Option<String> {
        self.0.insert(question_id.into(), option.into())
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, option)| (id.as_str(), option.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, option)| (id.into(), option.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_overwrites_and_reports_previous() {
        let mut answers = AnswerSet::new();
        assert_eq!(answers.record("q1", "A"), None);
        assert_eq!(answers.record("q1", "B"), Some("A".to_string()));
        assert_eq!(answers.get("q1"), Some("B"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn serializes_as_flat_object() {
        let answers: AnswerSet = [("q2", "B"), ("q1", "A")].into_iter().collect();
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"q1":"A","q2":"B"}"#);

        let parsed: AnswerSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answers);
    }
}
