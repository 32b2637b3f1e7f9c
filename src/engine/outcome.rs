//! Completion view: a score for scored quizzes, grouped answers for surveys.

use serde::Serialize;

use crate::models::{AnswerSet, Quiz, QuizKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Scored(ScoreReport),
    Categorized(CategoryReport),
}

impl Outcome {
    pub fn compute(quiz: &Quiz, answers: &AnswerSet) -> Self {
        match quiz.kind() {
            QuizKind::Scored => Outcome::Scored(ScoreReport::compute(quiz, answers)),
            QuizKind::Categorized => Outcome::Categorized(CategoryReport::compute(quiz, answers)),
        }
    }
}

/// Result for a single scored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReview {
    pub question: String,
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage as u32 {
            90..=100 => Grade::Excellent,
            70..=89 => Grade::Good,
            50..=69 => Grade::Fair,
            _ => Grade::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
    pub breakdown: Vec<AnswerReview>,
}

impl ScoreReport {
    pub fn compute(quiz: &Quiz, answers: &AnswerSet) -> Self {
        let breakdown: Vec<AnswerReview> = quiz
            .questions()
            .iter()
            .map(|question| {
                let your_answer = answers.get(&question.id).map(String::from);
                let correct_answer = question.correct_answer.clone().unwrap_or_default();
                let is_correct = your_answer.as_deref() == Some(correct_answer.as_str());
                AnswerReview {
                    question: question.question.clone(),
                    your_answer,
                    correct_answer,
                    is_correct,
                }
            })
            .collect();

        Self {
            correct: breakdown.iter().filter(|review| review.is_correct).count(),
            total: quiz.total(),
            breakdown,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.correct as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorizedAnswer {
    pub question: String,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub answers: Vec<CategorizedAnswer>,
}

/// Answers grouped by category, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub groups: Vec<CategoryGroup>,
}

impl CategoryReport {
    pub fn compute(quiz: &Quiz, answers: &AnswerSet) -> Self {
        let mut groups: Vec<CategoryGroup> = Vec::new();

        for question in quiz.questions() {
            let entry = CategorizedAnswer {
                question: question.question.clone(),
                answer: answers.get(&question.id).map(String::from),
            };
            let label = question.category_label();
            match groups.iter_mut().find(|group| group.category == label) {
                Some(group) => group.answers.push(entry),
                None => groups.push(CategoryGroup {
                    category: label.to_string(),
                    answers: vec![entry],
                }),
            }
        }

        Self { groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;

    fn scored_quiz() -> Quiz {
        Quiz::new(vec![
            Question {
                id: "q1".into(),
                question: "What is 2 + 2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: Some("4".into()),
                category: None,
            },
            Question {
                id: "q2".into(),
                question: "Which is a colour?".into(),
                options: vec!["Red".into(), "Seven".into()],
                correct_answer: Some("Red".into()),
                category: None,
            },
        ])
        .unwrap()
    }

    fn survey(categories: &[Option<&str>]) -> Quiz {
        let questions = categories
            .iter()
            .enumerate()
            .map(|(index, category)| Question {
                id: format!("s{}", index + 1),
                question: format!("Statement {}", index + 1),
                options: vec!["Agree".into(), "Disagree".into()],
                correct_answer: None,
                category: category.map(String::from),
            })
            .collect();
        Quiz::new(questions).unwrap()
    }

    #[test]
    fn score_counts_matching_answers() {
        let quiz = scored_quiz();
        let answers: AnswerSet = [("q1", "4"), ("q2", "Seven")].into_iter().collect();

        let Outcome::Scored(report) = Outcome::compute(&quiz, &answers) else {
            panic!("expected a scored outcome");
        };
        assert_eq!(report.correct, 1);
        assert_eq!(report.total, 2);
        assert!(report.breakdown[0].is_correct);
        assert!(!report.breakdown[1].is_correct);
        assert_eq!(report.grade(), Grade::Fair);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_percentage(100.0), Grade::Excellent);
        assert_eq!(Grade::from_percentage(75.0), Grade::Good);
        assert_eq!(Grade::from_percentage(49.9), Grade::Poor);
    }

    #[test]
    fn survey_groups_by_first_appearance() {
        let quiz = survey(&[Some("Mood"), Some("Sleep"), Some("Mood"), None]);
        let answers: AnswerSet = [("s1", "Agree"), ("s2", "Disagree"), ("s3", "Agree"), ("s4", "Agree")]
            .into_iter()
            .collect();

        let Outcome::Categorized(report) = Outcome::compute(&quiz, &answers) else {
            panic!("expected a categorized outcome");
        };
        let labels: Vec<_> = report.groups.iter().map(|group| group.category.as_str()).collect();
        assert_eq!(labels, ["Mood", "Sleep", "General"]);
        assert_eq!(report.groups[0].answers.len(), 2);
        assert_eq!(report.groups[1].answers[0].answer.as_deref(), Some("Disagree"));
    }
}
