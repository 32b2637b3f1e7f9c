//! Personality analysis produced by the hosted model from quiz answers.
//!
//! The model is asked for bare JSON but answers in free-form text, so the
//! payload goes through [`Analysis::parse`], which accepts a fenced block and
//! validates every field instead of trusting the shape.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AnswerSet, Quiz};

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 10;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model returned an empty payload")]
    Empty,

    #[error("payload is not valid analysis JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rating {0} is outside 1..=10")]
    RatingOutOfRange(i64),

    #[error("trait '{name}' has score {score} outside 1..=10")]
    TraitScoreOutOfRange { name: String, score: i64 },

    #[error("analysis lists no traits")]
    NoTraits,

    #[error("analysis paragraph is blank")]
    BlankAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trait {
    #[serde(rename = "trait")]
    pub name: String,
    pub score: u8,
}

/// A validated analysis; every score is within 1..=10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub rating: u8,
    pub traits: Vec<Trait>,
    pub analysis: String,
    pub suggestions: Vec<String>,
}

/// Payload as the model sent it, before range checks.
#[derive(Deserialize)]
struct RawTrait {
    #[serde(rename = "trait")]
    name: String,
    score: i64,
}

#[derive(Deserialize)]
struct RawAnalysis {
    rating: i64,
    traits: Vec<RawTrait>,
    analysis: String,
    suggestions: Vec<String>,
}

impl Analysis {
    /// Parses and validates a model completion.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for blank or malformed payloads and for values
    /// outside the schema's ranges.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(ParseError::Empty);
        }

        let raw: RawAnalysis = serde_json::from_str(body)?;
        let rating =
            score_in_range(raw.rating).ok_or(ParseError::RatingOutOfRange(raw.rating))?;
        if raw.traits.is_empty() {
            return Err(ParseError::NoTraits);
        }
        let traits = raw
            .traits
            .into_iter()
            .map(|item| match score_in_range(item.score) {
                Some(score) => Ok(Trait {
                    name: item.name,
                    score,
                }),
                None => Err(ParseError::TraitScoreOutOfRange {
                    name: item.name,
                    score: item.score,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if raw.analysis.trim().is_empty() {
            return Err(ParseError::BlankAnalysis);
        }

        Ok(Self {
            rating,
            traits,
            analysis: raw.analysis,
            suggestions: raw.suggestions,
        })
    }

    pub fn band(&self) -> RatingBand {
        RatingBand::from_rating(self.rating)
    }

    /// Plain-text block used when the user shares their results.
    pub fn share_text(&self) -> String {
        let mut text = String::from("My personality assessment results:\n\n");
        let _ = writeln!(text, "Rating: {}/{}", self.rating, MAX_SCORE);
        text.push_str("\nTraits:\n");
        for item in &self.traits {
            let _ = writeln!(text, "{}: {}/{}", item.name, item.score, MAX_SCORE);
        }
        let _ = write!(text, "\nAnalysis:\n{}\n", self.analysis);
        text.push_str("\nSuggestions:\n");
        text.push_str(&self.suggestions.join("\n"));
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    Excellent,
    Satisfactory,
    NeedsWork,
}

impl RatingBand {
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            8..=u8::MAX => RatingBand::Excellent,
            6..=7 => RatingBand::Satisfactory,
            _ => RatingBand::NeedsWork,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RatingBand::Excellent => "Excellent! Your neural patterns show optimal harmony.",
            RatingBand::Satisfactory => {
                "Satisfactory. Your cognitive framework has growth potential."
            }
            RatingBand::NeedsWork => "Let's enhance your neural programming together.",
        }
    }
}

/// Prompt asking the model to analyse a completed assessment.
pub fn analysis_prompt(quiz: &Quiz, answers: &AnswerSet) -> String {
    let mut prompt = String::from(
        "Analyze these personality assessment responses and provide:\n\
         1. Overall character rating (1-10 scale, 10 being most positive)\n\
         2. Top 3 character traits with scores (1-10)\n\
         3. Brief analysis paragraph\n\
         4. 3 personalized suggestions\n\
         \n\
         Format requirements:\n\
         - Rating must be between 1-10\n\
         - Respond in perfect JSON format\n\
         - Don't include any markdown or code fences\n\
         \n\
         Questions and Answers:\n",
    );

    for question in quiz.questions() {
        let answer = answers.get(&question.id).unwrap_or("No answer");
        let _ = writeln!(prompt, "{} - {}", question.question, answer);
    }

    prompt.push_str(
        "\nResponse format:\n\
         {\n  \
           \"rating\": 7,\n  \
           \"traits\": [\n    \
             {\"trait\": \"Optimism\", \"score\": 8},\n    \
             {\"trait\": \"Resilience\", \"score\": 6}\n  \
           ],\n  \
           \"analysis\": \"The user shows strong optimism but could work on resilience...\",\n  \
           \"suggestions\": [\"Practice mindfulness...\"]\n\
         }\n",
    );
    prompt
}

fn score_in_range(value: i64) -> Option<u8> {
    u8::try_from(value)
        .ok()
        .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
