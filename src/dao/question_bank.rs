//! Question bank loaded once at startup from the board file.

use std::{collections::HashMap, fs, io, io::ErrorKind, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::state::question::{PlayedKey, Question};

/// Errors raised while loading the question bank.
#[derive(Debug, Error)]
pub enum QuestionBankError {
    /// The bank file exists but could not be read.
    #[error("reading question bank `{path}`")]
    Io {
        /// Path of the bank file.
        path: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The document is not a valid bank.
    #[error("decoding question bank")]
    Parse(#[from] serde_json::Error),
    /// Two questions share the same `(prompt, points)` identity.
    #[error("question `{prompt}` worth {points} appears more than once")]
    DuplicateKey {
        /// Shared prompt.
        prompt: String,
        /// Shared point value.
        points: u32,
    },
    /// A question is worth zero or negative points.
    #[error("question `{prompt}` has non-positive points ({points})")]
    InvalidPoints {
        /// Offending prompt.
        prompt: String,
        /// Value found in the file.
        points: i64,
    },
}

/// A board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Column heading.
    pub name: String,
    /// Questions in board order.
    pub questions: Vec<Question>,
}

/// Immutable set of questions with unique `(prompt, points)` keys.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    categories: Vec<Category>,
    index: HashMap<PlayedKey, (usize, usize)>,
}

#[derive(Debug, Deserialize)]
struct RawBank {
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    points: i64,
    question: String,
    answer: String,
}

impl QuestionBank {
    /// Load the bank stored at `path`. A missing file yields an empty bank.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let bank = Self::from_json_str(&contents)?;
                info!(
                    path = %path.display(),
                    categories = bank.categories.len(),
                    questions = bank.len(),
                    "loaded question bank"
                );
                Ok(bank)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "question bank not found; accepting free-form questions"
                );
                Ok(Self::default())
            }
            Err(source) => Err(QuestionBankError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Parse a bank document (`{ "categories": [{ "name", "questions": [...] }] }`).
    pub fn from_json_str(contents: &str) -> Result<Self, QuestionBankError> {
        let raw: RawBank = serde_json::from_str(contents)?;
        let categories = raw
            .categories
            .into_iter()
            .map(|category| {
                let questions = category
                    .questions
                    .into_iter()
                    .map(|raw| {
                        let points = u32::try_from(raw.points)
                            .ok()
                            .filter(|points| *points > 0)
                            .ok_or_else(|| QuestionBankError::InvalidPoints {
                                prompt: raw.question.clone(),
                                points: raw.points,
                            })?;
                        Ok(Question {
                            category_name: category.name.clone(),
                            points,
                            prompt: raw.question,
                            answer: raw.answer,
                        })
                    })
                    .collect::<Result<Vec<_>, QuestionBankError>>()?;
                Ok(Category {
                    name: category.name,
                    questions,
                })
            })
            .collect::<Result<Vec<_>, QuestionBankError>>()?;

        Self::from_categories(categories)
    }

    /// Build a bank from already-typed categories, enforcing key uniqueness.
    pub fn from_categories(categories: Vec<Category>) -> Result<Self, QuestionBankError> {
        let mut index = HashMap::new();
        for (column, category) in categories.iter().enumerate() {
            for (row, question) in category.questions.iter().enumerate() {
                if index.insert(question.key(), (column, row)).is_some() {
                    return Err(QuestionBankError::DuplicateKey {
                        prompt: question.prompt.clone(),
                        points: question.points,
                    });
                }
            }
        }
        Ok(Self { categories, index })
    }

    /// Board columns in file order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Question identified by `key`, if present.
    pub fn lookup(&self, key: &PlayedKey) -> Option<&Question> {
        let (column, row) = *self.index.get(key)?;
        self.categories.get(column)?.questions.get(row)
    }

    /// Number of questions across all categories.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no bank was loaded.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
