//! The quiz-taking state machine. Pure and seedable: no I/O, no clock
//! other than the start timestamp, so an attempt can be replayed exactly.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use ulid::Ulid;

use crate::models::{
    Answer, AnsweredQuestion, Question, QuestionType, QuizDocument, QuizLocation, QuizMode,
    QuizSession, Score, UserAnswer,
};

/// A question tagged with its position in the stored document. The Vec
/// order is the presentation order; the tag is the canonical identity.
#[derive(Debug, Clone)]
pub struct PlayQuestion {
    pub original_index: usize,
    pub question: Question,
}

/// An answer tagged with its position in the stored question.
#[derive(Debug, Clone)]
pub struct PlayAnswer {
    pub original_index: usize,
    pub answer: Answer,
}

/// The question currently on screen, answers in presentation order.
#[derive(Debug)]
pub struct CurrentQuestion<'a> {
    pub number: usize,
    pub total: usize,
    pub original_index: usize,
    pub text: &'a str,
    pub question_type: QuestionType,
    pub answers: &'a [PlayAnswer],
}

/// Outcome of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    /// Drawn from the first wrong selected answer, or else the first
    /// selected answer. Empty when nothing was selected.
    pub comment: String,
    pub advance_delay: Duration,
}

/// One attempt at a quiz, from the shuffled deal to the history record.
pub struct PlaySession {
    location: QuizLocation,
    user: String,
    mode: QuizMode,
    started_at: DateTime<Utc>,
    rng: StdRng,
    play_questions: Vec<PlayQuestion>,
    current: usize,
    current_answers: Vec<PlayAnswer>,
    answers: Vec<UserAnswer>,
    recorded: bool,
}

impl PlaySession {
    /// Deal a new attempt from `seed`: shuffle the tagged questions, then
    /// truncate to the pool's per-game count when the document carries one.
    /// Every attempt gets a fresh order and, when pooled, a fresh subset.
    pub fn new(
        doc: &QuizDocument,
        location: QuizLocation,
        user: impl Into<String>,
        mode: QuizMode,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut play_questions: Vec<PlayQuestion> = doc
            .questions
            .iter()
            .cloned()
            .enumerate()
            .map(|(original_index, question)| PlayQuestion {
                original_index,
                question,
            })
            .collect();
        play_questions.shuffle(&mut rng);

        if let Some(pool) = &doc.pool_config {
            let per_game = (pool.questions_per_game as usize).min(play_questions.len());
            play_questions.truncate(per_game);
        }

        let mut session = Self {
            location,
            user: user.into(),
            mode,
            started_at: Utc::now(),
            rng,
            play_questions,
            current: 0,
            current_answers: Vec::new(),
            answers: Vec::new(),
            recorded: false,
        };
        session.deal_answers();
        session
    }

    /// Deal a new attempt from entropy.
    pub fn start(
        doc: &QuizDocument,
        location: QuizLocation,
        user: impl Into<String>,
        mode: QuizMode,
    ) -> Self {
        Self::new(doc, location, user, mode, rand::random::<u64>())
    }

    pub fn current(&self) -> Option<CurrentQuestion<'_>> {
        let play_question = self.play_questions.get(self.current)?;
        Some(CurrentQuestion {
            number: self.current + 1,
            total: self.play_questions.len(),
            original_index: play_question.original_index,
            text: &play_question.question.text,
            question_type: play_question.question.question_type,
            answers: &self.current_answers,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.play_questions.len()
    }

    /// Grade a submission against the current question and advance.
    /// `selected` holds presentation-order indices; they are mapped back to
    /// original indices through the tags, and the submission is correct iff
    /// that set equals the set of correct original indices exactly. Extra
    /// picks invalidate as much as missing ones. Returns `None` once the
    /// attempt is complete.
    pub fn submit(&mut self, selected: &[usize]) -> Option<Feedback> {
        let play_question = self.play_questions.get(self.current)?;

        let mut selected_original = BTreeSet::new();
        let mut first_selected_comment: Option<&str> = None;
        let mut first_wrong_comment: Option<&str> = None;

        for &index in selected {
            let Some(play_answer) = self.current_answers.get(index) else {
                continue;
            };
            if !selected_original.insert(play_answer.original_index) {
                continue;
            }
            if first_selected_comment.is_none() {
                first_selected_comment = Some(&play_answer.answer.comment);
            }
            if first_wrong_comment.is_none() && !play_answer.answer.correct {
                first_wrong_comment = Some(&play_answer.answer.comment);
            }
        }

        let correct_original: BTreeSet<usize> = play_question
            .question
            .answers
            .iter()
            .enumerate()
            .filter(|(_, answer)| answer.correct)
            .map(|(index, _)| index)
            .collect();

        let correct = selected_original == correct_original;
        let comment = first_wrong_comment
            .or(first_selected_comment)
            .unwrap_or_default()
            .to_string();
        let original_question_index = play_question.original_index;

        self.answers.push(UserAnswer {
            original_question_index,
            selected_answer_indices: selected_original,
            correct,
        });

        self.current += 1;
        self.deal_answers();

        Some(Feedback {
            correct,
            comment,
            advance_delay: self.mode.advance_delay(),
        })
    }

    /// Build the history record. Yields `Some` exactly once, after the last
    /// question was answered; earlier calls and duplicate completion
    /// triggers get `None`.
    pub fn finish(&mut self) -> Option<QuizSession> {
        if self.recorded || !self.is_complete() {
            return None;
        }
        self.recorded = true;

        let answered_questions = self
            .play_questions
            .iter()
            .zip(&self.answers)
            .map(|(play_question, user_answer)| {
                let question = &play_question.question;
                let user_answer_texts = question
                    .answers
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| user_answer.selected_answer_indices.contains(index))
                    .map(|(_, answer)| answer.text.clone())
                    .collect();
                let correct_answer_texts = question
                    .answers
                    .iter()
                    .filter(|answer| answer.correct)
                    .map(|answer| answer.text.clone())
                    .collect();

                AnsweredQuestion {
                    question_text: question.text.clone(),
                    question_type: question.question_type,
                    user_answer_texts,
                    correct_answer_texts,
                    correct: user_answer.correct,
                    original_index: play_question.original_index,
                }
            })
            .collect();

        let correct = self.answers.iter().filter(|answer| answer.correct).count() as u32;
        let total = self.play_questions.len() as u32;
        let duration_seconds = (Utc::now() - self.started_at).num_seconds().max(0) as u64;

        Some(QuizSession {
            id: Ulid::new().to_string(),
            user: self.user.clone(),
            started_at: self.started_at,
            quiz_location: self.location.clone(),
            mode: self.mode,
            duration_seconds,
            answered_questions,
            score: Score::new(correct, total),
        })
    }

    /// The dealt questions in presentation order.
    pub fn play_questions(&self) -> &[PlayQuestion] {
        &self.play_questions
    }

    /// Freshly shuffled answers for whichever question is now current.
    fn deal_answers(&mut self) {
        self.current_answers = match self.play_questions.get(self.current) {
            Some(play_question) => {
                let mut answers: Vec<PlayAnswer> = play_question
                    .question
                    .answers
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(original_index, answer)| PlayAnswer {
                        original_index,
                        answer,
                    })
                    .collect();
                answers.shuffle(&mut self.rng);
                answers
            }
            None => Vec::new(),
        };
    }
}
