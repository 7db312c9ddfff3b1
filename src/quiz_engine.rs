//! Deterministic quiz scoring.
//!
//! Answers are compared against `correctAnswer` after trimming surrounding
//! whitespace and lower-casing both sides. There is no partial credit and no
//! fuzzy matching. Unanswered questions count as incorrect.

use crate::models::{
    AnswerMap, AnswerStatus, OptionMark, OptionState, QuestionOutcome, QuizQuestion, QuizReport,
    ScoreResult,
};

/// The single normalization applied before comparing answers.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn answers_match(submitted: &str, expected: &str) -> bool {
    normalize_answer(submitted) == normalize_answer(expected)
}

/// Aggregate score. `total_count` is always `quizzes.len()`.
pub fn evaluate(quizzes: &[QuizQuestion], answers: &AnswerMap) -> ScoreResult {
    let correct_count = quizzes
        .iter()
        .filter(|q| {
            answers
                .get(&q.id)
                .is_some_and(|answer| answers_match(answer, &q.correct_answer))
        })
        .count();

    ScoreResult {
        correct_count,
        total_count: quizzes.len(),
    }
}

pub fn classify(question: &QuizQuestion, answers: &AnswerMap) -> AnswerStatus {
    match answers.get(&question.id) {
        None => AnswerStatus::Unanswered,
        Some(answer) if answers_match(answer, &question.correct_answer) => AnswerStatus::Correct,
        Some(_) => AnswerStatus::Incorrect,
    }
}

/// Per-question outcome, including option marks for choice-style kinds.
pub fn question_outcome(question: &QuizQuestion, answers: &AnswerMap) -> QuestionOutcome {
    let submitted = answers.get(&question.id);

    let (selected_option, options) = if question.kind.is_choice() {
        let selected_option = submitted.and_then(|answer| {
            // Prefer an exact option match, then fall back to the normalized form.
            question
                .options
                .iter()
                .position(|opt| opt == answer)
                .or_else(|| question.options.iter().position(|opt| answers_match(opt, answer)))
        });

        let marks = question
            .options
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let selected = selected_option == Some(i);
                let correct = answers_match(text, &question.correct_answer);
                let state = match (selected, correct) {
                    (true, true) => OptionState::SelectedCorrect,
                    (true, false) => OptionState::SelectedIncorrect,
                    (false, true) => OptionState::Correct,
                    (false, false) => OptionState::Neutral,
                };
                OptionMark {
                    text: text.clone(),
                    selected,
                    correct,
                    state,
                }
            })
            .collect();

        (selected_option, marks)
    } else {
        (None, Vec::new())
    };

    QuestionOutcome {
        question_id: question.id.clone(),
        kind: question.kind,
        status: classify(question, answers),
        submitted_answer: submitted.map(str::to_string),
        correct_answer: question.correct_answer.clone(),
        explanation: question.explanation.clone(),
        selected_option,
        options,
    }
}

/// Score plus per-question outcomes, in quiz order.
pub fn grade(quizzes: &[QuizQuestion], answers: &AnswerMap) -> QuizReport {
    let score = evaluate(quizzes, answers);
    QuizReport {
        score,
        percentage: score.percentage(),
        feedback: score.feedback().to_string(),
        outcomes: quizzes
            .iter()
            .map(|q| question_outcome(q, answers))
            .collect(),
    }
}
