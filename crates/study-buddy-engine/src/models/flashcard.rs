use serde::{Deserialize, Serialize};

/// A question/answer pair extracted from generated quiz text.
///
/// Flashcards are derived state; they are never written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

enum Field {
    Question,
    Answer,
}

const QUESTION_PREFIXES: &[&str] = &["q:", "question:"];
const ANSWER_PREFIXES: &[&str] = &["a:", "answer:"];

/// Parses `Q: ... / A: ...` pairs out of free-form model output.
///
/// Prefixes are matched case-insensitively after list markers and bold
/// markers are stripped. Lines that follow a question or answer without a
/// prefix of their own are appended to it. A question with no answer is
/// dropped, as is any text before the first question.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut question = String::new();
    let mut answer = String::new();
    let mut current: Option<Field> = None;

    let mut flush = |question: &mut String, answer: &mut String| {
        if !question.is_empty() && !answer.is_empty() {
            cards.push(Flashcard {
                question: std::mem::take(question),
                answer: std::mem::take(answer),
            });
        }
        question.clear();
        answer.clear();
    };

    for raw in text.lines() {
        let line = strip_markers(raw);
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = strip_any_prefix(line, QUESTION_PREFIXES) {
            flush(&mut question, &mut answer);
            question.push_str(rest);
            current = Some(Field::Question);
        } else if let Some(rest) = strip_any_prefix(line, ANSWER_PREFIXES) {
            if current.is_some() {
                answer.clear();
                answer.push_str(rest);
                current = Some(Field::Answer);
            }
        } else {
            let target = match current {
                Some(Field::Question) => &mut question,
                Some(Field::Answer) => &mut answer,
                None => continue,
            };
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(line);
        }
    }
    flush(&mut question, &mut answer);
    cards
}

fn strip_markers(line: &str) -> &str {
    let line = line.trim();
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let line = match line[digits..].strip_prefix(['.', ')']) {
        Some(rest) if digits > 0 => rest,
        _ => line,
    };
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    line.trim().trim_matches('*').trim()
}

fn strip_any_prefix<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let head = line.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix)
            .then(|| line[prefix.len()..].trim_start_matches('*').trim())
    })
}
