use serde::Serialize;

/// A question counts as correct only when the chosen options equal the
/// correct options exactly. Order is ignored; there is no partial credit.
pub fn answers_match(student_answer: &[i64], correct_answers: &[i64]) -> bool {
    let mut student = student_answer.to_vec();
    let mut correct = correct_answers.to_vec();
    student.sort_unstable();
    correct.sort_unstable();
    student == correct
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    pub right_answer: u32,
    pub wrong_answer: u32,
}

impl ScoreTally {
    pub fn record(&mut self, is_correct: bool) {
        match is_correct {
            true => self.right_answer += 1,
            false => self.wrong_answer += 1,
        }
    }
}
