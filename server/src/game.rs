use shared::OBSCURED_CHAR;

/// Guess bookkeeping for a single game.
///
/// Every guessed character lands in exactly one of `hits` or `misses` and is
/// never reclassified, so repeated guesses cost nothing.
#[derive(Debug, Clone)]
pub struct GuessState {
    answer: Vec<char>,
    hits: Vec<char>,
    misses: Vec<char>,
    max_guesses: u32,
}

impl GuessState {
    pub fn new(answer: &str, max_guesses: u32) -> Self {
        Self {
            answer: answer.chars().collect(),
            hits: Vec::new(),
            misses: Vec::new(),
            max_guesses,
        }
    }

    /// Records a single character guess and returns whether it is in the answer.
    pub fn guess_char(&mut self, c: char) -> bool {
        if self.answer.contains(&c) {
            if !self.hits.contains(&c) {
                self.hits.push(c);
            }
            return true;
        }

        if !self.misses.contains(&c) {
            self.misses.push(c);
        }
        false
    }

    /// Guesses every character of `candidate` in order. No short-circuit on
    /// an early win or loss.
    pub fn reveal_word(&mut self, candidate: &str) {
        for c in candidate.chars() {
            self.guess_char(c);
        }
    }

    pub fn remaining_tries(&self) -> i32 {
        self.max_guesses as i32 - self.misses.len() as i32
    }

    pub fn obscured_answer(&self) -> String {
        self.answer
            .iter()
            .map(|c| {
                if self.hits.contains(c) {
                    *c
                } else {
                    OBSCURED_CHAR
                }
            })
            .collect()
    }

    pub fn is_won(&self) -> bool {
        !self.obscured_answer().contains(OBSCURED_CHAR)
    }

    pub fn is_lost(&self) -> bool {
        self.remaining_tries() <= 0 && !self.is_won()
    }

    pub fn hits(&self) -> &[char] {
        &self.hits
    }

    pub fn misses(&self) -> &[char] {
        &self.misses
    }
}
