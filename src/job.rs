use std::fmt;

use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const JOB_ID_LENGTH: usize = 8;

/// Short random token naming a job's staged file.
///
/// Some languages also use it as a type name (Java's public class must match
/// its file name), so the first character is always a letter. That keeps the
/// token a valid identifier in every registered language, not just a valid
/// file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Draws from the calling thread's RNG, so concurrent jobs never share
    /// generator state.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(JOB_ID_LENGTH);

        id.push(char::from(LETTERS[rng.random_range(0..LETTERS.len())]));
        id.extend(
            (&mut rng)
                .sample_iter(&rand::distr::Alphanumeric)
                .take(JOB_ID_LENGTH - 1)
                .map(char::from),
        );

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
