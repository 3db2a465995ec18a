use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_ID_LEN: usize = 7;

pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Short random ids drawn from `[0-9A-Za-z]`.
#[derive(Debug, Clone)]
pub struct RandomId {
    len: usize,
}

impl RandomId {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomId {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LEN)
    }
}

impl IdGenerator for RandomId {
    fn new_id(&self) -> String {
        let mut rng = rand::rng();
        (0..self.len)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
