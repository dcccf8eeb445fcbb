use std::collections::HashMap;
use std::hash::Hash;

/// A bijection between values of `T` and dense `usize` ids, assigned in first-seen order.
///
/// Used to back the parser's `LabelNumberer`: transition descriptors are encoded once
/// (at load time, from a transitions file) and decoded many times (once per parser step).
pub struct Encoder<T: Eq + Hash + Clone> {
    encoder: HashMap<T, usize>,
    decoder: Vec<T>,
}

impl<T: Eq + Hash + Clone> Encoder<T> {
    pub fn new() -> Self {
        Encoder {
            encoder: HashMap::new(),
            decoder: Vec::new(),
        }
    }

    /// Encodes `val`, assigning it the next free id if it hasn't been seen before.
    pub fn encode(&mut self, val: &T) -> usize {
        if let Some(&id) = self.encoder.get(val) {
            id
        } else {
            let id = self.decoder.len();
            self.decoder.push(val.clone());
            self.encoder.insert(val.clone(), id);
            id
        }
    }

    pub fn decode(&self, id: usize) -> Option<&T> {
        self.decoder.get(id)
    }

    pub fn get(&self, val: &T) -> Option<usize> {
        self.encoder.get(val).cloned()
    }

    pub fn len(&self) -> usize {
        self.decoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoder.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_assigns_dense_ids_in_first_seen_order() {
        let mut enc: Encoder<String> = Encoder::new();

        let a = enc.encode(&"a".to_string());
        let b = enc.encode(&"b".to_string());
        let a_again = enc.encode(&"a".to_string());

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a_again, 0);
        assert_eq!(enc.len(), 2);
    }

    #[test]
    fn decode_recovers_original_value() {
        let mut enc: Encoder<String> = Encoder::new();
        let id = enc.encode(&"shift".to_string());

        assert_eq!(enc.decode(id), Some(&"shift".to_string()));
        assert_eq!(enc.decode(id + 1), None);
    }
}
