use crate::core::transition::Transition;
use crate::core::util::encoder::Encoder;

/// The persisted form of a transitions file is just its line order: line 0 is id 0, line
/// 1 is id 1, and so on. `LabelNumberer` wraps an `Encoder<String>` over transition
/// descriptors to give that order a queryable bijection, read-only once loaded.
pub struct LabelNumberer {
    encoder: Encoder<String>,
}

impl LabelNumberer {
    /// Builds a numberer from transition descriptors in file order. Descriptors that
    /// fail to parse are skipped rather than treated as fatal -- a transitions file is
    /// expected to be generated alongside its model, so a garbled line most likely means
    /// a stray blank or comment, not a corrupt descriptor the numberer must reject.
    pub fn from_descriptors<'a>(lines: impl Iterator<Item = &'a str>) -> LabelNumberer {
        let mut encoder = Encoder::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if Transition::parse_descriptor(line).is_some() {
                encoder.encode(&line.to_string());
            }
        }
        LabelNumberer { encoder }
    }

    pub fn id_for(&self, transition: &Transition) -> Option<usize> {
        self.encoder.get(&transition.descriptor())
    }

    pub fn transition_for(&self, id: usize) -> Option<Transition> {
        self.encoder.decode(id).and_then(|d| Transition::parse_descriptor(d))
    }

    pub fn len(&self) -> usize {
        self.encoder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }
}
