use std::collections::{BTreeMap, HashMap};

use crate::core::config::Configuration;
use crate::core::feature::address::AddressTemplate;
use crate::core::feature::hash;

/// Accumulates `(bucket, weight)` writes for a single hashed feature vector. Additive:
/// two feature names that collide into the same bucket both contribute, rather than the
/// second silently overwriting the first -- that additive behavior is what makes hashed
/// collisions merely lossy rather than incorrect. Backed by a `BTreeMap` rather than a
/// `HashMap` so `iter()` always walks buckets in the same order: a model that sums over
/// this sink (see `guide::InMemoryModel::predict_sorted`) must produce a bit-identical
/// score across runs and threads, and `HashMap`'s randomized iteration order combined
/// with non-associative float addition would break that.
#[derive(Debug, Default, Clone)]
pub struct HashSink {
    weights: BTreeMap<usize, f32>,
}

impl HashSink {
    pub fn new() -> Self {
        HashSink { weights: BTreeMap::new() }
    }

    pub fn write(&mut self, bucket: usize, weight: f32) {
        *self.weights.entry(bucket).or_insert(0.0) += weight;
    }

    pub fn get(&self, bucket: usize) -> f32 {
        self.weights.get(&bucket).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.weights.iter().map(|(&bucket, &weight)| (bucket, weight))
    }
}

/// Something that turns a `Configuration` into features, either as a symbolic
/// string-keyed map (used for inspection/debugging, never by the hashing guide at
/// inference time) or as a hashed sparse vector.
pub trait FeatureGenerator {
    /// Maps every template's canonical feature name to its value (1.0 for the indicator
    /// features this crate produces).
    fn generate(&self, config: &Configuration) -> HashMap<String, f32>;

    /// For each template, hashes its feature name into `[0, kernel_size)` and writes
    /// `(bucket, 1.0)` into `sink`.
    fn generate_hashed(&self, config: &Configuration, kernel_size: usize, sink: &mut HashSink);
}

/// Routes both `generate` and `generate_hashed` to every child template, in the order
/// the templates were compiled (i.e. the order their lines appeared in the feature
/// template file).
pub struct AggregateGenerator {
    templates: Vec<AddressTemplate>,
}

impl AggregateGenerator {
    pub fn new(templates: Vec<AddressTemplate>) -> Self {
        AggregateGenerator { templates }
    }

    pub fn templates(&self) -> &[AddressTemplate] {
        &self.templates
    }
}

impl FeatureGenerator for AggregateGenerator {
    fn generate(&self, config: &Configuration) -> HashMap<String, f32> {
        let mut features = HashMap::new();
        for template in &self.templates {
            features.insert(template.feature_name(config), 1.0);
        }
        features
    }

    fn generate_hashed(&self, config: &Configuration, kernel_size: usize, sink: &mut HashSink) {
        for template in &self.templates {
            let name = template.feature_name(config);
            sink.write(hash::bucket(&name, kernel_size), 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sentence::{Sentence, Token};
    use std::rc::Rc;

    fn config_with_top(form: &str, tag: &str) -> Configuration {
        let sentence = Rc::new(Sentence::new(vec![Token::new(form).with_postag(tag)]));
        let mut config = Configuration::new(sentence);
        config.shift();
        config
    }

    #[test]
    fn generate_emits_one_entry_per_template() {
        let generator = AggregateGenerator::new(vec![
            AddressTemplate::parse("[STACK 0] TOKEN").unwrap(),
            AddressTemplate::parse("[STACK 0] TAG").unwrap(),
        ]);
        let config = config_with_top("dogs", "NNS");

        let features = generator.generate(&config);
        assert_eq!(features.len(), 2);
        assert!(features.values().all(|&v| v == 1.0));
    }

    #[test]
    fn hashed_collisions_accumulate_additively_in_the_same_bucket() {
        // a tiny kernel guarantees a collision between these two distinct templates.
        let generator = AggregateGenerator::new(vec![
            AddressTemplate::parse("[STACK 0] TOKEN").unwrap(),
            AddressTemplate::parse("[STACK 0] TAG").unwrap(),
        ]);
        let config = config_with_top("dogs", "NNS");

        let mut sink = HashSink::new();
        generator.generate_hashed(&config, 1, &mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(0), 2.0);
    }

    #[test]
    fn generate_hashed_stays_within_kernel_bounds() {
        let generator = AggregateGenerator::new(vec![
            AddressTemplate::parse("[STACK 0] TOKEN").unwrap(),
            AddressTemplate::parse("[STACK 0] TAG").unwrap(),
            AddressTemplate::parse("[STACK 0] DEPREL").unwrap(),
        ]);
        let config = config_with_top("dogs", "NNS");

        let mut sink = HashSink::new();
        generator.generate_hashed(&config, 16, &mut sink);

        for (bucket, _) in sink.iter() {
            assert!(bucket < 16);
        }
    }
}
