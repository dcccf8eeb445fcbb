use std::rc::Rc;

use crate::core::config::Configuration;
use crate::core::error::{ModelLoadError, NoLegalTransition, ParseError};
use crate::core::feature::generator::{FeatureGenerator, HashSink};
use crate::core::sentence::Sentence;
use crate::core::transition::label::LabelNumberer;
use crate::core::transition::{Transition, TransitionSystem};

/// The external linear-model boundary: given a hashed feature vector, return every
/// transition id the model knows about, ranked from highest to lowest score. Training
/// and the dot-product engine behind a real implementation of this trait are out of
/// scope here; this crate only needs somewhere to plug a trained model in and a
/// reference implementation to exercise the rest of the pipeline against.
pub trait Model {
    fn predict_sorted(&self, features: &HashSink) -> Vec<usize>;
}

/// A dense per-label weight table keyed by hashed bucket: `score(label) = sum of
/// weights[label][bucket] * value for every (bucket, value) the sink holds`. Adequate
/// for tests and for driving the CLI end-to-end; never trained on real data, so its
/// predictions carry no linguistic meaning.
pub struct InMemoryModel {
    kernel_size: usize,
    weights: Vec<Vec<f32>>,
}

impl InMemoryModel {
    /// `weights[label][bucket]`; every row must have length `kernel_size`.
    pub fn new(kernel_size: usize, weights: Vec<Vec<f32>>) -> Result<Self, ModelLoadError> {
        if weights.iter().any(|row| row.len() != kernel_size) {
            return Err(ModelLoadError {
                message: format!("every weight row must have length {}", kernel_size),
            });
        }
        Ok(InMemoryModel { kernel_size, weights })
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn num_labels(&self) -> usize {
        self.weights.len()
    }

    /// Loads the reference text model format: a header line `kernel_size num_labels`
    /// followed by one line per label of `kernel_size` space-separated weights. This is
    /// this crate's own bundled format, not any external model's -- a trained,
    /// production-grade model file is explicitly out of scope.
    pub fn load(text: &str) -> Result<Self, ModelLoadError> {
        let mut lines = text.lines();

        let header = lines.next().ok_or_else(|| ModelLoadError {
            message: "empty model file".to_string(),
        })?;
        let mut header_fields = header.split_whitespace();
        let kernel_size: usize = header_fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| ModelLoadError { message: "missing or invalid kernel_size in header".to_string() })?;
        let num_labels: usize = header_fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| ModelLoadError { message: "missing or invalid num_labels in header".to_string() })?;

        let mut weights = Vec::with_capacity(num_labels);
        for line in lines.by_ref().take(num_labels) {
            let row: Result<Vec<f32>, _> = line.split_whitespace().map(|f| f.parse::<f32>()).collect();
            let row = row.map_err(|err| ModelLoadError { message: format!("invalid weight: {}", err) })?;
            weights.push(row);
        }

        if weights.len() != num_labels {
            return Err(ModelLoadError {
                message: format!("expected {} weight rows, found {}", num_labels, weights.len()),
            });
        }

        InMemoryModel::new(kernel_size, weights)
    }
}

impl Model for InMemoryModel {
    fn predict_sorted(&self, features: &HashSink) -> Vec<usize> {
        let mut scored: Vec<(usize, f32)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(label, row)| {
                let score = features.iter().map(|(bucket, value)| row[bucket] * value).sum();
                (label, score)
            })
            .collect();

        // Highest score first; ties broken by lowest label id, matching the
        // LabelNumberer-consistent total order the guide's caller relies on.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.into_iter().map(|(label, _)| label).collect()
    }
}

/// Wires a feature generator, a hash kernel, a `LabelNumberer`, and a `Model` together
/// into `best_transition`: the one operation the greedy parser loop needs.
pub struct HashingGuide<G: FeatureGenerator, M: Model> {
    generator: G,
    numberer: LabelNumberer,
    model: M,
    kernel_size: usize,
}

impl<G: FeatureGenerator, M: Model> HashingGuide<G, M> {
    pub fn new(generator: G, numberer: LabelNumberer, model: M, kernel_size: usize) -> Self {
        HashingGuide { generator, numberer, model, kernel_size }
    }

    /// Scores every transition known to the model and returns the first one that is
    /// legal in `config`. The system's `possible(config)` set is the source of legality;
    /// the model is only ever consulted for its ranking, never to invent new moves.
    pub fn best_transition(
        &self,
        config: &Configuration,
        system: &dyn TransitionSystem,
    ) -> Result<Transition, NoLegalTransition> {
        let mut sink = HashSink::new();
        self.generator.generate_hashed(config, self.kernel_size, &mut sink);

        let ranked = self.model.predict_sorted(&sink);
        let legal = system.possible(config);

        for id in ranked {
            if let Some(candidate) = self.numberer.transition_for(id) {
                if legal.iter().any(|t| transitions_match(t, &candidate)) {
                    return Ok(candidate);
                }
            }
        }

        Err(NoLegalTransition)
    }
}

/// `possible(config)` yields transitions with placeholder (empty-string) labels for
/// LEFT_ARC/RIGHT_ARC -- the label itself is the model's concern, not the transition
/// system's -- so matching against the model's ranked candidate must ignore the label.
/// The candidate itself (not the placeholder from `legal`) carries the model's label
/// and is what gets applied.
fn transitions_match(system_shape: &Transition, candidate: &Transition) -> bool {
    match (system_shape, candidate) {
        (Transition::Shift, Transition::Shift) => true,
        (Transition::Reduce, Transition::Reduce) => true,
        (Transition::LeftArc(_), Transition::LeftArc(_)) => true,
        (Transition::RightArc(_), Transition::RightArc(_)) => true,
        _ => false,
    }
}

/// The greedy inference loop: repeatedly ask the guide for the best transition and
/// apply it until the configuration is terminal, returning the finished arc set.
pub fn parse(
    sentence: Rc<Sentence>,
    system: &dyn TransitionSystem,
    guide: &HashingGuide<impl FeatureGenerator, impl Model>,
) -> Result<Vec<crate::core::config::Arc>, ParseError> {
    let mut config = Configuration::new(sentence);

    while !system.is_terminal(&config) {
        let transition = guide.best_transition(&config, system)?;
        system.apply(&transition, &mut config)?;
    }

    Ok(config.into_arcs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::address::AddressTemplate;
    use crate::core::feature::generator::AggregateGenerator;
    use crate::core::sentence::Token;
    use crate::core::transition::arc_standard::ArcStandard;

    fn numberer() -> LabelNumberer {
        LabelNumberer::from_descriptors(
            vec!["SHIFT", "LEFT_ARC(nsubj)", "RIGHT_ARC(root)"].into_iter(),
        )
    }

    fn generator() -> AggregateGenerator {
        AggregateGenerator::new(vec![AddressTemplate::parse("[STACK 0] TOKEN").unwrap()])
    }

    #[test]
    fn empty_sentence_parses_to_no_arcs() {
        let system = ArcStandard;
        let model = InMemoryModel::new(4, vec![vec![0.0; 4]; 3]).unwrap();
        let guide = HashingGuide::new(generator(), numberer(), model, 4);

        let sentence = Rc::new(Sentence::new(vec![]));
        let arcs = parse(sentence, &system, &guide).unwrap();

        assert!(arcs.is_empty());
    }

    #[test]
    fn single_token_sentence_shifts_then_right_arcs() {
        let system = ArcStandard;
        // Heavily prefer RIGHT_ARC (label id 2) whenever it is legal, else SHIFT (id 0).
        let model = InMemoryModel::new(
            4,
            vec![
                vec![1.0, 1.0, 1.0, 1.0], // SHIFT
                vec![0.0, 0.0, 0.0, 0.0], // LEFT_ARC(nsubj)
                vec![2.0, 2.0, 2.0, 2.0], // RIGHT_ARC(root)
            ],
        )
        .unwrap();
        let guide = HashingGuide::new(generator(), numberer(), model, 4);

        let sentence = Rc::new(Sentence::new(vec![Token::new("bark")]));
        let arcs = parse(sentence, &system, &guide).unwrap();

        assert_eq!(
            arcs,
            vec![crate::core::config::Arc { head: 0, dependent: 1, label: "root".to_string() }]
        );
    }

    #[test]
    fn illegal_top_ranked_transition_falls_through_to_the_next_legal_one() {
        let system = ArcStandard;
        // RIGHT_ARC ranks highest but is illegal with only one stack element (ROOT);
        // the guide must fall through to SHIFT.
        let model = InMemoryModel::new(
            4,
            vec![
                vec![1.0, 1.0, 1.0, 1.0],
                vec![0.0, 0.0, 0.0, 0.0],
                vec![5.0, 5.0, 5.0, 5.0],
            ],
        )
        .unwrap();
        let guide = HashingGuide::new(generator(), numberer(), model, 4);
        let config = Configuration::new(Rc::new(Sentence::new(vec![Token::new("bark")])));

        let chosen = guide.best_transition(&config, &system).unwrap();
        assert_eq!(chosen, Transition::Shift);
    }

    #[test]
    fn load_parses_the_reference_text_model_format() {
        let text = "2 3\n1.0 2.0\n3.0 4.0\n5.0 6.0\n";
        let model = InMemoryModel::load(text).unwrap();

        assert_eq!(model.kernel_size(), 2);
        assert_eq!(model.num_labels(), 3);
    }

    #[test]
    fn load_rejects_a_row_count_mismatch() {
        let text = "2 3\n1.0 2.0\n3.0 4.0\n";
        let err = InMemoryModel::load(text).unwrap_err();
        assert!(err.message.contains("expected 3"));
    }

    #[test]
    fn no_legal_transition_among_ranked_candidates_is_an_error() {
        // A numberer that only knows REDUCE, which arc-standard never admits.
        let numberer = LabelNumberer::from_descriptors(vec!["REDUCE"].into_iter());
        let model = InMemoryModel::new(4, vec![vec![1.0; 4]]).unwrap();
        let guide = HashingGuide::new(generator(), numberer, model, 4);

        let system = ArcStandard;
        let config = Configuration::new(Rc::new(Sentence::new(vec![Token::new("bark")])));

        let err = guide.best_transition(&config, &system).unwrap_err();
        assert_eq!(err, NoLegalTransition);
    }
}
