extern crate depparse;

use std::io::Cursor;
use std::rc::Rc;

use depparse::{
    parse, AddressTemplate, AggregateGenerator, ArcStandard, Configuration, HashingGuide,
    InMemoryModel, LabelNumberer, Sentence, Token, Transition, TransitionSystem,
};

fn templates() -> AggregateGenerator {
    AggregateGenerator::new(vec![
        AddressTemplate::parse("[STACK 0] TOKEN").unwrap(),
        AddressTemplate::parse("[BUFFER 0] TOKEN").unwrap(),
    ])
}

fn numberer() -> LabelNumberer {
    LabelNumberer::from_descriptors(vec!["SHIFT", "RIGHT_ARC(root)"].into_iter())
}

/// Any weights at all drive this model -- the single-token sentence below admits exactly
/// one legal transition at each step, so the greedy guide's choice is forced regardless
/// of ranking.
fn arbitrary_model() -> InMemoryModel {
    InMemoryModel::new(4, vec![vec![0.1, 0.2, 0.3, 0.4], vec![0.4, 0.3, 0.2, 0.1]]).unwrap()
}

#[test]
fn single_token_sentence_parses_via_the_full_guide_and_round_trips_through_conllx() {
    let system = ArcStandard;
    let guide = HashingGuide::new(templates(), numberer(), arbitrary_model(), 4);

    let mut sentence = Sentence::new(vec![Token::new("bark")]);
    let arcs = parse(Rc::new(sentence.clone()), &system, &guide).unwrap();
    sentence.apply_arcs(&arcs);

    assert_eq!(sentence.token(1).unwrap().head, Some(0));
    assert_eq!(sentence.token(1).unwrap().deprel.as_deref(), Some("root"));

    let mut output = Vec::new();
    depparse::conllx::write_sentences(&mut output, &[sentence]).unwrap();
    let output = String::from_utf8(output).unwrap();

    let round_tripped = depparse::conllx::read_sentences(Cursor::new(output)).unwrap();
    assert_eq!(round_tripped[0].token(1).unwrap().head, Some(0));
    assert_eq!(round_tripped[0].token(1).unwrap().deprel.as_deref(), Some("root"));
}

#[test]
fn two_token_arc_standard_trace_round_trips_through_conllx() {
    let system = ArcStandard;
    let sentence = Rc::new(Sentence::new(vec![Token::new("dogs"), Token::new("bark")]));
    let mut config = Configuration::new(sentence);

    for t in [
        Transition::Shift,
        Transition::Shift,
        Transition::LeftArc("nsubj".to_string()),
        Transition::RightArc("root".to_string()),
    ] {
        system.apply(&t, &mut config).unwrap();
    }
    assert!(system.is_terminal(&config));

    let arcs = config.into_arcs();
    let mut sentence = Sentence::new(vec![Token::new("dogs"), Token::new("bark")]);
    sentence.apply_arcs(&arcs);

    let mut output = Vec::new();
    depparse::conllx::write_sentences(&mut output, &[sentence]).unwrap();
    let output = String::from_utf8(output).unwrap();

    let round_tripped = depparse::conllx::read_sentences(Cursor::new(output)).unwrap();
    assert_eq!(round_tripped[0].token(1).unwrap().head, Some(2));
    assert_eq!(round_tripped[0].token(1).unwrap().deprel.as_deref(), Some("nsubj"));
    assert_eq!(round_tripped[0].token(2).unwrap().head, Some(0));
    assert_eq!(round_tripped[0].token(2).unwrap().deprel.as_deref(), Some("root"));
}

#[test]
fn empty_sentence_is_already_terminal_end_to_end() {
    let system = ArcStandard;
    let guide = HashingGuide::new(templates(), numberer(), arbitrary_model(), 4);

    let arcs = parse(Rc::new(Sentence::new(vec![])), &system, &guide).unwrap();
    assert!(arcs.is_empty());

    let mut output = Vec::new();
    depparse::conllx::write_sentences(&mut output, &[Sentence::new(vec![])]).unwrap();
    assert!(depparse::conllx::read_sentences(Cursor::new(output)).unwrap().is_empty());
}

#[test]
fn out_of_range_stack_address_resolves_to_absent_not_an_error() {
    let template = AddressTemplate::parse("[STACK 99] TOKEN").unwrap();
    let system = ArcStandard;
    let config = Configuration::new(Rc::new(Sentence::new(vec![Token::new("cat")])));

    assert_eq!(template.evaluate(&config), depparse::ABSENT);
    assert!(!system.possible(&config).is_empty());
}

#[test]
fn bare_feature_templates_compile_and_read_back_from_a_template_file() {
    let text = "addr [STACK 0] TOKEN\naddr [BUFFER 0,LDEP 0] TAG\n";
    let templates = depparse::parse_template_file(text).unwrap();
    let generator = AggregateGenerator::new(templates);

    let config = Configuration::new(Rc::new(Sentence::new(vec![Token::new("cat")])));
    let features = depparse::FeatureGenerator::generate(&generator, &config);

    assert_eq!(features.len(), 2);
}
