use crate::core::config::{Arc, Configuration};
use crate::core::error::PreconditionViolation;
use crate::core::sentence::ROOT;
use crate::core::transition::{Transition, TransitionSystem};

/// `SHIFT`, `LEFT_ARC(label)`, `RIGHT_ARC(label)` over a binary stack/buffer
/// configuration. Builds a tree bottom-up from the two topmost stack elements; never
/// produces a crossing arc, so a parse driven entirely by this system is always
/// projective.
pub struct ArcStandard;

impl ArcStandard {
    fn can_left_arc(config: &Configuration) -> bool {
        config.stack_len() >= 2 && config.stack_top(1) != Some(ROOT)
    }

    fn can_right_arc(config: &Configuration) -> bool {
        config.stack_len() >= 2
    }
}

impl TransitionSystem for ArcStandard {
    fn possible(&self, config: &Configuration) -> Vec<Transition> {
        let mut moves = Vec::new();

        if !config.buffer_is_empty() {
            moves.push(Transition::Shift);
        }
        if ArcStandard::can_left_arc(config) {
            moves.push(Transition::LeftArc(String::new()));
        }
        if ArcStandard::can_right_arc(config) {
            moves.push(Transition::RightArc(String::new()));
        }

        moves
    }

    fn apply(&self, transition: &Transition, config: &mut Configuration) -> Result<(), PreconditionViolation> {
        match transition {
            Transition::Shift => {
                if config.buffer_is_empty() {
                    return Err(PreconditionViolation {
                        message: "SHIFT with an empty buffer".to_string(),
                    });
                }
                config.shift();
                Ok(())
            }
            Transition::LeftArc(label) => {
                if !ArcStandard::can_left_arc(config) {
                    return Err(PreconditionViolation {
                        message: "LEFT_ARC with fewer than 2 stack elements or second-top is ROOT".to_string(),
                    });
                }
                let top = config.pop_stack().unwrap();
                let second = config.pop_stack().unwrap();
                config.attach(top, second, label.clone());
                config.push_stack(top);
                Ok(())
            }
            Transition::RightArc(label) => {
                if !ArcStandard::can_right_arc(config) {
                    return Err(PreconditionViolation {
                        message: "RIGHT_ARC with fewer than 2 stack elements".to_string(),
                    });
                }
                let top = config.pop_stack().unwrap();
                let second = config.stack_top(0).unwrap();
                config.attach(second, top, label.clone());
                Ok(())
            }
            Transition::Reduce => Err(PreconditionViolation {
                message: "REDUCE is not a valid arc-standard transition".to_string(),
            }),
        }
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.buffer_is_empty() && config.stack_len() == 1 && config.stack_top(0) == Some(ROOT)
    }

    fn oracle(&self, config: &Configuration, gold_arcs: &[Arc]) -> Option<Transition> {
        let top = config.stack_top(0)?;
        let second = config.stack_top(1);

        if let Some(second) = second {
            if second != ROOT {
                if let Some(gold) = gold_arcs.iter().find(|a| a.head == top && a.dependent == second) {
                    if all_dependents_attached(config, gold_arcs, second) {
                        return Some(Transition::LeftArc(gold.label.clone()));
                    }
                }
            }

            if let Some(gold) = gold_arcs.iter().find(|a| a.head == second && a.dependent == top) {
                if all_dependents_attached(config, gold_arcs, top) {
                    return Some(Transition::RightArc(gold.label.clone()));
                }
            }
        }

        if !config.buffer_is_empty() {
            Some(Transition::Shift)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        "arcstandard"
    }
}

/// True once every gold dependent of `index` has already been attached in `config`,
/// i.e. popping `index` off the stack now would not strand a future dependency.
fn all_dependents_attached(config: &Configuration, gold_arcs: &[Arc], index: usize) -> bool {
    gold_arcs
        .iter()
        .filter(|a| a.head == index)
        .all(|a| config.has_head(a.dependent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sentence::{Sentence, Token};
    use std::rc::Rc;

    fn sentence(forms: &[&str]) -> Rc<Sentence> {
        Rc::new(Sentence::new(forms.iter().map(|f| Token::new(*f)).collect()))
    }

    #[test]
    fn single_token_sentence_terminates_after_shift_and_right_arc() {
        let system = ArcStandard;
        let mut config = Configuration::new(sentence(&["bark"]));

        assert!(!system.is_terminal(&config));
        system.apply(&Transition::Shift, &mut config).unwrap();
        assert!(!system.is_terminal(&config));
        system.apply(&Transition::RightArc("root".to_string()), &mut config).unwrap();
        assert!(system.is_terminal(&config));

        assert_eq!(
            config.arcs(),
            &[Arc { head: 0, dependent: 1, label: "root".to_string() }]
        );
    }

    #[test]
    fn two_token_trace_yields_expected_arcs() {
        let system = ArcStandard;
        let mut config = Configuration::new(sentence(&["dogs", "bark"]));

        system.apply(&Transition::Shift, &mut config).unwrap();
        system.apply(&Transition::Shift, &mut config).unwrap();
        system.apply(&Transition::LeftArc("nsubj".to_string()), &mut config).unwrap();
        system.apply(&Transition::RightArc("root".to_string()), &mut config).unwrap();

        assert!(system.is_terminal(&config));
        assert_eq!(
            config.arcs(),
            &[
                Arc { head: 2, dependent: 1, label: "nsubj".to_string() },
                Arc { head: 0, dependent: 2, label: "root".to_string() },
            ]
        );
    }

    #[test]
    fn left_arc_is_illegal_when_second_top_is_root() {
        let system = ArcStandard;
        let config = Configuration::new(sentence(&["bark"]));

        assert!(!ArcStandard::can_left_arc(&config));
        assert!(!system.possible(&config).iter().any(|t| matches!(t, Transition::LeftArc(_))));
    }

    #[test]
    fn apply_rejects_illegal_transition() {
        let system = ArcStandard;
        let mut config = Configuration::new(sentence(&["bark"]));

        let err = system.apply(&Transition::RightArc(String::new()), &mut config).unwrap_err();
        assert!(err.message.contains("RIGHT_ARC"));
    }

    #[test]
    fn empty_sentence_is_already_terminal() {
        let system = ArcStandard;
        let config = Configuration::new(sentence(&[]));

        assert!(system.is_terminal(&config));
        assert!(config.arcs().is_empty());
    }

    #[test]
    fn oracle_replays_the_two_token_gold_derivation() {
        let system = ArcStandard;
        let mut config = Configuration::new(sentence(&["dogs", "bark"]));
        let gold = vec![
            Arc { head: 2, dependent: 1, label: "nsubj".to_string() },
            Arc { head: 0, dependent: 2, label: "root".to_string() },
        ];

        let mut steps = Vec::new();
        while !system.is_terminal(&config) {
            let t = system.oracle(&config, &gold).expect("oracle should always find a move");
            system.apply(&t, &mut config).unwrap();
            steps.push(t);
        }

        assert_eq!(config.arcs(), gold.as_slice());
        assert_eq!(
            steps,
            vec![
                Transition::Shift,
                Transition::Shift,
                Transition::LeftArc("nsubj".to_string()),
                Transition::RightArc("root".to_string()),
            ]
        );
    }
}
