use crate::core::config::{Arc, Configuration};
use crate::core::error::PreconditionViolation;
use crate::core::sentence::ROOT;
use crate::core::transition::{Transition, TransitionSystem};

/// `SHIFT`, `LEFT_ARC(label)`, `RIGHT_ARC(label)`, `REDUCE`. Attaches dependents as soon
/// as both sides are adjacent on the stack/buffer boundary rather than waiting for a
/// subtree to be fully built, which lets it commit to a head before all of that head's
/// own dependents are known (hence `REDUCE` to discard a stack top once it no longer
/// needs to receive more left dependents).
pub struct ArcEager;

impl ArcEager {
    fn can_left_arc(config: &Configuration) -> bool {
        config.stack_len() >= 1
            && !config.buffer_is_empty()
            && config.stack_top(0) != Some(ROOT)
            && !config.has_head(config.stack_top(0).unwrap())
    }

    fn can_right_arc(config: &Configuration) -> bool {
        config.stack_len() >= 1 && !config.buffer_is_empty()
    }

    fn can_reduce(config: &Configuration) -> bool {
        config.stack_len() >= 1 && config.has_head(config.stack_top(0).unwrap())
    }
}

impl TransitionSystem for ArcEager {
    fn possible(&self, config: &Configuration) -> Vec<Transition> {
        let mut moves = Vec::new();

        if !config.buffer_is_empty() {
            moves.push(Transition::Shift);
        }
        if ArcEager::can_left_arc(config) {
            moves.push(Transition::LeftArc(String::new()));
        }
        if ArcEager::can_right_arc(config) {
            moves.push(Transition::RightArc(String::new()));
        }
        if ArcEager::can_reduce(config) {
            moves.push(Transition::Reduce);
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
                if !ArcEager::can_left_arc(config) {
                    return Err(PreconditionViolation {
                        message: "LEFT_ARC requires a headless, non-ROOT stack top and a non-empty buffer".to_string(),
                    });
                }
                let top = config.pop_stack().unwrap();
                let front = config.buffer_front(0).unwrap();
                config.attach(front, top, label.clone());
                Ok(())
            }
            Transition::RightArc(label) => {
                if !ArcEager::can_right_arc(config) {
                    return Err(PreconditionViolation {
                        message: "RIGHT_ARC requires a non-empty stack and buffer".to_string(),
                    });
                }
                let top = config.stack_top(0).unwrap();
                let front = config.shift().unwrap();
                config.attach(top, front, label.clone());
                Ok(())
            }
            Transition::Reduce => {
                if !ArcEager::can_reduce(config) {
                    return Err(PreconditionViolation {
                        message: "REDUCE requires a stack top that already has a head".to_string(),
                    });
                }
                config.pop_stack();
                Ok(())
            }
        }
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.buffer_is_empty()
    }

    fn oracle(&self, config: &Configuration, gold_arcs: &[Arc]) -> Option<Transition> {
        let top = config.stack_top(0);
        let front = config.buffer_front(0)?;

        if let Some(top) = top {
            if top != ROOT {
                if let Some(gold) = gold_arcs.iter().find(|a| a.head == front && a.dependent == top) {
                    return Some(Transition::LeftArc(gold.label.clone()));
                }
            }

            if let Some(gold) = gold_arcs.iter().find(|a| a.head == top && a.dependent == front) {
                return Some(Transition::RightArc(gold.label.clone()));
            }

            if top != ROOT && ArcEager::can_reduce(config) {
                let stranded = gold_arcs
                    .iter()
                    .any(|a| a.head == front && a.dependent == top);
                let has_remaining_gold_child = gold_arcs
                    .iter()
                    .any(|a| a.head == top && !config.has_head(a.dependent));
                if !stranded && !has_remaining_gold_child {
                    return Some(Transition::Reduce);
                }
            }
        }

        Some(Transition::Shift)
    }

    fn name(&self) -> &'static str {
        "arceager"
    }
}
