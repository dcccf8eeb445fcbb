use std::rc::Rc;

use crate::core::sentence::{Sentence, ROOT};

/// A head -> dependent edge with a relation label. `head`/`dependent` are sentence
/// indices (0 denotes ROOT as a head, never as a dependent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    pub head: usize,
    pub dependent: usize,
    pub label: String,
}

/// The mutable state of a single parse: stack, buffer, arcs decided so far, and the
/// `ldeps`/`rdeps` indices the feature DSL addresses. Created once per sentence via
/// `Configuration::new`, mutated exclusively through `attach`/`push`/`pop` by a
/// `TransitionSystem::apply` implementation, and dropped at the end of the parse (or
/// reset and reused by a pooled worker -- see `Configuration::reset`).
pub struct Configuration {
    sentence: Rc<Sentence>,
    stack: Vec<usize>,
    buffer: Vec<usize>,
    arcs: Vec<Arc>,
    has_head: Vec<bool>,
    /// `ldeps[i]` / `rdeps[i]` hold the left/right dependents currently attached to
    /// token `i`, in attachment order (outermost first, matching arc-standard's
    /// build-from-the-edges-in shape).
    ldeps: Vec<Vec<usize>>,
    rdeps: Vec<Vec<usize>>,
}

impl Configuration {
    pub fn new(sentence: Rc<Sentence>) -> Self {
        let n = sentence.len();
        let buffer: Vec<usize> = (1..=n).rev().collect();
        Configuration {
            sentence,
            stack: vec![ROOT],
            buffer,
            arcs: Vec::new(),
            has_head: vec![false; n + 1],
            ldeps: vec![Vec::new(); n + 1],
            rdeps: vec![Vec::new(); n + 1],
        }
    }

    /// Re-initializes this configuration for `sentence`, reusing the existing
    /// allocations. The primary performance lever for pooled per-worker reuse.
    pub fn reset(&mut self, sentence: Rc<Sentence>) {
        let n = sentence.len();

        self.stack.clear();
        self.stack.push(ROOT);

        self.buffer.clear();
        self.buffer.extend((1..=n).rev());

        self.arcs.clear();

        self.has_head.clear();
        self.has_head.resize(n + 1, false);

        self.ldeps.clear();
        self.ldeps.resize(n + 1, Vec::new());

        self.rdeps.clear();
        self.rdeps.resize(n + 1, Vec::new());

        self.sentence = sentence;
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn into_arcs(self) -> Vec<Arc> {
        self.arcs
    }

    /// `k`-th element from the top of the stack (0 = top). `None` if out of range.
    pub fn stack_top(&self, k: usize) -> Option<usize> {
        let len = self.stack.len();
        if k >= len {
            None
        } else {
            Some(self.stack[len - 1 - k])
        }
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// `k`-th element from the front of the buffer (0 = next to be shifted).
    pub fn buffer_front(&self, k: usize) -> Option<usize> {
        let len = self.buffer.len();
        if k >= len {
            None
        } else {
            Some(self.buffer[len - 1 - k])
        }
    }

    pub fn buffer_is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn has_head(&self, index: usize) -> bool {
        index == ROOT || self.has_head.get(index).copied().unwrap_or(false)
    }

    pub fn push_stack(&mut self, index: usize) {
        self.stack.push(index);
    }

    pub fn pop_stack(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    pub fn shift(&mut self) -> Option<usize> {
        let index = self.buffer.pop()?;
        self.stack.push(index);
        Some(index)
    }

    /// Records `head -> dependent` with `label`, updating `dependent`'s head flag and
    /// `head`'s `ldeps`/`rdeps`. Panics if `dependent` already has a head: that is a
    /// single-head invariant violation and always indicates a bug in the calling
    /// transition system, never a property of the input.
    pub fn attach(&mut self, head: usize, dependent: usize, label: String) {
        assert!(
            !self.has_head(dependent),
            "dependent {} already has a head",
            dependent
        );

        if dependent < head {
            self.ldeps[head].push(dependent);
        } else {
            self.rdeps[head].push(dependent);
        }

        if dependent != ROOT {
            self.has_head[dependent] = true;
        }

        self.arcs.push(Arc { head, dependent, label });
    }

    /// `k`-th leftmost dependent of `index`, outer-in (k=0 is the one attached
    /// furthest from `index`, i.e. the first one pushed).
    pub fn ldep(&self, index: usize, k: usize) -> Option<usize> {
        self.ldeps.get(index).and_then(|deps| deps.get(k)).copied()
    }

    /// `k`-th rightmost dependent of `index`, outer-in (k=0 is the one attached
    /// furthest from `index`, i.e. the last one pushed).
    pub fn rdep(&self, index: usize, k: usize) -> Option<usize> {
        self.rdeps
            .get(index)
            .and_then(|deps| deps.iter().rev().nth(k))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sentence::Token;

    fn two_token_sentence() -> Rc<Sentence> {
        Rc::new(Sentence::new(vec![Token::new("dogs"), Token::new("bark")]))
    }

    #[test]
    fn new_configuration_has_canonical_initial_shape() {
        let config = Configuration::new(two_token_sentence());

        assert_eq!(config.stack_top(0), Some(ROOT));
        assert_eq!(config.stack_len(), 1);
        assert_eq!(config.buffer_front(0), Some(1));
        assert_eq!(config.buffer_front(1), Some(2));
        assert!(config.arcs().is_empty());
    }

    #[test]
    fn out_of_range_addresses_are_absent() {
        let config = Configuration::new(two_token_sentence());

        assert_eq!(config.stack_top(99), None);
        assert_eq!(config.buffer_front(99), None);
    }

    #[test]
    fn attach_updates_ldeps_and_rdeps_in_attachment_order() {
        let mut config = Configuration::new(two_token_sentence());

        config.attach(3, 1, "amod".to_string());
        config.attach(3, 2, "amod".to_string());
        config.attach(0, 3, "root".to_string());

        assert_eq!(config.ldep(3, 0), Some(1));
        assert_eq!(config.ldep(3, 1), None);
        assert_eq!(config.rdep(3, 0), Some(2));
        assert!(config.has_head(1));
        assert!(config.has_head(2));
        assert!(config.has_head(3));
    }

    #[test]
    fn ldep_with_no_dependents_is_absent() {
        let config = Configuration::new(two_token_sentence());
        assert_eq!(config.ldep(1, 0), None);
    }

    #[test]
    #[should_panic(expected = "already has a head")]
    fn attach_panics_on_double_head() {
        let mut config = Configuration::new(two_token_sentence());
        config.attach(0, 1, "root".to_string());
        config.attach(2, 1, "conj".to_string());
    }

    #[test]
    fn reset_reuses_allocations_for_a_new_sentence() {
        let mut config = Configuration::new(two_token_sentence());
        config.attach(0, 1, "root".to_string());
        config.shift();

        let three_tokens = Rc::new(Sentence::new(vec![
            Token::new("the"),
            Token::new("cat"),
            Token::new("sat"),
        ]));
        config.reset(three_tokens);

        assert_eq!(config.stack_top(0), Some(ROOT));
        assert_eq!(config.stack_len(), 1);
        assert_eq!(config.buffer_front(2), Some(3));
        assert!(config.arcs().is_empty());
        assert!(!config.has_head(1));
    }
}
