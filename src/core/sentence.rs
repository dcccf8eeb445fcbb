use std::collections::BTreeMap;

/// Index 0 is reserved for the artificial ROOT token; real tokens start at 1.
pub const ROOT: usize = 0;

/// A single token. `head` and `deprel` are the parser's *output* fields: they start
/// unset and are populated by `Sentence::apply_arcs` once a parse completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub form: String,
    pub lemma: String,
    pub cpostag: String,
    pub postag: String,
    pub feats: BTreeMap<String, String>,
    pub head: Option<usize>,
    pub deprel: Option<String>,
}

impl Token {
    pub fn new(form: impl Into<String>) -> Self {
        Token {
            form: form.into(),
            lemma: String::new(),
            cpostag: String::new(),
            postag: String::new(),
            feats: BTreeMap::new(),
            head: None,
            deprel: None,
        }
    }

    pub fn with_postag(mut self, postag: impl Into<String>) -> Self {
        self.postag = postag.into();
        self
    }

    pub fn with_feat(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.feats.insert(name.into(), value.into());
        self
    }
}

/// An ordered sequence of tokens, indexed 1-based; index 0 denotes the implicit ROOT
/// token (whose attributes are never read by the feature DSL -- every address step
/// resolving to 0 simply reads ROOT-specific defaults, not a real `Token`).
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Sentence { tokens }
    }

    /// Number of real (non-ROOT) tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `None` for index 0 (ROOT) and out-of-range indices.
    pub fn token(&self, index: usize) -> Option<&Token> {
        if index == ROOT {
            None
        } else {
            self.tokens.get(index - 1)
        }
    }

    pub fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        if index == ROOT {
            None
        } else {
            self.tokens.get_mut(index - 1)
        }
    }

    /// Clears any pre-existing head/relation on every token, then applies `arcs` as the
    /// new output. Called by the orchestrator after a successful parse, and by test
    /// harnesses that re-run a sentence through a second transition system.
    pub fn apply_arcs(&mut self, arcs: &[super::config::Arc]) {
        for token in &mut self.tokens {
            token.head = None;
            token.deprel = None;
        }
        for arc in arcs {
            if let Some(token) = self.token_mut(arc.dependent) {
                token.head = Some(arc.head);
                token.deprel = Some(arc.label.clone());
            }
        }
    }
}
