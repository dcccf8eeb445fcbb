use crate::core::config::Configuration;
use crate::core::error::FeatureTemplateSyntaxError;

/// Sentinel string yielded when any step of an address template lands outside the
/// sentence or on a missing dependent. Distinguished from real token attributes, which
/// can themselves legitimately be empty strings (e.g. an unset FEATS value), by using a
/// value no CoNLL-X field can contain unescaped.
pub const ABSENT: &str = "_ABSENT_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Stack(usize),
    Buffer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepStep {
    LDep(usize),
    RDep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layer {
    Token,
    Tag,
    Deprel,
    Feature(String),
}

/// A compiled `[source(,dep_source)*] LAYER` address template. Parsed once at startup;
/// `evaluate` is then a pointer-free walk over small integer fields, run once per
/// template per configuration along a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTemplate {
    source: Source,
    dep_steps: Vec<DepStep>,
    layer: Layer,
    /// The exact source text this template was compiled from, reused verbatim as the
    /// prefix of the canonical feature-name rendering.
    source_text: String,
}

impl AddressTemplate {
    /// Parses a single `addr_value` body (the text following the `addr` generator name
    /// on a feature-template-file line). Whitespace-insensitive, per the grammar in the
    /// spec.
    pub fn parse(text: &str) -> Result<AddressTemplate, FeatureTemplateSyntaxError> {
        let mut tokens = Tokenizer::new(text);

        tokens.expect("[")?;

        let source = parse_source(&mut tokens)?;

        let mut dep_steps = Vec::new();
        loop {
            match tokens.peek() {
                Some(",") => {
                    tokens.next();
                    dep_steps.push(parse_dep_step(&mut tokens)?);
                }
                Some("]") => {
                    tokens.next();
                    break;
                }
                Some(other) => {
                    return Err(syntax_error(format!("expected ',' or ']', found '{}'", other)));
                }
                None => return Err(syntax_error("unexpected end of input inside address brackets")),
            }
        }

        let layer = parse_layer(&mut tokens)?;

        if let Some(trailing) = tokens.next() {
            return Err(syntax_error(format!("unexpected trailing token '{}'", trailing)));
        }

        Ok(AddressTemplate {
            source,
            dep_steps,
            layer,
            source_text: canonicalize(text),
        })
    }

    /// Resolves this template against `config`, returning the layer value or `ABSENT`.
    pub fn evaluate(&self, config: &Configuration) -> String {
        let mut index = match self.resolve_source(config) {
            Some(i) => i,
            None => return ABSENT.to_string(),
        };

        for step in &self.dep_steps {
            index = match step {
                DepStep::LDep(k) => match config.ldep(index, *k) {
                    Some(i) => i,
                    None => return ABSENT.to_string(),
                },
                DepStep::RDep(k) => match config.rdep(index, *k) {
                    Some(i) => i,
                    None => return ABSENT.to_string(),
                },
            };
        }

        self.read_layer(config, index)
    }

    /// Canonical feature-name rendering used as a symbolic key in non-hashed mode and as
    /// the byte sequence fed to the hash kernel: source text, a reserved separator, and
    /// the resolved value.
    pub fn feature_name(&self, config: &Configuration) -> String {
        format!("{}\u{1}{}", self.source_text, self.evaluate(config))
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    fn resolve_source(&self, config: &Configuration) -> Option<usize> {
        match self.source {
            Source::Stack(k) => config.stack_top(k),
            Source::Buffer(k) => config.buffer_front(k),
        }
    }

    fn read_layer(&self, config: &Configuration, index: usize) -> String {
        match &self.layer {
            Layer::Token => match config.sentence().token(index) {
                Some(token) => token.form.clone(),
                None if index == crate::core::sentence::ROOT => "ROOT".to_string(),
                None => ABSENT.to_string(),
            },
            Layer::Tag => match config.sentence().token(index) {
                Some(token) => token.postag.clone(),
                None => ABSENT.to_string(),
            },
            Layer::Deprel => {
                if let Some(arc) = config.arcs().iter().find(|a| a.dependent == index) {
                    arc.label.clone()
                } else {
                    ABSENT.to_string()
                }
            }
            Layer::Feature(name) => match config.sentence().token(index) {
                Some(token) => token.feats.get(name).cloned().unwrap_or_else(|| ABSENT.to_string()),
                None => ABSENT.to_string(),
            },
        }
    }
}

fn parse_source(tokens: &mut Tokenizer) -> Result<Source, FeatureTemplateSyntaxError> {
    match tokens.next() {
        Some("STACK") => Ok(Source::Stack(parse_int(tokens)?)),
        Some("BUFFER") => Ok(Source::Buffer(parse_int(tokens)?)),
        Some(other) => Err(syntax_error(format!("expected STACK or BUFFER, found '{}'", other))),
        None => Err(syntax_error("unexpected end of input, expected a source")),
    }
}

fn parse_dep_step(tokens: &mut Tokenizer) -> Result<DepStep, FeatureTemplateSyntaxError> {
    match tokens.next() {
        Some("LDEP") => Ok(DepStep::LDep(parse_int(tokens)?)),
        Some("RDEP") => Ok(DepStep::RDep(parse_int(tokens)?)),
        Some(other) => Err(syntax_error(format!("expected LDEP or RDEP, found '{}'", other))),
        None => Err(syntax_error("unexpected end of input, expected a dep_source")),
    }
}

fn parse_layer(tokens: &mut Tokenizer) -> Result<Layer, FeatureTemplateSyntaxError> {
    match tokens.next() {
        Some("TOKEN") => Ok(Layer::Token),
        Some("TAG") => Ok(Layer::Tag),
        Some("DEPREL") => Ok(Layer::Deprel),
        Some("FEATURE") => match tokens.next() {
            Some(name) => Ok(Layer::Feature(name.to_string())),
            None => Err(syntax_error("FEATURE requires a name argument")),
        },
        Some(other) => Err(syntax_error(format!("unknown layer '{}'", other))),
        None => Err(syntax_error("unexpected end of input, expected a layer")),
    }
}

fn parse_int(tokens: &mut Tokenizer) -> Result<usize, FeatureTemplateSyntaxError> {
    match tokens.next() {
        Some(text) => text
            .parse::<usize>()
            .map_err(|_| syntax_error(format!("expected an integer, found '{}'", text))),
        None => Err(syntax_error("unexpected end of input, expected an integer")),
    }
}

fn syntax_error(message: impl Into<String>) -> FeatureTemplateSyntaxError {
    FeatureTemplateSyntaxError { line: 0, message: message.into() }
}

/// Collapses all whitespace in a template's source text, for a stable canonical
/// rendering independent of how the author formatted it (`[STACK 0] TOKEN` and
/// `[  STACK  0 ]  TOKEN` compile to the same template and render identically).
fn canonicalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits an `addr_value` body into the punctuation and word tokens the grammar cares
/// about (`[`, `]`, `,`, and bare words), ignoring whitespace entirely.
struct Tokenizer {
    tokens: Vec<String>,
    pos: usize,
}

impl Tokenizer {
    fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for c in text.chars() {
            match c {
                '[' | ']' | ',' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    tokens.push(c.to_string());
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        Tokenizer { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn next(&mut self) -> Option<&str> {
        let tok = self.tokens.get(self.pos).map(|s| s.as_str());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &str) -> Result<(), FeatureTemplateSyntaxError> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(other) => Err(syntax_error(format!("expected '{}', found '{}'", expected, other))),
            None => Err(syntax_error(format!("expected '{}', found end of input", expected))),
        }
    }
}
