use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::core::error::ConllxError;
use crate::core::sentence::{Sentence, Token};

/// Reads every sentence from a CoNLL-X stream: blank-line-separated blocks, one token
/// per line, tab-separated `ID FORM LEMMA CPOSTAG POSTAG FEATS HEAD DEPREL PHEAD
/// PDEPREL`. `HEAD`/`DEPREL` are read but not trusted as the parser's own output --
/// callers that want them (oracle replay, training) read `Token::head`/`Token::deprel`
/// directly; a plain inference run simply overwrites them via `Sentence::apply_arcs`.
pub fn read_sentences<R: BufRead>(reader: R) -> Result<Vec<Sentence>, ConllxError> {
    let mut sentences = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for (zero_based, line) in reader.lines().enumerate() {
        let line_no = zero_based + 1;
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed.trim().is_empty() {
            if !tokens.is_empty() {
                sentences.push(Sentence::new(std::mem::take(&mut tokens)));
            }
            continue;
        }

        tokens.push(parse_token_line(trimmed, line_no)?);
    }

    if !tokens.is_empty() {
        sentences.push(Sentence::new(tokens));
    }

    Ok(sentences)
}

fn parse_token_line(line: &str, line_no: usize) -> Result<Token, ConllxError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(ConllxError::MalformedLine {
            line: line_no,
            message: format!("expected at least 8 tab-separated fields, found {}", fields.len()),
        });
    }

    let form = fields[1].to_string();
    let lemma = fields[2].to_string();
    let cpostag = fields[3].to_string();
    let postag = fields[4].to_string();
    let feats = parse_feats(fields[5]);
    let head = parse_head(fields[6]);
    let deprel = parse_optional(fields[7]);

    Ok(Token { form, lemma, cpostag, postag, feats, head, deprel })
}

fn parse_feats(field: &str) -> BTreeMap<String, String> {
    if field == "_" {
        return BTreeMap::new();
    }

    field
        .split('|')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let name = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn parse_head(field: &str) -> Option<usize> {
    if field == "_" {
        None
    } else {
        field.parse::<usize>().ok()
    }
}

fn parse_optional(field: &str) -> Option<String> {
    if field == "_" {
        None
    } else {
        Some(field.to_string())
    }
}

/// Writes every sentence back out in CoNLL-X form. `HEAD`/`DEPREL` come from each
/// token's (by now parser-populated) fields; everything else is passed through
/// unchanged from what was read in.
pub fn write_sentences<W: Write>(mut writer: W, sentences: &[Sentence]) -> Result<(), ConllxError> {
    for sentence in sentences {
        for i in 1..=sentence.len() {
            let token = sentence.token(i).expect("index within 1..=len always resolves");
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t_",
                i,
                token.form,
                non_empty(&token.lemma),
                non_empty(&token.cpostag),
                non_empty(&token.postag),
                render_feats(&token.feats),
                token.head.map(|h| h.to_string()).unwrap_or_else(|| "_".to_string()),
                token.deprel.as_deref().unwrap_or("_"),
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn non_empty(field: &str) -> &str {
    if field.is_empty() {
        "_"
    } else {
        field
    }
}

fn render_feats(feats: &BTreeMap<String, String>) -> String {
    if feats.is_empty() {
        return "_".to_string();
    }
    feats.iter().map(|(name, value)| format!("{}={}", name, value)).collect::<Vec<_>>().join("|")
}
