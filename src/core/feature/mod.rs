pub mod address;
pub mod generator;
pub mod hash;

pub use address::{AddressTemplate, ABSENT};
pub use generator::{AggregateGenerator, FeatureGenerator, HashSink};

use crate::core::error::FeatureTemplateSyntaxError;

/// Parses a feature-template file: one template per line, blank lines skipped, each
/// non-blank line `GENERATOR_NAME SPACE TEMPLATE_BODY`. Only the `addr` generator is
/// recognized; any other name is a syntax error naming the offending line.
pub fn parse_template_file(text: &str) -> Result<Vec<AddressTemplate>, FeatureTemplateSyntaxError> {
    let mut templates = Vec::new();

    for (zero_based, line) in text.lines().enumerate() {
        let line_no = zero_based + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let generator = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("").trim();

        if generator != "addr" {
            return Err(FeatureTemplateSyntaxError {
                line: line_no,
                message: format!("unknown feature generator \"{}\" (expected \"addr\")", generator),
            });
        }

        let template = AddressTemplate::parse(body).map_err(|err| FeatureTemplateSyntaxError {
            line: line_no,
            message: err.message,
        })?;
        templates.push(template);
    }

    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_addr_lines_skipping_blanks() {
        let text = "addr [STACK 0] TOKEN\n\naddr [BUFFER 0] TAG\n";
        let templates = parse_template_file(text).unwrap();

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].source_text(), "[ STACK 0 ] TOKEN");
        assert_eq!(templates[1].source_text(), "[ BUFFER 0 ] TAG");
    }

    #[test]
    fn unknown_generator_name_reports_its_line_number() {
        let text = "addr [STACK 0] TOKEN\nunknown [BUFFER 0] TAG\n";
        let err = parse_template_file(text).unwrap_err();

        assert_eq!(err.line, 2);
        assert!(err.message.contains("unknown"));
    }

    #[test]
    fn malformed_template_body_reports_its_line_number() {
        let text = "addr [STACK 0] TOKEN\naddr [BOGUS 0] TOKEN\n";
        let err = parse_template_file(text).unwrap_err();

        assert_eq!(err.line, 2);
    }
}
