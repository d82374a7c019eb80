//! Line-oriented directive engine
//!
//! Walks the source a line at a time: a line whose first non-blank character
//! is `#` (outside a `/* */` comment) is a directive, everything else
//! accumulates into source-code runs.
//! The output text has exactly the input's length and newline positions —
//! directive lines and skipped conditional branches are blanked with spaces —
//! so the parser reports offsets and line numbers in the original buffer
//! without a mapping table.
//!
//! Conditional expressions are over defined symbols, `true`, `false`, `!`,
//! `==`, `!=`, `&&`, `||` and parentheses. Unknown symbols evaluate to false,
//! and both operands of every operator are evaluated.

pub mod sections;

use std::fmt;

use rustc_hash::FxHashSet;

use sections::{LineTarget, Section, SectionKind};

#[derive(Debug, Clone)]
pub struct PreprocessError {
    pub file: String,
    pub message: String,
    pub line: usize,
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "preprocess error in {} at line {}: {}",
            self.file, self.line, self.message
        )
    }
}

impl std::error::Error for PreprocessError {}

/// Result of preprocessing one source buffer.
#[derive(Debug, Clone)]
pub struct PreprocessOutput {
    /// Normalized text: same length and newlines as the input, with
    /// directive lines and skipped branches blanked.
    pub text: String,
    /// Typed spans covering the whole buffer, in order.
    pub sections: Vec<Section>,
    /// Symbol set after preprocessing (seed symbols plus `#define`s minus
    /// `#undef`s).
    pub symbols: FxHashSet<String>,
}

/// Preprocesses `source`, seeding the symbol set with `symbols`.
pub fn preprocess(
    file: &str,
    source: &str,
    symbols: FxHashSet<String>,
) -> Result<PreprocessOutput, PreprocessError> {
    let chars: Vec<char> = source.chars().collect();
    let mut engine = Preprocessor {
        text: chars.clone(),
        chars,
        pos: 0,
        line: 1,
        in_comment: false,
        symbols,
        file: file.to_string(),
    };
    // Stray #elif/#else/#endif/#endregion fail inside scan_block, so the
    // top-level scan always stops at end of input.
    let (sections, _) = engine.scan_block(false, Ctx::Top)?;
    Ok(PreprocessOutput {
        text: engine.text.into_iter().collect(),
        sections,
        symbols: engine.symbols,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Top,
    Conditional,
    Region,
}

/// Directive that terminated a nested scan. The terminating line has already
/// been blanked and consumed.
enum Stop {
    Eof,
    Elif {
        condition: String,
        start: usize,
        line: usize,
    },
    Else {
        start: usize,
        line: usize,
    },
    Endif {
        start: usize,
        end: usize,
        line: usize,
    },
    EndRegion {
        message: String,
        end: usize,
    },
}

struct Preprocessor {
    chars: Vec<char>,
    /// Normalized output, mutated in place by blanking.
    text: Vec<char>,
    pos: usize,
    line: usize,
    /// Inside an unterminated `/* */` comment from an earlier source line.
    in_comment: bool,
    symbols: FxHashSet<String>,
    file: String,
}

impl Preprocessor {
    fn error(&self, message: impl Into<String>, line: usize) -> PreprocessError {
        PreprocessError {
            file: self.file.clone(),
            message: message.into(),
            line,
        }
    }

    /// `[start, end)` of the current line, `end` past the newline.
    fn line_bounds(&self) -> (usize, usize) {
        let start = self.pos;
        let mut end = start;
        while end < self.chars.len() {
            let c = self.chars[end];
            end += 1;
            if c == '\n' {
                break;
            }
        }
        (start, end)
    }

    fn advance_line(&mut self, end: usize) {
        self.pos = end;
        self.line += 1;
    }

    fn blank(&mut self, start: usize, end: usize) {
        for i in start..end {
            if self.text[i] != '\n' {
                self.text[i] = ' ';
            }
        }
    }

    /// Splits a directive line into keyword and trimmed remainder, or `None`
    /// for an ordinary source line.
    fn directive_parts(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Option<(String, String)>, PreprocessError> {
        let mut i = start;
        while i < end && matches!(self.chars[i], ' ' | '\t') {
            i += 1;
        }
        if i >= end || self.chars[i] != '#' {
            return Ok(None);
        }
        i += 1;
        while i < end && matches!(self.chars[i], ' ' | '\t') {
            i += 1;
        }
        let mut keyword = String::new();
        while i < end && self.chars[i].is_ascii_alphabetic() {
            keyword.push(self.chars[i]);
            i += 1;
        }
        if keyword.is_empty() {
            return Err(self.error("malformed directive", self.line));
        }
        let rest: String = self.chars[i..end].iter().collect();
        Ok(Some((keyword, rest.trim().to_string())))
    }

    /// Advances block-comment state across a source line. Comment markers
    /// inside string and character literals or after `//` do not count.
    fn track_comments(&mut self, start: usize, end: usize) {
        let mut i = start;
        while i < end {
            if self.in_comment {
                if self.chars[i] == '*' && self.chars.get(i + 1) == Some(&'/') {
                    self.in_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            match self.chars[i] {
                '/' if self.chars.get(i + 1) == Some(&'/') => return,
                '/' if self.chars.get(i + 1) == Some(&'*') => {
                    self.in_comment = true;
                    i += 2;
                }
                quote @ ('"' | '\'') => {
                    i += 1;
                    while i < end && self.chars[i] != quote && self.chars[i] != '\n' {
                        if self.chars[i] == '\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
    }

    /// Scans lines until end of input or a directive that closes `ctx`.
    /// `skipped` marks content excluded by a conditional: source lines are
    /// blanked, `#define`/`#undef` are validated but have no effect.
    fn scan_block(
        &mut self,
        skipped: bool,
        ctx: Ctx,
    ) -> Result<(Vec<Section>, Stop), PreprocessError> {
        let mut sections: Vec<Section> = Vec::new();
        let mut run: Option<(usize, usize)> = None; // (offset, line)

        macro_rules! flush_run {
            ($up_to:expr) => {
                if let Some((run_start, run_line)) = run.take() {
                    sections.push(Section {
                        start: run_start,
                        length: $up_to - run_start,
                        line: run_line,
                        kind: SectionKind::SourceCode,
                    });
                }
            };
        }

        loop {
            if self.pos >= self.chars.len() {
                flush_run!(self.pos);
                return Ok((sections, Stop::Eof));
            }
            let (start, end) = self.line_bounds();
            let line = self.line;

            // A line starting inside a block comment is never a directive.
            let parts = if self.in_comment {
                None
            } else {
                self.directive_parts(start, end)?
            };
            let Some((keyword, rest)) = parts else {
                if run.is_none() {
                    run = Some((start, line));
                }
                if skipped {
                    self.blank(start, end);
                } else {
                    self.track_comments(start, end);
                }
                self.advance_line(end);
                continue;
            };

            flush_run!(start);
            self.blank(start, end);

            match keyword.as_str() {
                "define" | "undef" => {
                    if !is_identifier(&rest) {
                        return Err(self.error(
                            format!("'#{}' requires a symbol name", keyword),
                            line,
                        ));
                    }
                    self.advance_line(end);
                    let kind = if keyword == "define" {
                        if !skipped {
                            self.symbols.insert(rest.clone());
                        }
                        SectionKind::Define { symbol: rest }
                    } else {
                        if !skipped {
                            self.symbols.remove(&rest);
                        }
                        SectionKind::Undef { symbol: rest }
                    };
                    sections.push(Section {
                        start,
                        length: end - start,
                        line,
                        kind,
                    });
                }
                "region" => {
                    self.advance_line(end);
                    let (subsections, stop) = self.scan_block(skipped, Ctx::Region)?;
                    let Stop::EndRegion {
                        message,
                        end: close_end,
                    } = stop
                    else {
                        return Err(self.error("unterminated '#region'", line));
                    };
                    sections.push(Section {
                        start,
                        length: close_end - start,
                        line,
                        kind: SectionKind::Region {
                            name: rest,
                            close_message: message,
                            subsections,
                        },
                    });
                }
                "endregion" => {
                    self.advance_line(end);
                    if ctx != Ctx::Region {
                        return Err(self.error("'#endregion' without '#region'", line));
                    }
                    return Ok((
                        sections,
                        Stop::EndRegion { message: rest, end },
                    ));
                }
                "if" => {
                    self.advance_line(end);
                    self.conditional_group(&mut sections, skipped, start, line, rest)?;
                }
                "elif" => {
                    self.advance_line(end);
                    if ctx != Ctx::Conditional {
                        return Err(self.error("'#elif' without '#if'", line));
                    }
                    return Ok((
                        sections,
                        Stop::Elif {
                            condition: rest,
                            start,
                            line,
                        },
                    ));
                }
                "else" => {
                    self.advance_line(end);
                    if ctx != Ctx::Conditional {
                        return Err(self.error("'#else' without '#if'", line));
                    }
                    if !rest.is_empty() {
                        return Err(self.error("'#else' takes no operand", line));
                    }
                    return Ok((sections, Stop::Else { start, line }));
                }
                "endif" => {
                    self.advance_line(end);
                    if ctx != Ctx::Conditional {
                        return Err(self.error("'#endif' without '#if'", line));
                    }
                    if !rest.is_empty() {
                        return Err(self.error("'#endif' takes no operand", line));
                    }
                    return Ok((
                        sections,
                        Stop::Endif {
                            start,
                            end,
                            line,
                        },
                    ));
                }
                "error" | "warning" => {
                    self.advance_line(end);
                    let kind = if keyword == "error" {
                        SectionKind::ErrorDirective { message: rest }
                    } else {
                        SectionKind::WarningDirective { message: rest }
                    };
                    sections.push(Section {
                        start,
                        length: end - start,
                        line,
                        kind,
                    });
                }
                "line" => {
                    self.advance_line(end);
                    match parse_line_target(&rest) {
                        Some(target) => sections.push(Section {
                            start,
                            length: end - start,
                            line,
                            kind: SectionKind::Line { target },
                        }),
                        // In a skipped branch the payload is not validated.
                        None if skipped => sections.push(Section {
                            start,
                            length: end - start,
                            line,
                            kind: SectionKind::SourceCode,
                        }),
                        None => return Err(self.error("malformed '#line' directive", line)),
                    }
                }
                "pragma" => {
                    self.advance_line(end);
                    match parse_pragma_warning(&rest) {
                        Some((disable, codes)) => sections.push(Section {
                            start,
                            length: end - start,
                            line,
                            kind: SectionKind::Pragma { disable, codes },
                        }),
                        None if skipped => sections.push(Section {
                            start,
                            length: end - start,
                            line,
                            kind: SectionKind::SourceCode,
                        }),
                        None => {
                            return Err(self.error("unrecognized '#pragma' directive", line))
                        }
                    }
                }
                other => {
                    return Err(self.error(format!("unknown directive '#{}'", other), line))
                }
            }
        }
    }

    /// Handles one `#if`/`#elif`/`#else`/`#endif` group whose `#if` line has
    /// already been consumed. Pushes one section per branch plus the
    /// `#endif` section.
    fn conditional_group(
        &mut self,
        sections: &mut Vec<Section>,
        skipped: bool,
        if_start: usize,
        if_line: usize,
        if_condition: String,
    ) -> Result<(), PreprocessError> {
        let mut any_taken = false;
        let mut branch = (if_start, if_line, if_condition);
        let mut first = true;

        loop {
            let (dir_start, dir_line, condition) = branch;
            // Once a branch is taken (or the whole group sits in skipped
            // content), later conditions are parsed but not evaluated.
            let evaluated = !skipped && !any_taken;
            let value = self.eval_condition(&condition, dir_line)?;
            let take = evaluated && value;
            if take {
                any_taken = true;
            }
            let (subsections, stop) = self.scan_block(!take, Ctx::Conditional)?;

            let branch_close = |stop_start: usize| Section {
                start: dir_start,
                length: stop_start - dir_start,
                line: dir_line,
                kind: if first {
                    SectionKind::If {
                        condition: condition.clone(),
                        evaluated,
                        skipped: !take,
                        subsections,
                    }
                } else {
                    SectionKind::Elif {
                        condition: condition.clone(),
                        evaluated,
                        skipped: !take,
                        subsections,
                    }
                },
            };

            match stop {
                Stop::Elif {
                    condition,
                    start,
                    line,
                } => {
                    sections.push(branch_close(start));
                    branch = (start, line, condition);
                    first = false;
                }
                Stop::Else { start, line } => {
                    sections.push(branch_close(start));
                    let take_else = !skipped && !any_taken;
                    let (else_subs, else_stop) = self.scan_block(!take_else, Ctx::Conditional)?;
                    match else_stop {
                        Stop::Endif {
                            start: endif_start,
                            end: endif_end,
                            line: endif_line,
                        } => {
                            sections.push(Section {
                                start,
                                length: endif_start - start,
                                line,
                                kind: SectionKind::Else {
                                    skipped: !take_else,
                                    subsections: else_subs,
                                },
                            });
                            sections.push(Section {
                                start: endif_start,
                                length: endif_end - endif_start,
                                line: endif_line,
                                kind: SectionKind::Endif,
                            });
                            return Ok(());
                        }
                        Stop::Elif { line, .. } => {
                            return Err(self.error("'#elif' after '#else'", line))
                        }
                        Stop::Else { line, .. } => {
                            return Err(self.error("duplicate '#else'", line))
                        }
                        _ => return Err(self.error("unterminated '#if'", if_line)),
                    }
                }
                Stop::Endif {
                    start,
                    end,
                    line,
                } => {
                    sections.push(branch_close(start));
                    sections.push(Section {
                        start,
                        length: end - start,
                        line,
                        kind: SectionKind::Endif,
                    });
                    return Ok(());
                }
                _ => return Err(self.error("unterminated '#if'", if_line)),
            }
        }
    }

    fn eval_condition(&self, text: &str, line: usize) -> Result<bool, PreprocessError> {
        let mut parser = CondParser {
            chars: text.chars().collect(),
            pos: 0,
            symbols: &self.symbols,
        };
        let value = parser
            .parse_or()
            .map_err(|message| self.error(message, line))?;
        parser.skip_ws();
        if parser.pos < parser.chars.len() {
            return Err(self.error("malformed conditional expression", line));
        }
        Ok(value)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn parse_line_target(rest: &str) -> Option<LineTarget> {
    if rest == "default" {
        return Some(LineTarget::Default);
    }
    if rest == "hidden" {
        return Some(LineTarget::Hidden);
    }
    let mut parts = rest.splitn(2, char::is_whitespace);
    let number = parts.next()?.parse::<usize>().ok()?;
    let file = match parts.next().map(str::trim) {
        None | Some("") => None,
        Some(quoted) => {
            let stripped = quoted.strip_prefix('"')?.strip_suffix('"')?;
            Some(stripped.to_string())
        }
    };
    Some(LineTarget::Remap { line: number, file })
}

/// `warning disable|restore [n, n, ...]`; empty list means all codes.
fn parse_pragma_warning(rest: &str) -> Option<(bool, Vec<u32>)> {
    let rest = rest.strip_prefix("warning")?.trim_start();
    let (disable, rest) = if let Some(tail) = rest.strip_prefix("disable") {
        (true, tail)
    } else if let Some(tail) = rest.strip_prefix("restore") {
        (false, tail)
    } else {
        return None;
    };
    let mut codes = Vec::new();
    for part in rest.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        codes.push(part.parse::<u32>().ok()?);
    }
    Some((disable, codes))
}

/// Recursive-descent evaluator for conditional expressions:
/// `or := and ('||' and)*`, `and := eq ('&&' eq)*`,
/// `eq := unary (('=='|'!=') unary)*`, `unary := '!' unary | primary`.
struct CondParser<'a> {
    chars: Vec<char>,
    pos: usize,
    symbols: &'a FxHashSet<String>,
}

impl CondParser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: &str) -> bool {
        self.skip_ws();
        let end = self.pos + expected.chars().count();
        if end <= self.chars.len()
            && self.chars[self.pos..end].iter().collect::<String>() == expected
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<bool, String> {
        let mut value = self.parse_and()?;
        while self.eat("||") {
            let right = self.parse_and()?;
            value = value || right;
        }
        Ok(value)
    }

    fn parse_and(&mut self) -> Result<bool, String> {
        let mut value = self.parse_eq()?;
        while self.eat("&&") {
            let right = self.parse_eq()?;
            value = value && right;
        }
        Ok(value)
    }

    fn parse_eq(&mut self) -> Result<bool, String> {
        let mut value = self.parse_unary()?;
        loop {
            if self.eat("==") {
                let right = self.parse_unary()?;
                value = value == right;
            } else if self.eat("!=") {
                let right = self.parse_unary()?;
                value = value != right;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<bool, String> {
        self.skip_ws();
        // Distinguish '!' from '!='.
        if self.pos < self.chars.len()
            && self.chars[self.pos] == '!'
            && self.chars.get(self.pos + 1) != Some(&'=')
        {
            self.pos += 1;
            return Ok(!self.parse_unary()?);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<bool, String> {
        self.skip_ws();
        if self.eat("(") {
            let value = self.parse_or()?;
            if !self.eat(")") {
                return Err("expected ')' in conditional expression".to_string());
            }
            return Ok(value);
        }
        let mut word = String::new();
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c == '_' || c.is_alphanumeric() {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        match word.as_str() {
            "" => Err("expected a symbol in conditional expression".to_string()),
            "true" => Ok(true),
            "false" => Ok(false),
            // Unknown symbols are simply not defined.
            _ => Ok(self.symbols.contains(&word)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> PreprocessOutput {
        preprocess("test.src", source, FxHashSet::default()).expect("preprocess failed")
    }

    fn run_with(source: &str, seed: &[&str]) -> PreprocessOutput {
        let symbols = seed.iter().map(|s| s.to_string()).collect();
        preprocess("test.src", source, symbols).expect("preprocess failed")
    }

    fn assert_covers(sections: &[Section], start: usize, end: usize) {
        let mut cursor = start;
        for section in sections {
            assert_eq!(section.start, cursor, "gap before section {:?}", section);
            cursor = section.end();
        }
        assert_eq!(cursor, end, "sections stop short of the span end");
    }

    #[test]
    fn test_text_preserves_length_and_newlines() {
        let source = "#define A\nclass C {}\n#if A\nint x;\n#endif\n";
        let output = run(source);
        assert_eq!(output.text.chars().count(), source.chars().count());
        let input_newlines: Vec<usize> = source
            .char_indices()
            .filter(|(_, c)| *c == '\n')
            .map(|(i, _)| i)
            .collect();
        let output_newlines: Vec<usize> = output
            .text
            .char_indices()
            .filter(|(_, c)| *c == '\n')
            .map(|(i, _)| i)
            .collect();
        assert_eq!(input_newlines, output_newlines);
    }

    #[test]
    fn test_sections_cover_buffer() {
        let source = "one\n#define A\ntwo\n#region R\nthree\n#endregion done\nfour\n";
        let output = run(source);
        assert_covers(&output.sections, 0, source.chars().count());

        // The region's directive lines plus subsections cover its span.
        let region = output
            .sections
            .iter()
            .find(|s| matches!(s.kind, SectionKind::Region { .. }))
            .expect("region section");
        let SectionKind::Region {
            name,
            close_message,
            subsections,
        } = &region.kind
        else {
            unreachable!();
        };
        assert_eq!(name, "R");
        assert_eq!(close_message, "done");
        assert_covers(subsections, region.start + "#region R\n".len(), region.end() - "#endregion done\n".len());
    }

    #[test]
    fn test_define_undef_mutate_symbols() {
        let output = run("#define A\n#define B\n#undef A\n");
        assert!(!output.symbols.contains("A"));
        assert!(output.symbols.contains("B"));
    }

    #[test]
    fn test_seeded_symbols_select_branch() {
        let source = "#if DEBUG\nint a;\n#else\nint b;\n#endif\n";
        let output = run_with(source, &["DEBUG"]);
        assert!(output.text.contains("int a;"));
        assert!(!output.text.contains("int b;"));

        let output = run(source);
        assert!(!output.text.contains("int a;"));
        assert!(output.text.contains("int b;"));
    }

    #[test]
    fn test_elif_chain_takes_first_true_branch() {
        let source = "#if A\none\n#elif B\ntwo\n#elif C\nthree\n#else\nfour\n#endif\n";
        let output = run_with(source, &["B", "C"]);
        assert!(output.text.contains("two"));
        assert!(!output.text.contains("three"));
        assert!(!output.text.contains("four"));

        let kinds: Vec<bool> = output
            .sections
            .iter()
            .filter_map(|s| match &s.kind {
                SectionKind::If { skipped, .. }
                | SectionKind::Elif { skipped, .. }
                | SectionKind::Else { skipped, .. } => Some(*skipped),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![true, false, true, true]);
    }

    #[test]
    fn test_conditions_after_a_taken_branch_are_not_evaluated() {
        let source = "#if true\none\n#elif B\ntwo\n#else\nthree\n#endif\n";
        let output = run_with(source, &["B"]);
        let SectionKind::If {
            evaluated, skipped, ..
        } = &output.sections[0].kind
        else {
            panic!("expected if section");
        };
        assert!(*evaluated);
        assert!(!*skipped);
        let SectionKind::Elif {
            evaluated, skipped, ..
        } = &output.sections[1].kind
        else {
            panic!("expected elif section");
        };
        assert!(!*evaluated);
        assert!(*skipped);

        // Groups inside a skipped branch are never evaluated either.
        let output = run("#if false\n#if true\nx\n#endif\n#endif\n");
        let SectionKind::If { subsections, .. } = &output.sections[0].kind else {
            panic!("expected if section");
        };
        let SectionKind::If {
            evaluated, skipped, ..
        } = &subsections[0].kind
        else {
            panic!("expected nested if section");
        };
        assert!(!*evaluated);
        assert!(*skipped);
    }

    #[test]
    fn test_skipped_define_has_no_effect_but_is_validated() {
        let output = run("#if NEVER\n#define GHOST\n#endif\n");
        assert!(!output.symbols.contains("GHOST"));

        let err = preprocess("test.src", "#if NEVER\n#define 9bad\n#endif\n", FxHashSet::default())
            .expect_err("expected failure");
        assert!(err.message.contains("symbol name"));
    }

    #[test]
    fn test_nested_conditionals_pair_in_skipped_branch() {
        let source = "#if NEVER\n#if ALSO\nx\n#endif\ny\n#endif\nz\n";
        let output = run(source);
        assert!(!output.text.contains('x'));
        assert!(!output.text.contains('y'));
        assert!(output.text.contains('z'));
    }

    #[test]
    fn test_conditional_expression_grammar() {
        let source = "#if (A || B) && !C == true\nyes\n#endif\n";
        assert!(run_with(source, &["B"]).text.contains("yes"));
        assert!(!run_with(source, &["B", "C"]).text.contains("yes"));
        // Unknown symbols are false.
        assert!(!run(source).text.contains("yes"));
    }

    #[test]
    fn test_error_and_warning_sections_not_fatal() {
        let output = run("#error something broke\n#warning heads up\n");
        assert!(matches!(
            output.sections[0].kind,
            SectionKind::ErrorDirective { .. }
        ));
        assert!(matches!(
            output.sections[1].kind,
            SectionKind::WarningDirective { .. }
        ));
    }

    #[test]
    fn test_line_directive_forms() {
        let output = run("#line 200 \"other.src\"\n#line default\n#line hidden\n");
        assert!(matches!(
            &output.sections[0].kind,
            SectionKind::Line {
                target: LineTarget::Remap { line: 200, file: Some(f) }
            } if f == "other.src"
        ));
        assert!(matches!(
            output.sections[1].kind,
            SectionKind::Line {
                target: LineTarget::Default
            }
        ));
        assert!(matches!(
            output.sections[2].kind,
            SectionKind::Line {
                target: LineTarget::Hidden
            }
        ));
        assert!(preprocess("t", "#line nonsense\n", FxHashSet::default()).is_err());
    }

    #[test]
    fn test_pragma_warning_parses_codes() {
        let output = run("#pragma warning disable 1001, 1002\n#pragma warning restore\n");
        assert!(matches!(
            &output.sections[0].kind,
            SectionKind::Pragma { disable: true, codes } if codes == &vec![1001, 1002]
        ));
        assert!(matches!(
            &output.sections[1].kind,
            SectionKind::Pragma { disable: false, codes } if codes.is_empty()
        ));
        assert!(preprocess("t", "#pragma stuff\n", FxHashSet::default()).is_err());
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        assert!(preprocess("t", "#endif\n", FxHashSet::default()).is_err());
        assert!(preprocess("t", "#endregion\n", FxHashSet::default()).is_err());
        assert!(preprocess("t", "#if A\n", FxHashSet::default()).is_err());
        assert!(preprocess("t", "#region R\n", FxHashSet::default()).is_err());
        assert!(preprocess("t", "#if A\n#else\n#elif B\n#endif\n", FxHashSet::default()).is_err());
        assert!(preprocess("t", "#frobnicate\n", FxHashSet::default()).is_err());
    }

    #[test]
    fn test_hash_inside_code_line_is_not_a_directive() {
        let output = run("string s = \"#if nope\";\n");
        assert!(output.text.contains("#if nope"));
        assert!(matches!(output.sections[0].kind, SectionKind::SourceCode));
    }

    #[test]
    fn test_directive_inside_block_comment_is_source_text() {
        let source = "/*\n#endif\n*/\nclass C {}\n";
        let output = run(source);
        assert!(output.text.contains("#endif"));
        assert!(output
            .sections
            .iter()
            .all(|s| matches!(s.kind, SectionKind::SourceCode)));

        let output = run("/*\n#define GHOST\n*/\n");
        assert!(!output.symbols.contains("GHOST"));
    }

    #[test]
    fn test_comment_markers_in_literals_do_not_open_comments() {
        let output = run("string s = \"/*\";\n#define A\nint x; // /*\n#define B\n");
        assert!(output.symbols.contains("A"));
        assert!(output.symbols.contains("B"));
    }
}
