//! Two-pass assembler: collect labels, then encode line by line.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::codec::{parse_int, to_twos_complement, word_to_bytes};
use crate::isa::wramp::{self, Fields, Operands, Target};

/// Label name to word index of the next instruction after the definition.
/// A duplicate definition overwrites the earlier entry.
pub type SymbolTable = HashMap<String, u32>;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("unresolved symbol `{label}` on line {line}")]
    UnresolvedSymbol { label: String, line: usize },
}

/// An instruction line that survived preprocessing, with its original
/// 1-based source line number for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub num: usize,
    pub text: String,
}

/// A line that matched no format and was dropped from the output.
#[derive(Debug, Clone, Serialize)]
pub struct Skipped {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Assembled {
    /// Consecutive little-endian words, one per encoded line.
    pub bytes: Vec<u8>,
    pub skipped: Vec<Skipped>,
}

/// First pass: strip blanks and comments, register labels, and keep the
/// instruction lines in order. Labels and dropped lines do not advance the
/// instruction counter.
pub fn preprocess(source: &str) -> (SymbolTable, Vec<SourceLine>) {
    let mut labels = SymbolTable::new();
    let mut lines = Vec::new();
    let mut count: u32 = 0;
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(name) = label_definition(line) {
            labels.insert(name.to_string(), count);
            continue;
        }
        lines.push(SourceLine { num: idx + 1, text: line.to_string() });
        count += 1;
    }
    (labels, lines)
}

/// Second pass: resolve targets and pack each line into one word.
///
/// Unrecognized lines are reported and skipped without emitting a word;
/// an unresolved label aborts the run.
pub fn assemble(source: &str) -> Result<Assembled, AsmError> {
    let (labels, lines) = preprocess(source);
    let mut out = Assembled::default();
    for (idx, line) in lines.iter().enumerate() {
        // Branch offsets are relative to the position of the *next*
        // instruction, hence the one-past index.
        let pc = idx as i64 + 1;
        if let Some(word) = literal_word(&line.text) {
            out.bytes.extend_from_slice(&word_to_bytes(word));
            continue;
        }
        match wramp::match_text(&line.text) {
            Some((id, ops)) => {
                let fields = resolve(ops, &labels, pc, line)?;
                let word = wramp::pack(&wramp::REGISTRY[id], fields);
                out.bytes.extend_from_slice(&word_to_bytes(word));
            }
            None => {
                warn!(line = line.num, text = %line.text, "unrecognized instruction, skipping");
                out.skipped.push(Skipped { line: line.num, text: line.text.clone() });
            }
        }
    }
    Ok(out)
}

/// `name:` alone on a line, where `name` is alphanumeric/underscore.
fn label_definition(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?;
    let ident = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    ident.then_some(name)
}

/// `.word <int>` encodes its operand directly, bypassing the registry.
fn literal_word(text: &str) -> Option<u32> {
    let mut parts = text.split_whitespace();
    if parts.next()? != ".word" {
        return None;
    }
    let value = parse_int(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(to_twos_complement(value, 32))
}

fn resolve(
    ops: Operands,
    labels: &SymbolTable,
    pc: i64,
    line: &SourceLine,
) -> Result<Fields, AsmError> {
    Ok(match ops {
        Operands::Reg3 { rd, rs, rt } => Fields { rd, rs, rt, imm: 0 },
        Operands::RegRegImm { rd, rs, imm } => Fields { rd, rs, rt: 0, imm },
        Operands::Mem { rd, rs, off } => Fields { rd, rs, rt: 0, imm: off },
        // Jump targets are absolute word indices.
        Operands::Jump { target } => {
            let imm = match target {
                Target::Abs(v) => v,
                Target::Label(name) => lookup(labels, name, line)? as i64,
            };
            Fields { rd: 0, rs: 0, rt: 0, imm }
        }
        // Branch targets are relative to pc; numeric operands are already
        // offsets and pass through untouched.
        Operands::Branch { rs, target } => {
            let imm = match target {
                Target::Abs(off) => off,
                Target::Label(name) => lookup(labels, name, line)? as i64 - pc,
            };
            Fields { rd: 0, rs, rt: 0, imm }
        }
    })
}

fn lookup(labels: &SymbolTable, name: String, line: &SourceLine) -> Result<u32, AsmError> {
    labels
        .get(&name)
        .copied()
        .ok_or(AsmError::UnresolvedSymbol { label: name, line: line.num })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_strips_and_counts() {
        let src = "\n# comment\nstart:\nadd $1,$2,$3\n\nloop:\nbeqz $1,loop\n";
        let (labels, lines) = preprocess(src);
        assert_eq!(labels["start"], 0);
        assert_eq!(labels["loop"], 1);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "add $1,$2,$3");
        assert_eq!(lines[0].num, 4);
        assert_eq!(lines[1].num, 7);
    }

    #[test]
    fn duplicate_label_overwrites() {
        let src = "x:\nadd $1,$2,$3\nx:\nsub $1,$2,$3\n";
        let (labels, _) = preprocess(src);
        assert_eq!(labels["x"], 1);
    }

    #[test]
    fn label_definition_shape() {
        assert_eq!(label_definition("start:"), Some("start"));
        assert_eq!(label_definition("L_2:"), Some("L_2"));
        assert_eq!(label_definition(":"), None);
        assert_eq!(label_definition("start: add $1,$2,$3"), None);
    }

    #[test]
    fn literal_word_any_base() {
        assert_eq!(literal_word(".word 5"), Some(5));
        assert_eq!(literal_word(".word 0xffffffff"), Some(0xFFFF_FFFF));
        assert_eq!(literal_word(".word -1"), Some(0xFFFF_FFFF));
        assert_eq!(literal_word(".word"), None);
        assert_eq!(literal_word(".word x y"), None);
        assert_eq!(literal_word("add $1,$2,$3"), None);
    }
}
