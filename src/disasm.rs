//! Word-by-word decoder and label synthesis for disassembly output.

use crate::isa::wramp::{self, Shape, REGISTRY};

/// Decode every word into a text line. Returns the lines plus the
/// `(line index, target word index)` pairs discovered on branch and jump
/// instructions, for the synthesis stage.
pub fn decode_words(words: &[u32]) -> (Vec<String>, Vec<(usize, i64)>) {
    let mut lines = Vec::with_capacity(words.len());
    let mut targets = Vec::new();
    for (idx, &word) in words.iter().enumerate() {
        let Some((id, f)) = wramp::match_binary(word) else {
            // Not an instruction: keep the raw value as opaque data.
            lines.push(format!(".word {word:#010x}"));
            continue;
        };
        let mn = REGISTRY[id].mnemonic;
        let line = match REGISTRY[id].shape {
            Shape::Reg3 => format!("{mn} ${},${},${}", f.rd, f.rs, f.rt),
            Shape::RegRegImm => format!("{mn} ${},${},{}", f.rd, f.rs, f.imm),
            // Assembly order is rd, offset(base); distinct from field order.
            Shape::Mem => format!("{mn} ${},{}(${})", f.rd, f.imm, f.rs),
            Shape::Jump => {
                targets.push((idx, f.imm));
                format!("{mn} {}", f.imm)
            }
            Shape::Branch => {
                // The encoded offset is relative to the following word.
                let target = idx as i64 + 1 + f.imm;
                targets.push((idx, target));
                format!("{mn} ${},{}", f.rs, target)
            }
        };
        lines.push(line);
    }
    (lines, targets)
}

/// Distinct target addresses in ascending order, each paired with its
/// synthetic name `L<rank>`.
pub fn label_table(targets: &[(usize, i64)]) -> Vec<(i64, String)> {
    let mut addrs: Vec<i64> = targets.iter().map(|&(_, addr)| addr).collect();
    addrs.sort_unstable();
    addrs.dedup();
    addrs
        .into_iter()
        .enumerate()
        .map(|(rank, addr)| (addr, format!("L{rank}")))
        .collect()
}

/// Rewrite branch/jump operands to their synthetic label names and insert a
/// `L<rank>:` definition line before the instruction at each target index.
pub fn synthesize_labels(mut lines: Vec<String>, targets: &[(usize, i64)]) -> Vec<String> {
    let table = label_table(targets);
    for &(line_idx, addr) in targets {
        if let Ok(rank) = table.binary_search_by_key(&addr, |&(a, _)| a) {
            rewrite_last_operand(&mut lines[line_idx], &table[rank].1);
        }
    }
    for (inserted, (addr, name)) in table.iter().enumerate() {
        // Earlier insertions shift every later target by one line.
        let at = (addr + inserted as i64).clamp(0, lines.len() as i64) as usize;
        lines.insert(at, format!("{name}:"));
    }
    lines
}

pub fn disassemble(words: &[u32]) -> Vec<String> {
    let (lines, targets) = decode_words(words);
    synthesize_labels(lines, &targets)
}

/// The operand after the last comma, or after the mnemonic for jumps.
fn rewrite_last_operand(line: &mut String, name: &str) {
    let cut = line
        .rfind(',')
        .or_else(|| line.rfind(' '))
        .map_or(0, |i| i + 1);
    line.truncate(cut);
    line.push_str(name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_table_dedupes_and_ranks() {
        let targets = [(0usize, 4i64), (1, 2), (3, 4), (5, 2)];
        let table = label_table(&targets);
        assert_eq!(table, vec![(2, "L0".to_string()), (4, "L1".to_string())]);
    }

    #[test]
    fn rewrites_branch_and_jump_operands() {
        let mut line = "beqz $1,7".to_string();
        rewrite_last_operand(&mut line, "L0");
        assert_eq!(line, "beqz $1,L0");

        let mut line = "j 7".to_string();
        rewrite_last_operand(&mut line, "L1");
        assert_eq!(line, "j L1");
    }
}
