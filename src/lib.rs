pub mod asm;
pub mod codec;
pub mod disasm;
pub mod image;

pub mod isa {
    pub mod wramp;
}

pub use asm::{assemble, AsmError, Assembled};
pub use disasm::disassemble;
pub use image::{load_words, words_from_bytes, words_to_bytes, ImageError};
