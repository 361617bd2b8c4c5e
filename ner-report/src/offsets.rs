//! Conversão entre offsets de caractere e offsets de byte.
//!
//! Os registros de entidade usam offsets de **caractere** (valores escalares
//! Unicode), enquanto `str` em Rust é indexado por byte. Em "São Paulo", "Paulo"
//! começa no caractere 4 mas no byte 5.

/// Tabela de posições de byte de cada caractere de um texto.
#[derive(Debug, Clone)]
pub struct OffsetMap {
    /// `bytes[i]` é o byte inicial do caractere `i`; o último elemento é `text.len()`.
    bytes: Vec<usize>,
}

impl OffsetMap {
    pub fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    /// Número de caracteres do texto.
    pub fn char_len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Offset de byte do caractere `char_idx` (aceita `char_len()` como fim).
    pub fn to_byte(&self, char_idx: usize) -> Option<usize> {
        self.bytes.get(char_idx).copied()
    }

    /// Offset de caractere de um offset de byte, se cair em fronteira de caractere.
    pub fn to_char(&self, byte_idx: usize) -> Option<usize> {
        self.bytes.binary_search(&byte_idx).ok()
    }

    /// Fatia `[start, end)` em caracteres. `None` se o intervalo for inválido.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let b_start = self.to_byte(start)?;
        let b_end = self.to_byte(end)?;
        text.get(b_start..b_end)
    }
}

/// Atalho para fatiar um texto por offsets de caractere.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    OffsetMap::new(text).slice(text, start, end)
}
