//! # Tokenizador para Inglês
//!
//! Divide o texto bruto em tokens (palavras e pontuações) preservando a posição
//! original de cada um em **caracteres**, para que os spans do modelo possam ser
//! devolvidos como offsets de caractere.
//!
//! ## Regras
//!
//! - Palavras são sequências alfanuméricas; hífen interno é mantido ("Rolls-Royce").
//! - O ponto fica colado em abreviações conhecidas ("Mr.", "Inc."), em siglas
//!   ("U.S.") e em números decimais ("3.5").
//! - O possessivo é separado: "Alice's" → "Alice", "'s".
//! - Qualquer outro caractere não-espaço vira um token isolado.
//!
//! ```rust
//! use ner_report::tokenizer::tokenize;
//!
//! let tokens = tokenize("Mr. Smith visited the U.S. today.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Mr.", "Smith", "visited", "the", "U.S.", "today", "."]);
//! ```

use serde::{Deserialize, Serialize};

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Alice", ",", "Inc.").
    pub text: String,
    /// Índice de caractere inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de caractere final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista.
    pub index: usize,
}

impl Token {
    /// Texto em minúsculas, sem ponto final (ex: "Inc." → "inc").
    pub fn normalized(&self) -> String {
        self.text.trim_end_matches('.').to_lowercase()
    }

    /// Começa com letra maiúscula.
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().map(char::is_uppercase).unwrap_or(false)
    }
}

/// Abreviações que mantêm o ponto final
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mt", "Gen", "Gov", "Sen",
    "Rep", "Capt", "Lt", "Col", "Sgt", "Rev", "Hon", "Inc", "Corp", "Ltd", "Co",
    "Bros", "vs", "etc", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep",
    "Sept", "Oct", "Nov", "Dec", "No", "Dept", "Univ", "Ave", "Blvd",
];

/// Tokeniza um texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if ch.is_alphanumeric() || (ch == '-' && !current.is_empty() && next.map_or(false, char::is_alphanumeric)) {
            if current.is_empty() {
                current_start = i;
            }
            current.push(ch);
        } else if ch == '.' && !current.is_empty() {
            let is_abbrev = ABBREVIATIONS.contains(&current.as_str());
            let is_decimal = current.chars().all(|c| c.is_ascii_digit() || c == ',')
                && next.map_or(false, |c| c.is_ascii_digit());
            // "U.S.", "J.R.R.": letras maiúsculas isoladas separadas por ponto
            let last_upper = current.chars().last().map_or(false, char::is_uppercase);
            let single_letter = current.chars().count() == 1 && last_upper;
            let is_initialism = last_upper
                && (current.contains('.') || (single_letter && next.map_or(false, char::is_uppercase)));

            if is_abbrev || is_decimal || is_initialism {
                current.push('.');
            } else {
                flush_token(&mut tokens, &mut current, current_start);
                push_token(&mut tokens, ".".to_string(), i, i + 1);
            }
        } else if ch == ',' && !current.is_empty()
            && current.chars().all(|c| c.is_ascii_digit())
            && next.map_or(false, |c| c.is_ascii_digit())
        {
            // separador de milhar: "1,200"
            current.push(ch);
        } else if (ch == '\'' || ch == '\u{2019}') && !current.is_empty() && next.map_or(false, char::is_alphabetic) {
            current.push(ch);
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current, current_start);
        } else {
            flush_token(&mut tokens, &mut current, current_start);
            push_token(&mut tokens, ch.to_string(), i, i + 1);
        }
        i += 1;
    }
    flush_token(&mut tokens, &mut current, current_start);

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

/// Fecha o token acumulado (se não vazio), separando o possessivo final.
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize) {
    if text.is_empty() {
        return;
    }
    let len = text.chars().count();
    let lower = text.to_lowercase();
    if len > 2 && (lower.ends_with("'s") || lower.ends_with("\u{2019}s")) {
        let base: String = text.chars().take(len - 2).collect();
        let suffix: String = text.chars().skip(len - 2).collect();
        push_token(tokens, base, start, start + len - 2);
        push_token(tokens, suffix, start + len - 2, start + len);
    } else {
        push_token(tokens, text.clone(), start, start + len);
    }
    text.clear();
}

fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(texts("Alice lives in Paris."), ["Alice", "lives", "in", "Paris", "."]);
    }

    #[test]
    fn test_abbreviations_and_initialisms() {
        assert_eq!(texts("Dr. Who left the U.S. now"), ["Dr.", "Who", "left", "the", "U.S.", "now"]);
        assert_eq!(texts("Acme Inc. grew"), ["Acme", "Inc.", "grew"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("it costs 3.5 or 1,200 units"), ["it", "costs", "3.5", "or", "1,200", "units"]);
    }

    #[test]
    fn test_possessive_split() {
        let tokens = tokenize("Alice's cat");
        assert_eq!(tokens[0].text, "Alice");
        assert_eq!(tokens[1].text, "'s");
        assert_eq!((tokens[1].start, tokens[1].end), (5, 7));
    }

    #[test]
    fn test_char_offsets_with_accents() {
        let tokens = tokenize("Café in São Paulo");
        let paulo = tokens.iter().find(|t| t.text == "Paulo").unwrap();
        assert_eq!((paulo.start, paulo.end), (12, 17));
        assert_eq!(tokens.iter().map(|t| t.index).collect::<Vec<_>>(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_hyphen_and_punctuation() {
        assert_eq!(texts("Rolls-Royce - big!"), ["Rolls-Royce", "-", "big", "!"]);
    }
}
