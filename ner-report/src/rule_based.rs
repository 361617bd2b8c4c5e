//! # Motor de Regras: Gazetteers, Gatilhos e Padrões Regex
//!
//! Backend padrão de [`Tagger`]: um pacote de modelo ([`ModelPackage`]) é
//! compilado em um conjunto de regras aplicadas em ordem de prioridade:
//!
//! 1. **Gazetteer**: maior casamento de n-gramas conhecidos, começando em token capitalizado.
//! 2. **Título**: "Dr. Jane Smith" → "Jane Smith" recebe o label do gatilho.
//! 3. **Sufixo de organização**: "Acme Widgets Ltd." → ORG.
//! 4. **Padrões regex**: datas, valores monetários, percentuais etc., sobre o texto bruto.
//!
//! Um token marcado por uma regra não é reaproveitado pelas seguintes, então a
//! saída deste backend não tem sobreposição e sai ordenada pelo offset inicial.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::Result;
use crate::model::{RawSpan, Tagger};
use crate::offsets::OffsetMap;
use crate::package::ModelPackage;
use crate::tokenizer::{tokenize, Token};

/// Máximo de tokens capitalizados após um título
const MAX_TITLE_RUN: usize = 3;
/// Máximo de tokens capitalizados antes de um sufixo de organização
const MAX_ORG_RUN: usize = 4;
/// Palavras descartadas no início de um nome de organização ("The Acme Corp")
const LEADING_STOPWORDS: &[&str] = &["the", "a", "an"];

#[derive(Debug, Clone)]
struct GazetteerEntry {
    parts: Vec<String>,
    /// primeiro token como escrito no pacote ("iPhone")
    surface: String,
    label: String,
}

/// Span em índices de token `[start, end)`
#[derive(Debug, Clone)]
struct TokenSpan {
    start: usize,
    end: usize,
    label: String,
}

/// Tagger baseado em regras compilado a partir de um [`ModelPackage`].
pub struct RuleTagger {
    /// primeiro token normalizado → entradas (mais longas primeiro)
    gazetteer: HashMap<String, Vec<GazetteerEntry>>,
    /// gatilho normalizado → label
    titles: HashMap<String, String>,
    org_suffixes: HashSet<String>,
    patterns: Vec<(Regex, String)>,
    labels: Vec<String>,
}

impl RuleTagger {
    /// Compila o pacote. Falha apenas se algum regex for inválido.
    pub fn compile(package: &ModelPackage) -> std::result::Result<Self, regex::Error> {
        let mut gazetteer: HashMap<String, Vec<GazetteerEntry>> = HashMap::new();
        for (label, names) in &package.gazetteer {
            for name in names {
                let tokens = tokenize(name);
                let parts: Vec<String> = tokens.iter().map(Token::normalized).collect();
                if let (Some(first), Some(surface)) = (parts.first(), tokens.first()) {
                    gazetteer.entry(first.clone()).or_default().push(GazetteerEntry {
                        parts: parts.clone(),
                        surface: surface.text.clone(),
                        label: label.clone(),
                    });
                }
            }
        }
        for entries in gazetteer.values_mut() {
            entries.sort_by(|a, b| b.parts.len().cmp(&a.parts.len()));
        }

        let mut titles = HashMap::new();
        for (label, words) in &package.titles {
            for word in words {
                titles
                    .entry(word.trim_end_matches('.').to_lowercase())
                    .or_insert_with(|| label.clone());
            }
        }

        let org_suffixes = package
            .org_suffixes
            .iter()
            .map(|s| s.trim_end_matches('.').to_lowercase())
            .collect();

        let patterns = package
            .patterns
            .iter()
            .map(|p| Regex::new(&p.regex).map(|re| (re, p.label.clone())))
            .collect::<std::result::Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            gazetteer,
            titles,
            org_suffixes,
            patterns,
            labels: package.labels(),
        })
    }

    /// Aplica as regras sobre os tokens, devolvendo spans em índices de token.
    fn apply_token_rules(&self, tokens: &[Token]) -> Vec<TokenSpan> {
        let norm: Vec<String> = tokens.iter().map(Token::normalized).collect();
        let mut claimed = vec![false; tokens.len()];
        let mut spans = Vec::new();

        // 1. Gazetteer (maior casamento primeiro). Começa em token capitalizado,
        // numérico ou escrito exatamente como no pacote ("iPhone").
        let mut i = 0;
        while i < tokens.len() {
            let starts_entity = tokens[i].is_capitalized()
                || tokens[i].text.chars().next().map_or(false, |c| c.is_ascii_digit());
            let matched = self.gazetteer.get(&norm[i]).and_then(|entries| {
                entries.iter().find(|entry| {
                    let len = entry.parts.len();
                    (starts_entity || tokens[i].text == entry.surface)
                        && i + len <= tokens.len()
                        && entry.parts.iter().enumerate().all(|(j, part)| norm[i + j] == *part)
                })
            });

            if let Some(entry) = matched {
                let end = i + entry.parts.len();
                claim(&mut claimed, i, end);
                spans.push(TokenSpan { start: i, end, label: entry.label.clone() });
                i = end;
            } else {
                i += 1;
            }
        }

        // 2. Título: "President Lincoln" → Lincoln é PERSON
        for i in 0..tokens.len().saturating_sub(1) {
            let Some(label) = self.titles.get(&norm[i]) else {
                continue;
            };
            let mut end = i + 1;
            while end < tokens.len()
                && end - (i + 1) < MAX_TITLE_RUN
                && !claimed[end]
                && tokens[end].is_capitalized()
            {
                end += 1;
            }
            if end > i + 1 {
                claim(&mut claimed, i + 1, end);
                spans.push(TokenSpan { start: i + 1, end, label: label.clone() });
            }
        }

        // 3. Sufixo de organização: "Acme Corp." → ORG
        for i in 1..tokens.len() {
            if claimed[i] || !tokens[i].is_capitalized() || !self.org_suffixes.contains(&norm[i]) {
                continue;
            }
            let mut start = i;
            while start > 0
                && i - start < MAX_ORG_RUN
                && !claimed[start - 1]
                && tokens[start - 1].is_capitalized()
            {
                start -= 1;
            }
            while start < i && LEADING_STOPWORDS.contains(&norm[start].as_str()) {
                start += 1;
            }
            // sufixos encadeados: "Acme Co. Ltd."
            let mut end = i + 1;
            while end < tokens.len()
                && !claimed[end]
                && tokens[end].is_capitalized()
                && self.org_suffixes.contains(&norm[end])
            {
                end += 1;
            }
            // "Co. Ltd." sozinho não nomeia ninguém
            let only_suffixes = (start..end).all(|k| self.org_suffixes.contains(&norm[k]));
            if start < i && !only_suffixes {
                claim(&mut claimed, start, end);
                spans.push(TokenSpan { start, end, label: "ORG".to_string() });
            }
        }

        spans
    }
}

fn claim(claimed: &mut [bool], start: usize, end: usize) {
    for slot in &mut claimed[start..end] {
        *slot = true;
    }
}

impl Tagger for RuleTagger {
    fn tag(&self, text: &str) -> Result<Vec<RawSpan>> {
        let map = OffsetMap::new(text);
        let tokens = tokenize(text);

        let mut spans: Vec<RawSpan> = Vec::new();
        for ts in self.apply_token_rules(&tokens) {
            let start = tokens[ts.start].start;
            let end = tokens[ts.end - 1].end;
            if let Some(fragment) = map.slice(text, start, end) {
                spans.push(RawSpan::new(fragment, ts.label, start, end));
            }
        }

        // 4. Padrões regex sobre o texto bruto, sem invadir trechos já marcados
        for (regex, label) in &self.patterns {
            for m in regex.find_iter(text) {
                let (Some(start), Some(end)) = (map.to_char(m.start()), map.to_char(m.end())) else {
                    continue;
                };
                if start == end || spans.iter().any(|s| start < s.end && s.start < end) {
                    continue;
                }
                spans.push(RawSpan::new(m.as_str(), label.clone(), start, end));
            }
        }

        spans.sort_by_key(|s| (s.start, s.end));
        Ok(spans)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PatternRule;
    use std::collections::BTreeMap;

    fn package() -> ModelPackage {
        let mut gazetteer = BTreeMap::new();
        gazetteer.insert("GPE".to_string(), vec!["Paris".to_string(), "New York".to_string()]);
        gazetteer.insert("ORG".to_string(), vec!["Apple".to_string(), "Apple Inc.".to_string()]);
        gazetteer.insert("PERSON".to_string(), vec!["Alice".to_string()]);
        gazetteer.insert("PRODUCT".to_string(), vec!["iPhone".to_string(), "iPhone Pro".to_string()]);
        let mut titles = BTreeMap::new();
        titles.insert("PERSON".to_string(), vec!["dr".to_string(), "president".to_string()]);

        ModelPackage {
            name: "test".to_string(),
            version: "0".to_string(),
            lang: "en".to_string(),
            description: String::new(),
            gazetteer,
            titles,
            org_suffixes: vec!["ltd".to_string(), "corp".to_string(), "co".to_string()],
            patterns: vec![PatternRule {
                label: "DATE".to_string(),
                regex: r"\b(?:19|20)\d{2}\b".to_string(),
            }],
        }
    }

    fn tag(text: &str) -> Vec<(String, String, usize, usize)> {
        let tagger = RuleTagger::compile(&package()).unwrap();
        tagger
            .tag(text)
            .unwrap()
            .into_iter()
            .map(|s| (s.text, s.label, s.start, s.end))
            .collect()
    }

    #[test]
    fn test_gazetteer_longest_match() {
        let spans = tag("Apple Inc. opened an office in New York.");
        assert_eq!(spans[0], ("Apple Inc.".to_string(), "ORG".to_string(), 0, 10));
        assert_eq!(spans[1], ("New York".to_string(), "GPE".to_string(), 31, 39));
    }

    #[test]
    fn test_gazetteer_requires_capital() {
        // "paris" minúsculo não é nome próprio
        assert!(tag("plaster of paris").is_empty());
    }

    #[test]
    fn test_gazetteer_lowercase_initial_entry() {
        let spans = tag("Apple sold the iPhone and the iPhone Pro in 2019");
        assert_eq!(spans[1], ("iPhone".to_string(), "PRODUCT".to_string(), 15, 21));
        assert_eq!(spans[2], ("iPhone Pro".to_string(), "PRODUCT".to_string(), 30, 40));
        // grafia diferente da do pacote não casa
        assert!(tag("an iphone case").is_empty());
    }

    #[test]
    fn test_title_pattern() {
        let spans = tag("yesterday Dr. Jane Doe spoke");
        assert_eq!(spans, vec![("Jane Doe".to_string(), "PERSON".to_string(), 14, 22)]);
    }

    #[test]
    fn test_org_suffix_pattern() {
        let spans = tag("The Blue Widget Corp. hired staff");
        assert_eq!(spans, vec![("Blue Widget Corp.".to_string(), "ORG".to_string(), 4, 21)]);
    }

    #[test]
    fn test_org_suffix_needs_a_name() {
        let spans = tag("Alice's Co. Ltd. closed");
        assert_eq!(spans, vec![("Alice".to_string(), "PERSON".to_string(), 0, 5)]);

        let spans = tag("Acme Co. Ltd. closed");
        assert_eq!(spans, vec![("Acme Co. Ltd.".to_string(), "ORG".to_string(), 0, 13)]);
    }

    #[test]
    fn test_regex_does_not_overlap_claimed_tokens() {
        let spans = tag("Alice visited Paris in 2019");
        let labels: Vec<&str> = spans.iter().map(|s| s.1.as_str()).collect();
        assert_eq!(labels, ["PERSON", "GPE", "DATE"]);
        assert_eq!(spans[2].2, 23);
    }

    #[test]
    fn test_multibyte_offsets() {
        let spans = tag("Café near Paris");
        assert_eq!(spans, vec![("Paris".to_string(), "GPE".to_string(), 10, 15)]);
    }

    #[test]
    fn test_invalid_regex_fails_compile() {
        let mut pkg = package();
        pkg.patterns.push(PatternRule { label: "X".to_string(), regex: "(".to_string() });
        assert!(RuleTagger::compile(&pkg).is_err());
    }
}
