use logos::Logos;

/// Words are runs of anything that is not whitespace or `, ! . ?`.
#[derive(Logos, Debug)]
#[logos(skip r"[\s,!.?]+")]
enum RawToken {
    #[regex(r"[^\s,!.?]+")]
    Word,
}

/// Split raw player input into lowercase word tokens.
///
/// Whitespace and the punctuation `, ! . ?` separate words; empty tokens
/// are dropped, so blank input yields an empty list.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(input);
    while let Some(result) = lexer.next() {
        if let Ok(RawToken::Word) = result {
            tokens.push(lexer.slice().to_lowercase());
        }
    }
    tokens
}
