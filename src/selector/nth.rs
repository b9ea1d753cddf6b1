//! An+B expressions for `:nth-child` and `:nth-of-type`

/// Parsed positional expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nth {
    Odd,
    Even,
    /// Exact 1-based position
    Index(i64),
    /// `An+B`
    Formula { a: i64, b: i64 },
}

impl Nth {
    /// Parse an An+B argument. Whitespace is ignored and keywords are
    /// case-insensitive. Returns `None` for empty or invalid input.
    pub fn parse(input: &str) -> Option<Nth> {
        let expr: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match expr.as_str() {
            "" => None,
            "odd" => Some(Nth::Odd),
            "even" => Some(Nth::Even),
            _ => match expr.find('n') {
                None => parse_signed(&expr).map(Nth::Index),
                Some(n) => {
                    let a = match &expr[..n] {
                        "" | "+" => 1,
                        "-" => -1,
                        digits => parse_signed(digits)?,
                    };
                    let b = match &expr[n + 1..] {
                        "" => 0,
                        rest if rest.starts_with(['+', '-']) => parse_signed(rest)?,
                        _ => return None,
                    };
                    Some(Nth::Formula { a, b })
                }
            },
        }
    }

    /// XPath predicate over `position()`
    pub fn to_predicate(self) -> String {
        match self {
            Nth::Odd => "position() mod 2 = 1 and position() >= 1".to_string(),
            Nth::Even => "position() mod 2 = 0 and position() >= 0".to_string(),
            Nth::Index(index) => format!("position() = {index}"),
            Nth::Formula { a: 0, b } => format!("position() = {b}"),
            Nth::Formula { a, b } if a > 0 => format!(
                "(position() {}) mod {a} = 0 and position() >= {b}",
                offset(b)
            ),
            Nth::Formula { a, b } => format!(
                "(position() {}) mod {} = 0 and position() <= {b}",
                offset(b),
                a.unsigned_abs()
            ),
        }
    }
}

/// `position() - b`, written with the sign folded in
fn offset(b: i64) -> String {
    if b < 0 {
        format!("+ {}", b.unsigned_abs())
    } else {
        format!("- {b}")
    }
}

fn parse_signed(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
