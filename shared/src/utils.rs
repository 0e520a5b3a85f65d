// Text and number helpers shared by the engine and by report consumers.

pub mod text {
    use unicode_normalization::char::is_combining_mark;
    use unicode_normalization::UnicodeNormalization;

    /// Makes free-text account and institution names comparable across files.
    ///
    /// Decomposes the text, drops diacritics and every character that is not an
    /// ASCII letter, digit, underscore or whitespace, then uppercases and trims.
    /// Inner whitespace is kept as-is, so `"(I - II)"` becomes `"I  II"`.
    /// The output is ASCII and normalizing it again returns it unchanged.
    pub fn normalize_text<S: AsRef<str>>(text: S) -> String {
        let stripped: String = text
            .as_ref()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c.is_ascii_whitespace() {
                    Some(c.to_ascii_uppercase())
                } else if c.is_whitespace() {
                    Some(' ')
                } else {
                    None
                }
            })
            .collect();
        stripped.trim().to_string()
    }

    /// Absent cells normalize to the empty string.
    pub fn normalize_optional(text: Option<&str>) -> String {
        text.map(normalize_text).unwrap_or_default()
    }

    /// Trim + uppercase, keeping accents. Used for state and institution columns.
    pub fn normalize_label<S: AsRef<str>>(text: S) -> String {
        text.as_ref().trim().to_uppercase()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn accents_and_punctuation_are_ignored() {
            assert_eq!(
                normalize_text("Receita Corrente Líquida (III)"),
                normalize_text("RECEITA CORRENTE LIQUIDA III")
            );
            assert_eq!(normalize_text("Receita Corrente Líquida (III)"), "RECEITA CORRENTE LIQUIDA III");
        }

        #[test]
        fn reference_accounts_normalize_as_expected() {
            assert_eq!(
                normalize_text("RECEITA CORRENTE LÍQUIDA (III) = (I - II)"),
                "RECEITA CORRENTE LIQUIDA III  I  II"
            );
            assert_eq!(
                normalize_text("DESPESAS (EXCETO INTRA-ORÇAMENTÁRIAS) (I)"),
                "DESPESAS EXCETO INTRAORCAMENTARIAS I"
            );
        }

        #[test]
        fn normalization_is_idempotent() {
            let samples = [
                "  Receita Corrente Líquida (III) = (I - II)  ",
                "Transferências\u{00A0}Correntes",
                "Ação_Social 2023",
                "ÇÃÕÜ -- ½ ß",
                "",
            ];
            for sample in samples {
                let once = normalize_text(sample);
                assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", sample);
                assert!(once.is_ascii());
            }
        }

        #[test]
        fn non_ascii_whitespace_becomes_space() {
            assert_eq!(normalize_text("Transferências\u{00A0}Correntes"), "TRANSFERENCIAS CORRENTES");
        }

        #[test]
        fn underscore_and_digits_survive() {
            assert_eq!(normalize_text("conta_1.2.3"), "CONTA_123");
        }

        #[test]
        fn absent_text_is_empty() {
            assert_eq!(normalize_optional(None), "");
            assert_eq!(normalize_optional(Some("  ")), "");
            assert_eq!(normalize_optional(Some("Saúde")), "SAUDE");
        }

        #[test]
        fn label_keeps_accents() {
            assert_eq!(normalize_label("  Prefeitura de São Paulo "), "PREFEITURA DE SÃO PAULO");
            assert_eq!(normalize_label("sp"), "SP");
        }
    }
}

pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;

    // Parses decimals like "1.234,56" or "123,45" into f64
    pub fn parse_decimal(s: &str) -> Result<f64> {
        let normalized = s.trim()
            .replace('.', "")  // Remove thousand separators
            .replace(',', "."); // Replace decimal separator

        let value = f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Failed to parse decimal '{}': not a finite number", s));
        }
        Ok(value)
    }

    /// Lenient variant used on extract cells: currency symbols, spaces and any
    /// other stray characters are dropped before parsing, and anything that
    /// still fails becomes `None`. A `-` anywhere before the first digit
    /// makes the value negative, so "R$ -1.234,56" is -1234.56.
    pub fn coerce_decimal(s: &str) -> Option<f64> {
        let trimmed = s.trim();
        let first_digit = trimmed.find(|c: char| c.is_ascii_digit())?;
        let negative = trimmed[..first_digit].contains('-');
        let digits: String = trimmed[first_digit..]
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();
        let value = parse_decimal(&digits).ok()?;
        Some(if negative { -value } else { value })
    }

    /// How the numbers of one input file are written. Chosen per file, never
    /// guessed per cell: "1.234" is 1234 in Brazilian notation and 1.234 in plain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DecimalNotation {
        /// "1234.5", as spreadsheet exports write them.
        #[default]
        Plain,
        /// "1.234,5"
        Brazilian,
    }

    impl DecimalNotation {
        pub fn parse(&self, s: &str) -> Option<f64> {
            let trimmed = s.trim();
            match self {
                DecimalNotation::Plain => f64::from_str(trimmed).ok().filter(|v| v.is_finite()),
                DecimalNotation::Brazilian => coerce_decimal(trimmed),
            }
        }
    }

    /// Renders `1234567.891` as `"1.234.567,89"` for two decimals.
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        let formatted = format!("{:.decimals$}", value.abs(), decimals = decimals);
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (formatted.as_str(), None),
        };

        let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
        if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        if let Some(frac_part) = frac_part {
            out.push(',');
            out.push_str(frac_part);
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_decimal() {
            assert_eq!(parse_decimal("123,45").unwrap(), 123.45);
            assert_eq!(parse_decimal("1.234,56").unwrap(), 1234.56);
            assert_eq!(parse_decimal("600.822.115,84").unwrap(), 600822115.84);
        }

        #[test]
        fn test_parse_decimal_rejects_garbage() {
            let err = parse_decimal("abc").unwrap_err();
            assert!(err.to_string().contains("Failed to parse decimal 'abc'"));
            assert!(parse_decimal("").is_err());
            assert!(parse_decimal("inf").is_err());
        }

        #[test]
        fn test_coerce_decimal() {
            assert_eq!(coerce_decimal("1.234,56"), Some(1234.56));
            assert_eq!(coerce_decimal("R$ 1.234,56"), Some(1234.56));
            assert_eq!(coerce_decimal("-1.234,56"), Some(-1234.56));
            assert_eq!(coerce_decimal("0,00"), Some(0.0));
        }

        #[test]
        fn test_coerce_decimal_missing() {
            assert_eq!(coerce_decimal("abc"), None);
            assert_eq!(coerce_decimal(""), None);
            assert_eq!(coerce_decimal("-"), None);
            // Two decimal separators cannot be parsed.
            assert_eq!(coerce_decimal("1,2,3"), None);
        }

        #[test]
        fn test_coerce_decimal_sign_after_currency() {
            assert_eq!(coerce_decimal("R$ -1.234,56"), Some(-1234.56));
            assert_eq!(coerce_decimal("- 10,5"), Some(-10.5));
            // A dash after the first digit is not a sign.
            assert_eq!(coerce_decimal("10-5"), Some(105.0));
        }

        #[test]
        fn test_notation_is_chosen_per_file() {
            let brazilian = DecimalNotation::Brazilian;
            assert_eq!(brazilian.parse("1.234"), Some(1234.0));
            assert_eq!(brazilian.parse("1.234,0"), Some(1234.0));
            assert_eq!(brazilian.parse("n.d."), None);

            let plain = DecimalNotation::Plain;
            assert_eq!(plain.parse("1.234"), Some(1.234));
            assert_eq!(plain.parse(" 58 "), Some(58.0));
            assert_eq!(plain.parse("1.234,0"), None);
            assert_eq!(plain.parse("inf"), None);
            assert_eq!(plain.parse(""), None);
        }

        #[test]
        fn test_format_decimal() {
            assert_eq!(format_decimal(1234567.891, 2), "1.234.567,89");
            assert_eq!(format_decimal(123.4, 1), "123,4");
            assert_eq!(format_decimal(-1234.5, 2), "-1.234,50");
            assert_eq!(format_decimal(1000.0, 0), "1.000");
        }
    }
}
