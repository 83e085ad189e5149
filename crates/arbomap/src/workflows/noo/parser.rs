use std::io::Read;

use regex::Regex;

/// One catalog row with a recognised item code and a price.
#[derive(Debug)]
pub(crate) struct NooRow {
    pub(crate) item_code: String,
    pub(crate) label: String,
    pub(crate) unit: String,
    pub(crate) price_czk: i64,
}

/// Reads headerless rows: code, label, optional unit, and the price in the last numeric cell.
pub(crate) fn parse_rows<R: Read>(reader: R, item_code: &Regex) -> Result<Vec<NooRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        let (Some(code), Some(label)) = (record.get(0), record.get(1)) else {
            continue;
        };
        if code.is_empty() || label.is_empty() || !item_code.is_match(code) {
            continue;
        }

        let Some(price_czk) = record.iter().rev().find_map(coerce_price) else {
            continue;
        };
        let unit = record
            .get(2)
            .filter(|unit| !unit.is_empty())
            .unwrap_or("ks");

        rows.push(NooRow {
            item_code: code.to_string(),
            label: label.to_string(),
            unit: unit.to_string(),
            price_czk,
        });
    }

    Ok(rows)
}

/// Parses `1 250,60` style prices and rounds to whole crowns.
pub(crate) fn coerce_price(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then(|| value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn code_pattern() -> Regex {
        Regex::new(r"(?i)^ZE41[a-z]+$").expect("valid pattern")
    }

    #[test]
    fn coerce_price_accepts_czech_formatting() {
        assert_eq!(coerce_price("1 250,60"), Some(1251));
        assert_eq!(coerce_price("2400"), Some(2400));
        assert_eq!(coerce_price("\u{a0}980,4"), Some(980));
        assert_eq!(coerce_price("ks"), None);
        assert_eq!(coerce_price(""), None);
    }

    #[test]
    fn parse_rows_skips_headers_and_foreign_codes() {
        let csv = "\
Kód,Popis,MJ,Cena
ZE41a,Zdravotní řez do 50 m2,ks,\"2 400\"
ZE42a,Jiná činnost,ks,100
ZE41b,Zdravotní řez 51-100 m2,,\"3 900,00\"
ZE41c,Bez ceny,ks,
ZE41,Chybí písmeno,ks,10
";
        let rows = parse_rows(Cursor::new(csv), &code_pattern()).expect("parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item_code, "ZE41a");
        assert_eq!(rows[0].price_czk, 2400);
        assert_eq!(rows[0].unit, "ks");
        assert_eq!(rows[1].unit, "ks");
        assert_eq!(rows[1].price_czk, 3900);
    }

    #[test]
    fn price_is_taken_from_the_rightmost_numeric_cell() {
        let csv = "ZE41d,Bezpečnostní řez do 50 m2,ks,1500,1750,poznámka\n";
        let rows = parse_rows(Cursor::new(csv), &code_pattern()).expect("parses");
        assert_eq!(rows[0].price_czk, 1750);
    }
}
