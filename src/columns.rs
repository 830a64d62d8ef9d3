/// Finds the column for a field whose header wording varies between exports.
///
/// Columns are scanned in table order and each one is checked against every
/// keyword, so an earlier column wins even if it only matches a lower priority
/// keyword. Matching is a case-insensitive substring test.
pub fn resolve_column<'a, K>(columns: &'a [String], keywords: &[K]) -> Option<&'a str>
where
    K: AsRef<str>,
{
    let keywords: Vec<String> = keywords
        .iter()
        .map(|keyword| keyword.as_ref().to_lowercase())
        .collect();

    columns
        .iter()
        .find(|column| {
            let lowered = column.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
        })
        .map(|column| column.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn finds_column_containing_keyword() {
        let cols = columns(&["X preenchidas AA 2023", "Y"]);
        let found = resolve_column(&cols, &["preenchidas AA", "vagas AA preenchidas"]);
        assert_eq!(found, Some("X preenchidas AA 2023"));
    }

    #[test]
    fn column_order_beats_keyword_order() {
        let cols = columns(&["Aprovados AC (ampla)", "Candidatos aprovados na AC"]);
        let found = resolve_column(&cols, &["aprovados na AC", "aprovados AC"]);
        assert_eq!(found, Some("Aprovados AC (ampla)"));
    }

    #[test]
    fn matching_ignores_case_including_accents() {
        let cols = columns(&["PROGRAMA", "CONTEMPLAVA APÓS A RESOLUÇÃO?"]);
        assert_eq!(
            resolve_column(&cols, &["após a Resolução"]),
            Some("CONTEMPLAVA APÓS A RESOLUÇÃO?")
        );
    }

    #[test]
    fn returns_none_without_match() {
        let cols = columns(&["Programa", "Modalidade"]);
        assert_eq!(resolve_column(&cols, &["antes da IN"]), None);
        assert_eq!(resolve_column::<&str>(&cols, &[]), None);
    }
}
