use std::collections::BTreeSet;

use crate::models::GroupTag;

const PLACEHOLDER: &str = "*";

fn keywords(tag: GroupTag) -> &'static [&'static str] {
    match tag {
        GroupTag::Black => &["NEGRO", "NEGRA", "PRETO", "PRETA", "PARDO", "PARDA"],
        GroupTag::Indigenous => &["INDÍGENA", "INDIGENA"],
        GroupTag::Disabled => &["PCD", "DEFICIÊNCIA", "DEFICIENCIA"],
        GroupTag::Quilombola => &["QUILOMBOLA"],
        GroupTag::Trans => &["PESSOAS TRANS", "TRANSEXU", "TRANSGÊN", "TRANSGEN", "TRAVESTI"],
    }
}

/// Groups mentioned in a free-text description cell.
pub fn detect_groups(cell: Option<&str>) -> BTreeSet<GroupTag> {
    let text = match cell.map(str::trim) {
        Some(text) if !text.is_empty() && text != PLACEHOLDER => text.to_uppercase(),
        _ => return BTreeSet::new(),
    };

    GroupTag::ALL
        .into_iter()
        .filter(|tag| keywords(*tag).iter().any(|keyword| text.contains(keyword)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_placeholder_cells_have_no_groups() {
        assert!(detect_groups(None).is_empty());
        assert!(detect_groups(Some("")).is_empty());
        assert!(detect_groups(Some("   ")).is_empty());
        assert!(detect_groups(Some("*")).is_empty());
    }

    #[test]
    fn detects_multiple_groups_in_one_cell() {
        let groups = detect_groups(Some("Negros e Indígenas"));
        assert_eq!(
            groups,
            BTreeSet::from([GroupTag::Black, GroupTag::Indigenous])
        );
    }

    #[test]
    fn disabled_matches_either_spelling() {
        assert!(detect_groups(Some("pcd")).contains(&GroupTag::Disabled));
        assert!(detect_groups(Some("pessoas com deficiência")).contains(&GroupTag::Disabled));
    }

    #[test]
    fn autism_spectrum_is_not_read_as_trans() {
        let groups = detect_groups(Some("Pessoas com transtorno do espectro autista"));
        assert!(!groups.contains(&GroupTag::Trans));
    }

    #[test]
    fn trans_matches_specific_terms() {
        for cell in ["Pessoas trans", "transexuais e travestis", "Transgêneros"] {
            assert_eq!(detect_groups(Some(cell)), BTreeSet::from([GroupTag::Trans]), "{cell}");
        }
    }

    #[test]
    fn full_list_yields_every_group() {
        let groups = detect_groups(Some(
            "Pretos, pardos, indígenas, quilombolas, PcD e pessoas trans",
        ));
        assert_eq!(groups.len(), GroupTag::ALL.len());
    }
}
