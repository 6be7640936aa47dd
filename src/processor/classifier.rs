use std::collections::BTreeSet;

/// Maps a geocoded county string to a configured service-area token.
///
/// The geocoder formats counties as `"<Name> County"`, so the first
/// whitespace-separated token is the canonical name. Matching is exact and
/// case-sensitive. Blank input never matches.
pub fn classify<'a>(raw_county: &str, service_areas: &'a BTreeSet<String>) -> Option<&'a str> {
    // TODO: multi-word county names ("New Hanover County") only match on their
    // first word; needs a normalization rule keyed on the trailing "County".
    let token = raw_county.split_whitespace().next()?;
    service_areas.get(token).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_matches_first_token() {
        let areas = areas(&["Forsyth", "Guilford"]);
        assert_eq!(classify("Forsyth County", &areas), Some("Forsyth"));
        assert_eq!(classify("  Guilford   County ", &areas), Some("Guilford"));
    }

    #[test]
    fn test_outside_service_area() {
        assert_eq!(classify("Mecklenburg County", &areas(&["Forsyth"])), None);
    }

    #[test]
    fn test_blank_county_is_no_match() {
        let areas = areas(&["Forsyth"]);
        assert_eq!(classify("", &areas), None);
        assert_eq!(classify(" \t ", &areas), None);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(classify("forsyth County", &areas(&["Forsyth"])), None);
    }
}
