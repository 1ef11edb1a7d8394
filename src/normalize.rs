// Legacy and alias spellings, already trimmed and upper-cased, mapped to the name the team plays under now.
// Deccan Chargers stays distinct from Sunrisers Hyderabad.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("KINGS XI PUNJAB", "PUNJAB KINGS"),
    ("DELHI DAREDEVILS", "DELHI CAPITALS"),
    ("DECCAN CHARGERS", "DECCAN CHARGERS"),
    ("RISING PUNE SUPERGIANT", "RISING PUNE SUPERGIANTS"),
    ("ROYAL CHALLENGERS BANGALORE", "ROYAL CHALLENGERS BENGALURU"),
];

/// Trims, upper-cases and resolves aliases, so every spelling of a team ends up as one identifier.
pub fn normalize_team_name(name: &str) -> String {
    let name = name.trim().to_uppercase();

    TEAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(name)
}

/// Missing values pass through untouched. A cell holding only whitespace counts as missing.
pub fn normalize_team(name: Option<&str>) -> Option<String> {
    name.map(normalize_team_name).filter(|n| !n.is_empty())
}
