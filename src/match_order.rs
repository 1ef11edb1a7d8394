// Natural tournament order for round labels: numbered league matches first, then
// anything we can't place, then the knockout rounds.

/// Variant order is the sort order, so derived `Ord` does the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoundStage {
    Numbered(u32),
    Unrecognized,
    Qualifier,
    SemiFinal,
    Final,
}

impl RoundStage {
    // The order of these checks matters: "Final Eliminator" is a final, "Semi-final" is not.
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();

        if label.contains("final") && !label.contains("semi") {
            return Self::Final;
        }
        if label.contains("semi") {
            return Self::SemiFinal;
        }
        if label.contains("qualifier") || label.contains("eliminator") {
            return Self::Qualifier;
        }

        match first_number(&label) {
            Some(n) => Self::Numbered(n),
            None => Self::Unrecognized,
        }
    }

    /// Integer form of the stage. Match numbers are clamped so they never reach the named rounds.
    pub fn sort_key(self) -> u32 {
        match self {
            Self::Final => 9999,
            Self::SemiFinal => 9998,
            Self::Qualifier => 9997,
            Self::Unrecognized => 9996,
            Self::Numbered(n) => n.min(9995),
        }
    }
}

pub fn match_sort_key(label: &str) -> u32 {
    RoundStage::classify(label).sort_key()
}

/// Stable sort, so rounds of the same stage keep their table order.
pub fn sort_by_round<T, F>(items: &mut [T], round: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_key(|item| RoundStage::classify(round(item)));
}

fn first_number(label: &str) -> Option<u32> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..].chars().take_while(|c| c.is_ascii_digit()).collect();

    digits.parse().ok()
}
