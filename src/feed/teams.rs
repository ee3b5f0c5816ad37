//! Kalshi ticker team codes to ESPN abbreviations
//!
//! Only codes that differ are listed; anything else passes through
//! uppercased.

use crate::common::types::League;

const NBA: &[(&str, &str)] = &[
    ("BRK", "BKN"),
    ("GS", "GSW"),
    ("CHO", "CHA"),
    ("NO", "NOP"),
    ("NY", "NYK"),
    ("PHO", "PHX"),
    ("SA", "SAS"),
];

// Shared by the men's and women's college series
const NCAA: &[(&str, &str)] = &[
    ("CLT", "CHAR"),
    ("L-MD", "LMD"),
    ("OMA", "NEOM"),
    ("DETM", "DET"),
    ("CLE", "CLEV"),
    ("WGA", "UWGA"),
    ("EKU", "EKY"),
    ("VAL", "VALP"),
    ("APSU", "PEAY"),
    ("GCU", "GC"),
    ("TXAM", "TA&M"),
    ("NW", "NU"),
    ("AF", "AFA"),
    ("SBU", "SBON"),
    ("M-OH", "MOH"),
    ("LUC", "LCHI"),
    ("IU", "IND"),
    ("PRES", "PRE"),
    ("UPST", "UNF"),
    ("GWEB", "WEBB"),
    ("JAX", "JAC"),
    ("STMN", "STET"),
    ("KC", "UMKC"),
    ("BOIS", "BSU"),
    ("BUF", "BUFF"),
    ("EMU", "MOH"),
    ("DAY", "LCHI"),
    ("NU", "NW"),
];

fn table(league: League) -> &'static [(&'static str, &'static str)] {
    match league {
        League::Nba => NBA,
        League::Ncaabbm | League::Ncaabbw => NCAA,
    }
}

/// ESPN code for a Kalshi team code
pub fn normalize(league: League, code: &str) -> String {
    let code = code.trim().to_uppercase();
    table(league)
        .iter()
        .find(|(kalshi, _)| *kalshi == code)
        .map(|(_, espn)| (*espn).to_string())
        .unwrap_or(code)
}

/// YES-side team code from a market ticker (its last segment)
///
/// `KXNBAGAME-26FEB25BKNLAC-BKN` → `BKN`
pub fn yes_team_from_ticker(ticker: &str) -> String {
    ticker
        .rsplit('-')
        .next()
        .unwrap_or(ticker)
        .trim()
        .to_uppercase()
}

/// Event ticker (the game) from a market ticker
///
/// `KXNBAGAME-26FEB25BKNLAC-BKN` → `KXNBAGAME-26FEB25BKNLAC`
pub fn event_ticker(ticker: &str) -> Option<&str> {
    let (event, team) = ticker.rsplit_once('-')?;
    if event.contains('-') && !team.is_empty() {
        Some(event)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nba_codes() {
        assert_eq!(normalize(League::Nba, "BRK"), "BKN");
        assert_eq!(normalize(League::Nba, "gs"), "GSW");
        assert_eq!(normalize(League::Nba, "LAC"), "LAC");
    }

    #[test]
    fn test_college_leagues_share_table() {
        assert_eq!(normalize(League::Ncaabbm, "TXAM"), "TA&M");
        assert_eq!(normalize(League::Ncaabbw, "TXAM"), "TA&M");
        assert_eq!(normalize(League::Ncaabbm, "DUKE"), "DUKE");
        // NBA table does not apply to college games
        assert_eq!(normalize(League::Ncaabbm, "GS"), "GS");
    }

    #[test]
    fn test_yes_team_from_ticker() {
        assert_eq!(yes_team_from_ticker("KXNBAGAME-26FEB25BKNLAC-BKN"), "BKN");
        assert_eq!(yes_team_from_ticker("kxncaambgame-26mar05dukeunc-duke"), "DUKE");
    }

    #[test]
    fn test_event_ticker() {
        assert_eq!(
            event_ticker("KXNBAGAME-26FEB25BKNLAC-BKN"),
            Some("KXNBAGAME-26FEB25BKNLAC")
        );
        assert_eq!(event_ticker("KXNBAGAME"), None);
        assert_eq!(event_ticker("KXNBAGAME-26FEB25BKNLAC"), None);
    }
}
