//! Period tokens accepted from callers.

use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// Whether a period ends now or at a calendar boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Fixed number of days ending at the current instant.
    Rolling,
    /// Aligned to local month or year boundaries.
    Calendar,
}

/// A named reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodToken {
    /// Last 7 days.
    #[serde(rename = "7days")]
    Last7Days,
    /// Last 30 days.
    #[default]
    #[serde(rename = "30days")]
    Last30Days,
    /// Last 90 days.
    #[serde(rename = "90days")]
    Last90Days,
    /// Last 365 days.
    #[serde(rename = "1year")]
    LastYear,
    /// The current calendar month.
    #[serde(rename = "current_month")]
    CurrentMonth,
    /// The previous calendar month.
    #[serde(rename = "last_month")]
    LastMonth,
    /// The three full months before the current one.
    #[serde(rename = "last_3_months")]
    Last3Months,
    /// The six full months before the current one.
    #[serde(rename = "last_6_months")]
    Last6Months,
    /// The current calendar year.
    #[serde(rename = "current_year")]
    CurrentYear,
}

impl PeriodToken {
    /// Every token.
    pub const ALL: [Self; 9] = [
        Self::Last7Days,
        Self::Last30Days,
        Self::Last90Days,
        Self::LastYear,
        Self::CurrentMonth,
        Self::LastMonth,
        Self::Last3Months,
        Self::Last6Months,
        Self::CurrentYear,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Last90Days => "90days",
            Self::LastYear => "1year",
            Self::CurrentMonth => "current_month",
            Self::LastMonth => "last_month",
            Self::Last3Months => "last_3_months",
            Self::Last6Months => "last_6_months",
            Self::CurrentYear => "current_year",
        }
    }

    /// Rolling or calendar semantics.
    #[must_use]
    pub const fn kind(self) -> PeriodKind {
        match self {
            Self::Last7Days | Self::Last30Days | Self::Last90Days | Self::LastYear => {
                PeriodKind::Rolling
            }
            Self::CurrentMonth
            | Self::LastMonth
            | Self::Last3Months
            | Self::Last6Months
            | Self::CurrentYear => PeriodKind::Calendar,
        }
    }

    /// Window length in days for rolling tokens.
    #[must_use]
    pub const fn rolling_days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::LastYear => Some(365),
            _ => None,
        }
    }
}

impl std::fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodToken {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.as_str() == s)
            .ok_or_else(|| PeriodError::UnknownToken(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_vocabularies() {
        assert_eq!("7days".parse(), Ok(PeriodToken::Last7Days));
        assert_eq!("1year".parse(), Ok(PeriodToken::LastYear));
        assert_eq!("last_3_months".parse(), Ok(PeriodToken::Last3Months));
        assert_eq!("current_year".parse(), Ok(PeriodToken::CurrentYear));
        assert_eq!(
            "fortnight".parse::<PeriodToken>(),
            Err(PeriodError::UnknownToken("fortnight".to_string()))
        );
    }

    #[test]
    fn test_kind_split() {
        let rolling: Vec<_> = PeriodToken::ALL
            .into_iter()
            .filter(|t| t.kind() == PeriodKind::Rolling)
            .collect();
        assert_eq!(rolling.len(), 4);
        assert!(rolling.iter().all(|t| t.rolling_days().is_some()));
        assert_eq!(PeriodToken::CurrentMonth.rolling_days(), None);
    }

    #[test]
    fn test_serde_matches_display() {
        for token in PeriodToken::ALL {
            let json = serde_json::to_string(&token).unwrap();
            assert_eq!(json, format!("\"{token}\""));
        }
    }
}
