use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation is the same string as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ReportStatus {
    AwaitingTriage => "awaiting_triage",
    Approved => "approved",
    Rejected => "rejected",
    NeedsClarification => "needs_clarification",
    EnRouteToScene => "en_route_to_scene",
    OnScene => "on_scene",
    EnRouteToHospital => "en_route_to_hospital",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ReportStatus {
    /// Completed, Rejected and Cancelled never transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Tag used at the start of every audit line, e.g. `EN_ROUTE_TO_SCENE`.
    pub fn note_tag(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }

    /// Human-readable label for notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingTriage => "Awaiting Triage",
            Self::Approved => "Approved / Team Dispatched",
            Self::Rejected => "Rejected / Non-Medical",
            Self::NeedsClarification => "Needs Patient Clarification",
            Self::EnRouteToScene => "Ambulance En Route to Scene",
            Self::OnScene => "Treating Patient on Scene",
            Self::EnRouteToHospital => "En Route to Hospital",
            Self::Completed => "Completed / Patient Handed Over",
            Self::Cancelled => "Cancelled",
        }
    }
}

str_enum!(Urgency {
    Critical => "critical",
    Urgent => "urgent",
    Stable => "stable",
});

str_enum!(IncidentCategory {
    GeneralEmergency => "general_emergency",
    Accident => "accident",
    PregnancyChildbirth => "pregnancy_childbirth",
    ElderlyChronicIllness => "elderly_chronic_illness",
    MedicalTransport => "medical_transport",
    Other => "other",
});

impl IncidentCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::GeneralEmergency => "General Emergency",
            Self::Accident => "Accident",
            Self::PregnancyChildbirth => "Pregnancy/Childbirth",
            Self::ElderlyChronicIllness => "Elderly/Chronic Illness",
            Self::MedicalTransport => "Medical Transport",
            Self::Other => "Other",
        }
    }
}

str_enum!(Role {
    Citizen => "citizen",
    Dispatcher => "dispatcher",
    ResponseTeam => "response_team",
    Leadership => "leadership",
});

str_enum!(UserStatus {
    Active => "active",
    Inactive => "inactive",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn report_status_round_trip() {
        for status in ReportStatus::ALL {
            assert_eq!(ReportStatus::from_str(status.as_str()).unwrap(), *status);
        }
        assert_eq!(ReportStatus::ALL.len(), 9);
    }

    #[test]
    fn terminal_statuses() {
        let terminal: Vec<_> = ReportStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .copied()
            .collect();
        assert_eq!(
            terminal,
            vec![
                ReportStatus::Rejected,
                ReportStatus::Completed,
                ReportStatus::Cancelled
            ]
        );
    }

    #[test]
    fn note_tag_is_screaming_snake() {
        assert_eq!(ReportStatus::EnRouteToHospital.note_tag(), "EN_ROUTE_TO_HOSPITAL");
        assert_eq!(ReportStatus::Approved.note_tag(), "APPROVED");
    }

    #[test]
    fn role_round_trip() {
        for (variant, s) in [
            (Role::Citizen, "citizen"),
            (Role::Dispatcher, "dispatcher"),
            (Role::ResponseTeam, "response_team"),
            (Role::Leadership, "leadership"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_storage_strings() {
        let json = serde_json::to_string(&IncidentCategory::PregnancyChildbirth).unwrap();
        assert_eq!(json, "\"pregnancy_childbirth\"");
        let back: Urgency = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(back, Urgency::Critical);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ReportStatus::from_str("Menunggu").is_err());
        assert!(Role::from_str("admin").is_err());
        assert!(UserStatus::from_str("").is_err());
    }
}
