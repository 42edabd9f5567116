//! Wizard steps and their linear ordering.

/// The four wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    GeneralInfo,
    Rules,
    Rewards,
    Review,
}

pub const ALL_STEPS: [WizardStep; 4] = [
    WizardStep::GeneralInfo,
    WizardStep::Rules,
    WizardStep::Rewards,
    WizardStep::Review,
];

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::GeneralInfo;
    pub const LAST: WizardStep = WizardStep::Review;

    /// 1-based position, as shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::GeneralInfo => 1,
            WizardStep::Rules => 2,
            WizardStep::Rewards => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WizardStep::GeneralInfo),
            2 => Some(WizardStep::Rules),
            3 => Some(WizardStep::Rewards),
            4 => Some(WizardStep::Review),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::GeneralInfo => "General information",
            WizardStep::Rules => "Rules",
            WizardStep::Rewards => "Rewards",
            WizardStep::Review => "Review",
        }
    }

    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    pub fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::FIRST)
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }
}
