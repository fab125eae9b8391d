//! Fixed advisory text per risk tier.

use serde::Serialize;

use super::risk::RiskTier;

/// Appended to every bundle.
pub const DISCLAIMER: &str =
    "This is a preliminary screening only and cannot replace a physician's diagnosis.";

/// Recommendation bundle shown with a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub headline: &'static str,
    pub summary: &'static str,
    pub recommendations: &'static [&'static str],
    pub disclaimer: &'static str,
}

const LOW: Advice = Advice {
    headline: "Within normal range",
    summary: "No combination of early puberty indicators was found.",
    recommendations: &[
        "Keep monitoring growth at routine check-ups.",
        "Re-measure height and weight every 6 to 12 months.",
        "Re-assess if new secondary sexual characteristics appear.",
    ],
    disclaimer: DISCLAIMER,
};

const MEDIUM: Advice = Advice {
    headline: "Some indicators of early puberty",
    summary: "One or more indicators are present. Closer follow-up is recommended.",
    recommendations: &[
        "Discuss the findings with a pediatrician.",
        "Re-measure height and weight within 3 to 6 months to assess growth velocity.",
        "Consider a hand and wrist X-ray for a bone age reading if none is available.",
    ],
    disclaimer: DISCLAIMER,
};

const HIGH: Advice = Advice {
    headline: "Risk of precocious puberty detected",
    summary: "Early age, significant secondary signs and advanced bone age are all present.",
    recommendations: &[
        "Consult a pediatric endocrinologist.",
        "Bring previous growth records and any bone age X-ray to the appointment.",
        "Hormonal evaluation may be requested by the specialist.",
    ],
    disclaimer: DISCLAIMER,
};

/// Advice bundle for `tier`.
#[must_use]
pub fn advice_for(tier: RiskTier) -> &'static Advice {
    match tier {
        RiskTier::Low => &LOW,
        RiskTier::Medium => &MEDIUM,
        RiskTier::High => &HIGH,
    }
}
