//! Narrative content contracts for the reasoning backend.
//!
//! Prompts ask the backend for small JSON documents; responses that are
//! not parseable as the expected fields are recovered by truncating the
//! raw text into a best-effort field and filling the rest with fixed
//! defaults. Unavailability and call failures map to fixed, clearly
//! labeled fallback content — never to a propagated error.

use serde::Deserialize;

use crate::model::AttackKind;

/// Fixed label included in every unavailability fallback.
pub const NOT_CONFIGURED: &str = "Reasoning backend not configured";

/// Maximum characters carried over from unparseable backend text.
const RAW_TEXT_PREFIX: usize = 200;

/// Truncates to at most `n` characters, on a character boundary.
pub(crate) fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Extracts the outermost `{...}` block from free text, if any.
///
/// Backends often wrap JSON in prose or code fences; taking the first
/// opening brace through the last closing brace matches how the payloads
/// are actually produced.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ============================================================================
// Attack planning
// ============================================================================

/// A strategy/payload/impact triple for a staged attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPlan {
    /// Narrative attack approach
    pub strategy: String,
    /// Technical payload text
    pub payload: String,
    /// What the attack would reveal or compromise
    pub expected_impact: String,
}

#[derive(Deserialize)]
struct RawAttackPlan {
    strategy: String,
    payload: String,
    #[serde(rename = "expectedImpact")]
    expected_impact: String,
}

impl AttackPlan {
    /// Parses backend text, recovering from malformed output by
    /// truncating the raw text into the strategy field.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(block) = extract_json_object(text) {
            if let Ok(raw) = serde_json::from_str::<RawAttackPlan>(block) {
                return Self {
                    strategy: raw.strategy,
                    payload: raw.payload,
                    expected_impact: raw.expected_impact,
                };
            }
        }
        Self {
            strategy: truncate_chars(text, RAW_TEXT_PREFIX),
            payload: "Generated payload".to_string(),
            expected_impact: "System analysis".to_string(),
        }
    }

    /// Fixed fallback when no backend is configured.
    #[must_use]
    pub fn fallback_unavailable(kind: AttackKind) -> Self {
        Self {
            strategy: format!(
                "{NOT_CONFIGURED}. Connect a backend to generate {kind} attack strategies."
            ),
            payload: "Backend required".to_string(),
            expected_impact: "Configure a reasoning backend to generate real attack strategies"
                .to_string(),
        }
    }

    /// Fixed fallback when a configured backend fails the call.
    #[must_use]
    pub fn fallback_error(error: &str) -> Self {
        Self {
            strategy: format!("Backend error: {error}"),
            payload: "N/A".to_string(),
            expected_impact: "Check backend configuration and quota".to_string(),
        }
    }
}

/// Builds the attack-planning prompt for a kind and target.
#[must_use]
pub fn attack_prompt(kind: AttackKind, target: &str) -> String {
    format!(
        "You are a red team agent specializing in ethical penetration testing.\n\
         \n\
         ATTACK TYPE: {kind}\n\
         TARGET: {target}\n\
         \n\
         Generate a realistic attack strategy. Respond in JSON format:\n\
         {{\n\
           \"strategy\": \"Brief description of attack approach (2-3 sentences)\",\n\
           \"payload\": \"Technical payload or command (realistic but safe for simulation)\",\n\
           \"expectedImpact\": \"What this attack would reveal or compromise\"\n\
         }}\n\
         \n\
         Keep it technical and realistic for cybersecurity training."
    )
}

// ============================================================================
// Defense assessment
// ============================================================================

/// An analysis/mitigation/confidence triple for a detected attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenseAssessment {
    /// Technical analysis of the threat
    pub analysis: String,
    /// Defensive action to take
    pub mitigation: String,
    /// Confidence score, clamped to 0–100
    pub confidence: u8,
}

#[derive(Deserialize)]
struct RawDefenseAssessment {
    analysis: String,
    mitigation: String,
    confidence: i64,
}

/// Clamps a backend-supplied confidence into the 0–100 range.
const fn clamp_confidence(raw: i64) -> u8 {
    if raw < 0 {
        0
    } else if raw > 100 {
        100
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            raw as u8
        }
    }
}

impl DefenseAssessment {
    /// Parses backend text, recovering from malformed output by
    /// truncating the raw text into the analysis field.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(block) = extract_json_object(text) {
            if let Ok(raw) = serde_json::from_str::<RawDefenseAssessment>(block) {
                return Self {
                    analysis: raw.analysis,
                    mitigation: raw.mitigation,
                    confidence: clamp_confidence(raw.confidence),
                };
            }
        }
        Self {
            analysis: truncate_chars(text, RAW_TEXT_PREFIX),
            mitigation: "Defensive measures applied".to_string(),
            confidence: 75,
        }
    }

    /// Fixed fallback when no backend is configured.
    #[must_use]
    pub fn fallback_unavailable() -> Self {
        Self {
            analysis: format!("{NOT_CONFIGURED}. Connect a backend to enable threat analysis."),
            mitigation: "Connect a reasoning backend to enable automated defense".to_string(),
            confidence: 0,
        }
    }

    /// Fixed fallback when a configured backend fails the call.
    #[must_use]
    pub fn fallback_error(error: &str) -> Self {
        Self {
            analysis: format!("Backend error: {error}"),
            mitigation: "Check backend configuration".to_string(),
            confidence: 0,
        }
    }
}

/// Builds the defense-assessment prompt from the attack context.
#[must_use]
pub fn defense_prompt(kind: AttackKind, attack_details: &str) -> String {
    format!(
        "You are a blue team agent specializing in threat detection and response.\n\
         \n\
         THREAT DETECTED: {kind}\n\
         ATTACK DETAILS: {attack_details}\n\
         \n\
         Analyze this threat and respond in JSON format:\n\
         {{\n\
           \"analysis\": \"Technical analysis of the threat (2-3 sentences)\",\n\
           \"mitigation\": \"Specific defensive action to take\",\n\
           \"confidence\": 85\n\
         }}\n\
         \n\
         Confidence should be 0-100. Be specific and actionable."
    )
}

// ============================================================================
// Strategic summary and workflow steps
// ============================================================================

/// Builds the orchestrator-wide strategic assessment prompt.
#[must_use]
pub fn strategic_prompt(context: &str) -> String {
    format!(
        "You are the strategic orchestrator of a cybersecurity training exercise.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         TASK: Analyze the current red team attacks and blue team defenses. Provide:\n\
         1. Threat assessment (2-3 sentences)\n\
         2. Strategic recommendations for the blue team\n\
         3. System vulnerabilities identified\n\
         \n\
         Keep the response concise, technical, and actionable."
    )
}

/// Fixed fallback for the strategic assessment when no backend is
/// configured.
#[must_use]
pub fn strategic_fallback() -> String {
    format!("{NOT_CONFIGURED}. Connect a backend to enable strategic analysis.")
}

/// Builds the per-node prompt for a workflow step.
#[must_use]
pub fn node_prompt(label: &str, sub_label: Option<&str>, previous_output: &str) -> String {
    format!(
        "You are an autonomous cybersecurity agent named {label}.\n\
         Your role: {}.\n\
         Goal: process the input data, think step-by-step, and optionally use the \
         provided tools to achieve your objective.\n\
         Input data: {previous_output}\n\
         \n\
         Return a concise summary of your action and the result.",
        sub_label.unwrap_or("unspecified")
    )
}
