//! Deterministic fallback used when the model path is unavailable.
//!
//! Three independent passes are summed against a base of 50:
//! 1. Technology keywords from `technologies` / `techStack` (capped at 45)
//! 2. Narrative quality of `motivation` / `about`
//! 3. Years of experience from `yearsExperience`
//!
//! The total is clamped to 0–95, so the fallback never reports full confidence.

use serde_json::{Map, Value};

use crate::evaluation::types::{
    preview, Decision, EvaluationMetadata, EvaluationOutput, EvaluationSource, SubmissionInput,
};

const BASE_SCORE: i32 = 50;
const MAX_SCORE: i32 = 95;
const TECH_SCORE_CAP: i32 = 45;
const UNKNOWN_TECH_POINTS: i32 = 1;

const KEYWORD_WEIGHTS: [(&str, i32); 10] = [
    ("react", 10),
    ("next", 10),
    ("typescript", 8),
    ("prisma", 6),
    ("postgres", 5),
    ("node", 5),
    ("graphql", 4),
    ("tailwind", 3),
    ("ai", 4),
    ("leadership", 3),
];

pub const FALLBACK_NOTE: &str = "Fallback heuristics used.";

// ────────────────────────────────────────────────────────────────────────────
// Signals
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechSignals {
    pub score: i32,
    /// Recognized technologies, in answer order.
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrativeSignals {
    pub score: i32,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceSignals {
    pub score: i32,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

/// Scores a comma/newline separated technology list.
pub fn score_technologies(raw: Option<&Value>) -> TechSignals {
    let text = match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => return TechSignals::default(),
    };

    let mut signals = TechSignals::default();
    for tech in text
        .split(['\n', ','])
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
    {
        match KEYWORD_WEIGHTS.iter().find(|(k, _)| *k == tech) {
            Some((_, weight)) => {
                signals.score += weight;
                signals.highlights.push(tech);
            }
            None => signals.score += UNKNOWN_TECH_POINTS,
        }
    }
    signals.score = signals.score.min(TECH_SCORE_CAP);
    signals
}

/// Scores a free-text motivation answer.
///
/// The checks are independent: a text can earn the length bonus and the sentence bonus,
/// or a keyword bonus together with the short-answer penalty.
pub fn score_narrative(raw: Option<&Value>) -> NarrativeSignals {
    let value = raw.and_then(Value::as_str).unwrap_or_default();
    if value.is_empty() {
        return NarrativeSignals {
            score: -10,
            strengths: vec![],
            risks: vec!["Missing motivation statement".to_string()],
        };
    }

    let length = value.chars().count();
    let sentences = value
        .split(['.', '!', '?'])
        .filter(|s| s.trim().chars().count() > 5)
        .count();
    let lower = value.to_lowercase();

    let mut signals = NarrativeSignals::default();

    if length > 200 {
        signals.score += 12;
        signals.strengths.push("Provides detailed motivation".to_string());
    }
    if sentences >= 4 {
        signals.score += 10;
        signals.strengths.push("Communicates in complete thoughts".to_string());
    }
    if lower.contains("team") {
        signals.score += 4;
        signals.strengths.push("Mentions collaborative work".to_string());
    }
    if lower.contains("learning") {
        signals.score += 3;
        signals.strengths.push("Highlights growth mindset".to_string());
    }
    if length < 80 {
        signals.score -= 8;
        signals.risks.push("Response is too short".to_string());
    }

    signals
}

/// Scores a numeric years-of-experience answer. Anything but a JSON number is ignored.
pub fn score_experience(raw: Option<&Value>) -> ExperienceSignals {
    let mut signals = ExperienceSignals::default();
    let Some(years) = raw.and_then(Value::as_f64) else {
        return signals;
    };

    if years >= 5.0 {
        signals.score += 12;
        signals
            .strengths
            .push("5+ years of hands-on experience".to_string());
    } else if years >= 2.0 {
        signals.score += 8;
    } else {
        signals.score -= 5;
        signals.risks.push("Limited commercial experience".to_string());
    }
    signals
}

// ────────────────────────────────────────────────────────────────────────────
// Combined evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Scores a submission without any I/O. Identical input always yields identical output.
pub fn evaluate_heuristically(input: &SubmissionInput) -> EvaluationOutput {
    let answers = &input.answers;
    let tech = score_technologies(first_present(answers, "technologies", "techStack"));
    let narrative = score_narrative(first_present(answers, "motivation", "about"));
    let experience = score_experience(answers.get("yearsExperience"));

    let score = (BASE_SCORE + tech.score + narrative.score + experience.score).clamp(0, MAX_SCORE);
    let score = score as u8;
    let decision = Decision::from_score(score);

    let strengths = dedup(
        tech.highlights
            .iter()
            .map(|t| format!("{t} expertise"))
            .chain(narrative.strengths)
            .chain(experience.strengths),
    );
    let risks = dedup(narrative.risks.into_iter().chain(experience.risks));

    let closing = match decision {
        Decision::Yes => {
            "Strong technical alignment and communication depth make this applicant worth advancing."
        }
        Decision::Maybe => "Signals are promising but require manual review to confirm fit.",
        Decision::No => {
            "Key competency gaps were detected; review the risks before moving forward."
        }
    };
    let summary = format!(
        "{} is evaluated for {} with a score of {score}. {closing}",
        input.applicant_name, input.form_title
    );

    let resume_text = input.resume_text.as_deref().filter(|t| !t.is_empty());
    let metadata = EvaluationMetadata {
        highlights: Some(tech.highlights),
        resume_included: Some(input.resume_url.is_some() || input.resume_text.is_some()),
        resume_analyzed: Some(resume_text.is_some()),
        resume_text_preview: resume_text.map(|t| preview(t, 500)),
        resume_text: resume_text.map(String::from),
        notes: Some(FALLBACK_NOTE.to_string()),
        ..Default::default()
    };

    EvaluationOutput {
        score,
        decision,
        summary,
        strengths,
        risks,
        metadata,
        source: EvaluationSource::Heuristic,
    }
}

/// `primary` unless it is missing or null, then `fallback`.
fn first_present<'a>(answers: &'a Map<String, Value>, primary: &str, fallback: &str) -> Option<&'a Value> {
    answers
        .get(primary)
        .filter(|v| !v.is_null())
        .or_else(|| answers.get(fallback))
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MOTIVATION: &str = "I enjoy building reliable products with my team every single day. \
        Learning new tools keeps me motivated and curious about the craft of software. \
        I have shipped several React applications used by thousands of people. \
        I want to grow with a team that values learning, ownership, and clear communication.";

    fn input(answers: Value) -> SubmissionInput {
        SubmissionInput {
            applicant_name: "Ada".to_string(),
            answers: answers.as_object().cloned().unwrap(),
            form_title: "Frontend Engineer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_technology_weights_and_unknown_tokens() {
        let signals = score_technologies(Some(&json!("React, TypeScript\nElixir, ,")));
        assert_eq!(signals.score, 10 + 8 + 1);
        assert_eq!(signals.highlights, vec!["react", "typescript"]);
    }

    #[test]
    fn test_technology_score_is_capped() {
        let signals = score_technologies(Some(&json!(
            "react, next, typescript, prisma, postgres, node, graphql"
        )));
        assert_eq!(signals.score, 45);
    }

    #[test]
    fn test_technology_array_answer() {
        let signals = score_technologies(Some(&json!(["GraphQL", "Tailwind"])));
        assert_eq!(signals.score, 7);
    }

    #[test]
    fn test_technology_missing_or_non_text() {
        assert_eq!(score_technologies(None), TechSignals::default());
        assert_eq!(score_technologies(Some(&json!(12))), TechSignals::default());
    }

    #[test]
    fn test_empty_motivation_penalty() {
        let signals = score_narrative(Some(&json!("")));
        assert_eq!(signals.score, -10);
        assert_eq!(signals.risks, vec!["Missing motivation statement"]);

        let missing = score_narrative(None);
        assert_eq!(missing.score, -10);
        let non_text = score_narrative(Some(&json!(42)));
        assert_eq!(non_text.score, -10);
    }

    #[test]
    fn test_long_motivation_earns_every_bonus() {
        let signals = score_narrative(Some(&json!(MOTIVATION)));
        assert!(MOTIVATION.chars().count() > 200);
        assert_eq!(signals.score, 12 + 10 + 4 + 3);
        assert!(signals.risks.is_empty());
    }

    #[test]
    fn test_short_motivation_bonus_and_penalty_stack() {
        let signals = score_narrative(Some(&json!("Love team work.")));
        assert_eq!(signals.score, 4 - 8);
        assert_eq!(signals.strengths, vec!["Mentions collaborative work"]);
        assert_eq!(signals.risks, vec!["Response is too short"]);
    }

    #[test]
    fn test_mid_length_motivation_has_no_length_adjustment() {
        let text = "I would like to join because the product solves a real problem for small local shops.";
        assert!((80..=200).contains(&text.chars().count()));
        let signals = score_narrative(Some(&json!(text)));
        assert_eq!(signals.score, 0);
        assert!(signals.risks.is_empty());
    }

    #[test]
    fn test_experience_bands() {
        assert_eq!(score_experience(Some(&json!(6))).score, 12);
        assert_eq!(score_experience(Some(&json!(5))).score, 12);
        assert_eq!(score_experience(Some(&json!(3.5))).score, 8);
        let junior = score_experience(Some(&json!(1)));
        assert_eq!(junior.score, -5);
        assert_eq!(junior.risks, vec!["Limited commercial experience"]);
        assert_eq!(score_experience(Some(&json!("7"))), ExperienceSignals::default());
        assert_eq!(score_experience(None), ExperienceSignals::default());
    }

    #[test]
    fn test_strong_applicant_is_clamped_to_95() {
        let output = evaluate_heuristically(&input(json!({
            "technologies": "React, TypeScript, Prisma",
            "motivation": MOTIVATION,
            "yearsExperience": 6
        })));
        assert_eq!(output.score, 95);
        assert_eq!(output.decision, Decision::Yes);
        assert_eq!(output.source, EvaluationSource::Heuristic);
        assert_eq!(
            output.strengths[..3],
            ["react expertise", "typescript expertise", "prisma expertise"]
        );
        assert!(output.summary.starts_with("Ada is evaluated for Frontend Engineer with a score of 95."));
        assert!(output.metadata.keyword_matches.is_none());
        assert_eq!(output.metadata.notes.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn test_weak_applicant_scores_no() {
        let output = evaluate_heuristically(&input(json!({"yearsExperience": 0})));
        assert_eq!(output.score, 35);
        assert_eq!(output.decision, Decision::No);
        assert_eq!(
            output.risks,
            vec!["Missing motivation statement", "Limited commercial experience"]
        );
        assert!(output.summary.ends_with("review the risks before moving forward."));
    }

    #[test]
    fn test_tech_stack_used_when_technologies_null() {
        let output = evaluate_heuristically(&input(json!({
            "technologies": null,
            "techStack": "node",
            "about": MOTIVATION
        })));
        // 50 + 5 + 29
        assert_eq!(output.score, 84);
        assert_eq!(output.metadata.highlights, Some(vec!["node".to_string()]));
    }

    #[test]
    fn test_heuristic_is_pure() {
        let submission = input(json!({
            "technologies": "Postgres, Go",
            "motivation": "Short but sweet.",
            "yearsExperience": 3
        }));
        let first = evaluate_heuristically(&submission);
        let second = evaluate_heuristically(&submission);
        assert_eq!(first, second);
        assert_eq!(first.decision, Decision::from_score(first.score));
    }

    #[test]
    fn test_resume_metadata_is_recorded() {
        let mut submission = input(json!({}));
        submission.resume_text = Some("x".repeat(800));
        let output = evaluate_heuristically(&submission);
        assert_eq!(output.metadata.resume_analyzed, Some(true));
        assert_eq!(output.metadata.resume_included, Some(true));
        assert_eq!(output.metadata.resume_text_preview.unwrap().len(), 500);
    }
}
