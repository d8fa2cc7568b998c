//! Potion and elixir analysis.
//!
//! The analyzer probes against the recipe's analysis difficulty, eased by
//! lore facilitation. The resulting quality points decide what is learned:
//! 8 reveal the shelf life, 13 the exact quality, 19 the full recipe. An
//! analysis by sight alone is unreliable, so its points are halved and
//! capped at 8. Before every further attempt on the same potion the
//! analyzer must pass a self-control probe that grows harder each time.

use dsa_core::{Attribute, Character, KnowledgeLevel, Potion, Recipe};
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::probe::{ProbeRequest, ProbeResult, QualityLabel, perform_three_attribute_probe};

/// Quality points that reveal the shelf life.
pub const SHELF_LIFE_THRESHOLD: i32 = 8;
/// Quality points that reveal the exact quality.
pub const QUALITY_THRESHOLD: i32 = 13;
/// Quality points that reveal the full recipe.
pub const RECIPE_THRESHOLD: i32 = 19;
/// Cap on quality points from an analysis by sight.
pub const BY_SIGHT_CAP: i32 = 8;

/// How the potion is examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMethod {
    /// Look, smell and taste (Sinnenschärfe, KL/IN/IN).
    BySight,
    /// Laboratory analysis (Alchimie, MU/KL/FF).
    Laboratory,
    /// Analysis spell (e.g. ANALYS), probed with the given spell value
    /// on KL/KL/IN.
    Spell {
        /// ZfW of the analysis spell.
        spell_value: i32,
    },
}

impl AnalysisMethod {
    /// The attribute triple probed.
    pub fn attributes(self) -> [Attribute; 3] {
        match self {
            Self::BySight => [Attribute::KL, Attribute::IN, Attribute::IN],
            Self::Laboratory => [Attribute::MU, Attribute::KL, Attribute::FF],
            Self::Spell { .. } => [Attribute::KL, Attribute::KL, Attribute::IN],
        }
    }

    fn skill_value(self, character: &Character) -> MechResult<i32> {
        let skills = &character.skills;
        match self {
            Self::BySight => Ok(skills.sensory_acuity),
            Self::Laboratory if skills.has_alchemy => Ok(skills.alchemy),
            Self::Laboratory => Err(MechError::MissingTalent("Alchimie".into())),
            Self::Spell { spell_value } => Ok(spell_value),
        }
    }

    /// The lore skill that facilitates this method.
    fn facilitating_lore(self, character: &Character) -> i32 {
        let skills = &character.skills;
        match self {
            Self::BySight if skills.has_alchemy => skills.alchemy,
            Self::BySight => 0,
            Self::Laboratory | Self::Spell { .. } => skills.magical_lore,
        }
    }

    fn label(self) -> QualityLabel {
        match self {
            Self::Spell { .. } => QualityLabel::ZfP,
            _ => QualityLabel::TaP,
        }
    }
}

/// Facilitation granted by a lore skill: +1 for every full 3 points above 7.
pub fn lore_facilitation(lore: i32) -> i32 {
    (lore - 7).max(0) / 3
}

/// What an analysis revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFindings {
    /// Shelf life revealed.
    pub shelf_life: bool,
    /// Exact quality revealed.
    pub exact_quality: bool,
    /// Full recipe revealed.
    pub recipe: bool,
}

impl AnalysisFindings {
    /// Findings for the given quality points.
    pub fn from_points(points: i32) -> Self {
        Self {
            shelf_life: points >= SHELF_LIFE_THRESHOLD,
            exact_quality: points >= QUALITY_THRESHOLD,
            recipe: points >= RECIPE_THRESHOLD,
        }
    }
}

/// Inputs of an analysis attempt.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    /// The analyzer.
    pub character: &'a Character,
    /// Recipe of the potion being analysed.
    pub recipe: &'a Recipe,
    /// Method used.
    pub method: AnalysisMethod,
    /// Extra facilitation, e.g. from reference works.
    pub extra_facilitation: i32,
    /// Situational difficulty modifier.
    pub modifier: i32,
}

impl<'a> AnalysisRequest<'a> {
    /// An unmodified attempt with `method`.
    pub fn new(character: &'a Character, recipe: &'a Recipe, method: AnalysisMethod) -> Self {
        Self {
            character,
            recipe,
            method,
            extra_facilitation: 0,
            modifier: 0,
        }
    }
}

/// Outcome of an analysis attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The underlying probe.
    pub probe: ProbeResult,
    /// Net difficulty probed against.
    pub difficulty: i32,
    /// Quality points after method adjustments.
    pub quality_points: i32,
    /// What was learned.
    pub findings: AnalysisFindings,
}

/// Analyse a potion.
pub fn analyze_potion(
    request: &AnalysisRequest<'_>,
    dice: &mut impl DiceRoller,
) -> MechResult<AnalysisResult> {
    let character = request.character;
    let method = request.method;
    let skill = method.skill_value(character)?;
    let facilitation =
        lore_facilitation(method.facilitating_lore(character)) + request.extra_facilitation;
    let difficulty = request.recipe.analysis_difficulty - facilitation + request.modifier;

    let probe = perform_three_attribute_probe(
        &ProbeRequest::new(skill, difficulty, character.attributes.triple(method.attributes()))
            .with_label(method.label()),
        dice,
    );
    let quality_points = match (probe.success, method) {
        (false, _) => 0,
        (true, AnalysisMethod::BySight) => (probe.quality_points / 2).min(BY_SIGHT_CAP),
        (true, _) => probe.quality_points,
    };

    Ok(AnalysisResult {
        probe,
        difficulty,
        quality_points,
        findings: AnalysisFindings::from_points(quality_points),
    })
}

/// Fold an analysis into the potion's analysis state. Knowledge only ever
/// grows: a worse attempt never hides what was already revealed.
pub fn apply_analysis(potion: &Potion, result: &AnalysisResult) -> Potion {
    let findings = result.findings;
    Potion {
        analysis_attempts: potion.analysis_attempts + 1,
        best_analysis_points: potion.best_analysis_points.max(result.quality_points),
        shelf_life_known: potion.shelf_life_known || findings.shelf_life,
        known_quality: if findings.exact_quality {
            Some(potion.actual_quality)
        } else {
            potion.known_quality
        },
        recipe_revealed: potion.recipe_revealed || findings.recipe,
        ..potion.clone()
    }
}

/// Recipe knowledge gained from an analysis with `points`.
pub fn knowledge_from_points(points: i32) -> KnowledgeLevel {
    if points >= RECIPE_THRESHOLD {
        KnowledgeLevel::Understood
    } else if points >= QUALITY_THRESHOLD {
        KnowledgeLevel::Rough
    } else {
        KnowledgeLevel::Unknown
    }
}

/// Raise `current` to what `points` reveal, never lowering it.
pub fn upgrade_knowledge(current: KnowledgeLevel, points: i32) -> KnowledgeLevel {
    current.max(knowledge_from_points(points))
}

/// Self-control probe (MU/KO/KK) before the `attempt`-th analysis of the
/// same potion. The difficulty is `attempt - 1`.
pub fn self_control_probe(
    character: &Character,
    attempt: u32,
    dice: &mut impl DiceRoller,
) -> ProbeResult {
    let difficulty = attempt as i32 - 1;
    perform_three_attribute_probe(
        &ProbeRequest::new(
            character.skills.self_control,
            difficulty,
            character
                .attributes
                .triple([Attribute::MU, Attribute::KO, Attribute::KK]),
        ),
        dice,
    )
}

#[cfg(test)]
mod tests {
    use dsa_core::{Attributes, PotionQuality, Skills};

    use super::*;
    use crate::dice::ScriptedDice;

    fn analyst(skills: Skills) -> Character {
        Character::new("Rhonda")
            .with_attributes(Attributes::uniform(14))
            .with_skills(skills)
    }

    #[test]
    fn facilitation_per_three_points_above_seven() {
        assert_eq!(lore_facilitation(0), 0);
        assert_eq!(lore_facilitation(7), 0);
        assert_eq!(lore_facilitation(9), 0);
        assert_eq!(lore_facilitation(10), 1);
        assert_eq!(lore_facilitation(16), 3);
    }

    #[test]
    fn findings_thresholds() {
        assert_eq!(AnalysisFindings::from_points(7), AnalysisFindings::default());
        let f = AnalysisFindings::from_points(13);
        assert!(f.shelf_life && f.exact_quality && !f.recipe);
        assert!(AnalysisFindings::from_points(19).recipe);
    }

    #[test]
    fn by_sight_halves_and_caps() {
        let c = analyst(Skills {
            sensory_acuity: 25,
            ..Skills::default()
        });
        let recipe = Recipe::new("Zaubertrank", 5, 0);
        let r = analyze_potion(
            &AnalysisRequest::new(&c, &recipe, AnalysisMethod::BySight),
            &mut ScriptedDice::new([3, 3, 3]),
        )
        .unwrap();
        assert_eq!(r.probe.quality_points, 25);
        assert_eq!(r.quality_points, BY_SIGHT_CAP);
        assert!(r.findings.shelf_life);
        assert!(!r.findings.exact_quality);
    }

    #[test]
    fn laboratory_uses_magical_lore_facilitation() {
        let c = analyst(Skills {
            alchemy: 18,
            has_alchemy: true,
            magical_lore: 13,
            ..Skills::default()
        });
        let recipe = Recipe::new("Zaubertrank", 5, 4);
        let r = analyze_potion(
            &AnalysisRequest::new(&c, &recipe, AnalysisMethod::Laboratory),
            &mut ScriptedDice::new([3, 3, 3]),
        )
        .unwrap();
        assert_eq!(r.difficulty, 2);
        assert_eq!(r.quality_points, 16);
        assert!(r.findings.exact_quality);
    }

    #[test]
    fn laboratory_requires_alchemy() {
        let c = analyst(Skills::default());
        let recipe = Recipe::new("Zaubertrank", 5, 4);
        let err = analyze_potion(
            &AnalysisRequest::new(&c, &recipe, AnalysisMethod::Laboratory),
            &mut ScriptedDice::new([3]),
        );
        assert!(matches!(err, Err(MechError::MissingTalent(_))));
    }

    #[test]
    fn spell_analysis_reports_zfp() {
        let c = analyst(Skills::default());
        let recipe = Recipe::new("Zaubertrank", 5, 0);
        let r = analyze_potion(
            &AnalysisRequest::new(&c, &recipe, AnalysisMethod::Spell { spell_value: 20 }),
            &mut ScriptedDice::new([2, 2, 2]),
        )
        .unwrap();
        assert_eq!(r.probe.label, QualityLabel::ZfP);
        assert!(r.findings.recipe);
    }

    #[test]
    fn apply_analysis_never_forgets() {
        let mut potion = Potion::new(1, Some(2), PotionQuality::D);
        potion.shelf_life_known = true;
        potion.best_analysis_points = 10;
        let weak = AnalysisResult {
            probe: crate::probe::evaluate_probe(&ProbeRequest::new(1, 0, [10, 10, 10]), [15, 15, 15]),
            difficulty: 0,
            quality_points: 0,
            findings: AnalysisFindings::default(),
        };
        let after = apply_analysis(&potion, &weak);
        assert_eq!(after.analysis_attempts, 1);
        assert!(after.shelf_life_known);
        assert_eq!(after.best_analysis_points, 10);
        assert_eq!(after.guid, potion.guid);

        let strong = AnalysisResult {
            quality_points: 14,
            findings: AnalysisFindings::from_points(14),
            ..weak
        };
        let after = apply_analysis(&after, &strong);
        assert_eq!(after.known_quality, Some(PotionQuality::D));
        assert_eq!(after.best_analysis_points, 14);
        assert!(!after.recipe_revealed);
    }

    #[test]
    fn knowledge_only_grows() {
        assert_eq!(knowledge_from_points(12), KnowledgeLevel::Unknown);
        assert_eq!(knowledge_from_points(13), KnowledgeLevel::Rough);
        assert_eq!(knowledge_from_points(19), KnowledgeLevel::Understood);
        assert_eq!(
            upgrade_knowledge(KnowledgeLevel::Understood, 3),
            KnowledgeLevel::Understood
        );
    }

    #[test]
    fn self_control_gets_harder() {
        let c = analyst(Skills {
            self_control: 3,
            ..Skills::default()
        });
        let first = self_control_probe(&c, 1, &mut ScriptedDice::new([14, 14, 14]));
        assert!(first.success);
        assert_eq!(first.quality_points, 3);
        let fifth = self_control_probe(&c, 5, &mut ScriptedDice::new([14, 14, 14]));
        assert!(!fifth.success);
    }
}
