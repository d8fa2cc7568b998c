use colored::Colorize;
use dsa_mechanics::{
    ProbeRequest, QualityLabel, RandomDice, evaluate_probe, perform_three_attribute_probe,
};

pub fn run(
    skill: i32,
    difficulty: i32,
    attributes: &[i32],
    rolls: Option<&[u32]>,
    seed: Option<u64>,
    spell: bool,
) -> Result<(), String> {
    let attributes: [i32; 3] = attributes
        .try_into()
        .map_err(|_| "expected three attribute values, e.g. --attributes 12,13,11".to_string())?;
    let label = if spell {
        QualityLabel::ZfP
    } else {
        QualityLabel::TaP
    };
    let request = ProbeRequest::new(skill, difficulty, attributes).with_label(label);

    let result = match rolls {
        Some(rolls) => {
            let rolls: [u32; 3] = rolls
                .try_into()
                .map_err(|_| "expected three rolls, e.g. --rolls 4,17,9".to_string())?;
            if let Some(bad) = rolls.iter().find(|r| !(1..=20).contains(*r)) {
                return Err(format!("roll {bad} is not a W20 result"));
            }
            evaluate_probe(&request, rolls)
        }
        None => {
            let mut dice = seed.map_or_else(RandomDice::new, RandomDice::seeded);
            perform_three_attribute_probe(&request, &mut dice)
        }
    };

    let line = result.to_string();
    if result.success {
        println!("  {}", line.green());
    } else {
        println!("  {}", line.red());
    }
    Ok(())
}
