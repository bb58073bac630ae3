use anyhow::{anyhow, Context, Result};
use securepass::configtool::AppConfig;
use securepass::passgen::{self, PolicyConstraints};
use securepass::service::{GenerationResult, GenerationService};
use securepass::strength::StrengthReport;
use securepass::textgen::CommandTextGenerator;

use super::{open_store, strength_meter};

pub fn generate(config: &AppConfig, policy: &PolicyConstraints, save: bool) -> Result<()> {
    if !save {
        let password = passgen::generate_password(policy)
            .map_err(|e| anyhow!("Failed to generate password: {}", e))?;
        let report = StrengthReport::assess(&password);
        println!("Generated password: {}", password);
        println!("Entropy: {:.1} bits", report.entropy_bits);
        println!("Strength: {}", strength_meter(report.tier));
        return Ok(());
    }

    let mut service = GenerationService::new(open_store(config)?);
    let result = service.generate_and_record(policy)
        .context("Failed to generate password")?;
    print_result(&result);
    Ok(())
}

pub fn generate_external(config: &AppConfig, prompt: &str) -> Result<()> {
    let argv = config.text_generator.as_deref()
        .ok_or_else(|| anyhow!("No text generator configured. Set `text_generator` in the config file"))?;
    let generator = CommandTextGenerator::from_argv(argv)
        .ok_or_else(|| anyhow!("`text_generator` must name a program"))?
        .with_timeout(config.generator_timeout());

    let mut service = GenerationService::new(open_store(config)?);
    let result = service.record_external(&generator, prompt)
        .context("Failed to generate password")?;
    print_result(&result);
    Ok(())
}

fn print_result(result: &GenerationResult) {
    println!("Generated password: {}", result.password());
    println!("Entropy: {:.1} bits", result.entropy_bits());
    println!("Strength: {}", strength_meter(result.tier));
    println!("Saved to history (ID: {})", result.record.id);
}
