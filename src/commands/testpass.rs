use securepass::passgen;
use securepass::strength::{self, StrengthReport};

use super::strength_meter;

pub fn test_password(password: &str, check_url_safe: bool, check_confusion: bool) {
    let report = StrengthReport::assess(password);
    println!("Entropy: {:.1} bits", report.entropy_bits);
    println!("Strength: {}", strength_meter(report.tier));

    let (rating, score, feedback) = strength::assess_password_strength(password);
    println!("Pattern analysis: {} (score: {}/4)", rating, score);
    if !feedback.is_empty() {
        println!("Suggestions: {}", feedback);
    }

    if check_url_safe {
        let is_safe = passgen::check_url_safe(password);
        println!("URL-safe: {}", if is_safe { "Yes" } else { "No" });
    }

    if check_confusion {
        let confusing = passgen::check_confusing_chars(password);
        if !confusing.is_empty() {
            println!("Potentially confusing characters: {:?}", confusing);
        } else {
            println!("No confusing characters detected");
        }
    }
}
