//! Output Formatting and Display Management
//!
//! Renders a day's [`Totals`] for the terminal or as JSON. None of this feeds
//! back into aggregation; it only decorates the numbers.
//!
//! ## Terminal Layout
//!
//! ```text
//! 💰  Today: $12.34   ★☆☆☆
//! 📈  87.6% away from 5% Club
//! ⏳  wallet-melting...
//!
//! 📥  Input: 1,234
//! 📤  Output: 5,678
//! 💾  Cache read: 90,123
//! ✏️  Cache write: 4,567
//! 📊  Total tokens: 101,602
//!
//! 🌳  0.0 trees worth of CO₂
//! 💧  0L of cooling water used
//! 🔋  6 iPhone charges burned
//! 💡  1 hours of 60W bulb
//! ```

use crate::models::Totals;
use colored::Colorize;
use serde::Serialize;

/// Spend above which the "5% Club" line congratulates instead of counting down
pub const CLUB_THRESHOLD_USD: f64 = 100.0;
/// Top of the percentile curve used for the countdown
pub const TOP_SPEND_USD: f64 = 500.0;

const BURN_MESSAGES: &[&str] = &[
    "wallet-melting...",
    "tree-murdering...",
    "gpu-liquefying...",
    "inheritance-draining...",
    "gpu-sizzling...",
    "cap-dodging...",
    "bank-calling...",
    "savings-evaporating...",
    "budget-destroying...",
    "debt-accumulating...",
];

/// Rough environmental equivalents of a token count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EcoFacts {
    pub trees: f64,
    pub water_liters: f64,
    pub phone_charges: f64,
    pub bulb_hours: f64,
}

impl EcoFacts {
    /// 0.0000006 kWh per token (about 0.3 Wh per 500 tokens)
    pub fn from_tokens(tokens: u64) -> Self {
        let kwh = tokens as f64 * 0.000_000_6;
        Self {
            trees: kwh * 0.4 / 10.0,
            water_liters: kwh * 1.8,
            phone_charges: kwh * 1000.0 / 11.0,
            bulb_hours: kwh / 0.06,
        }
    }
}

/// `$1,234.56`
pub fn format_usd(usd: f64) -> String {
    let cents = (usd.max(0.0) * 100.0).round() as u64;
    format!("${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// One filled star per $50 spent, at least one and at most four.
pub fn spend_stars(usd: f64) -> String {
    let filled = ((usd / 50.0).floor().max(0.0) as usize + 1).min(4);
    format!("{}{}", "★".repeat(filled), "☆".repeat(4 - filled))
}

pub fn club_line(usd: f64) -> String {
    if usd > CLUB_THRESHOLD_USD {
        "🔥  Welcome to the 5% Club!".to_string()
    } else {
        let pct = (usd / TOP_SPEND_USD * 100.0).min(99.9);
        format!("📈  {:.1}% away from 5% Club", 100.0 - pct)
    }
}

pub fn burn_message(seed: usize) -> &'static str {
    BURN_MESSAGES[seed % BURN_MESSAGES.len()]
}

#[derive(Serialize)]
struct TotalsReport<'a> {
    #[serde(flatten)]
    totals: &'a Totals,
    degraded: bool,
    eco: EcoFacts,
}

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    /// Plain lines for a menu or tray; no color codes.
    pub fn summary_lines(&self, totals: &Totals, seed: usize) -> Vec<String> {
        let eco = EcoFacts::from_tokens(totals.tokens);
        vec![
            format!("💰  Today: {}   {}", format_usd(totals.usd), spend_stars(totals.usd)),
            club_line(totals.usd),
            format!("⏳  {}", burn_message(seed)),
            String::new(),
            format!("📥  Input: {}", group_thousands(totals.input)),
            format!("📤  Output: {}", group_thousands(totals.output)),
            format!("💾  Cache read: {}", group_thousands(totals.read)),
            format!("✏️  Cache write: {}", group_thousands(totals.write)),
            format!("📊  Total tokens: {}", group_thousands(totals.tokens)),
            String::new(),
            format!("🌳  {:.1} trees worth of CO₂", eco.trees),
            format!("💧  {:.0}L of cooling water used", eco.water_liters),
            format!("🔋  {:.0} iPhone charges burned", eco.phone_charges),
            format!("💡  {:.0} hours of 60W bulb", eco.bulb_hours),
        ]
    }

    pub fn render_json(&self, totals: &Totals, degraded: bool) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&TotalsReport {
            totals,
            degraded,
            eco: EcoFacts::from_tokens(totals.tokens),
        })
    }

    pub fn display_totals(&self, totals: &Totals, json_output: bool, degraded: bool, seed: usize) {
        if json_output {
            match self.render_json(totals, degraded) {
                Ok(json_str) => println!("{}", json_str),
                Err(e) => eprintln!("Error serializing totals to JSON: {}", e),
            }
            return;
        }

        if degraded {
            println!(
                "{}",
                "⚠️  Refresh failed, showing last known totals".bright_red().bold()
            );
        }

        let lines = self.summary_lines(totals, seed);
        for (i, line) in lines.iter().enumerate() {
            match i {
                0 => println!("{}", line.bright_green().bold()),
                1 => println!("{}", line.bright_yellow()),
                2 => println!("{}", line.dimmed()),
                4..=8 => println!("{}", line.bright_white()),
                _ => println!("{}", line.bright_cyan()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(2.5525), "$2.55");
        assert_eq!(format_usd(1234.5), "$1,234.50");
    }

    #[test]
    fn test_spend_stars() {
        assert_eq!(spend_stars(0.0), "★☆☆☆");
        assert_eq!(spend_stars(49.99), "★☆☆☆");
        assert_eq!(spend_stars(50.0), "★★☆☆");
        assert_eq!(spend_stars(1000.0), "★★★★");
    }

    #[test]
    fn test_club_line() {
        assert_eq!(club_line(0.0), "📈  100.0% away from 5% Club");
        assert_eq!(club_line(50.0), "📈  90.0% away from 5% Club");
        assert_eq!(club_line(150.0), "🔥  Welcome to the 5% Club!");
    }

    #[test]
    fn test_eco_facts() {
        let eco = EcoFacts::from_tokens(1_000_000);
        assert!((eco.water_liters - 1.08).abs() < 1e-9);
        assert!((eco.bulb_hours - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_report_flattens_totals() {
        let totals = Totals {
            usd: 1.5,
            input: 10,
            tokens: 10,
            ..Default::default()
        };
        let json = DisplayManager::new().render_json(&totals, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["usd"], 1.5);
        assert_eq!(value["input"], 10);
        assert_eq!(value["degraded"], false);
        assert!(value["eco"]["trees"].is_number());
    }
}
