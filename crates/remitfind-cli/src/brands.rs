//! `canonicalize` and `rules`: inspect how labels map onto brands.

use remitfind_client::BrandConfigClient;
use remitfind_core::{AliasRule, AppConfig};
use remitfind_engine::{canonicalize, AliasTable};

use crate::find::alias_table;

/// One row of `canonicalize` output.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LabelReport<'a> {
    pub label: &'a str,
    pub canonical: Option<&'static str>,
    pub brand: Option<&'a str>,
}

pub(crate) fn describe_label<'a>(label: &'a str, table: &'a AliasTable) -> LabelReport<'a> {
    LabelReport {
        label,
        canonical: canonicalize(label),
        brand: table.resolve(label),
    }
}

/// Print the canonical key and resolved display brand for each label.
///
/// # Errors
///
/// Returns an error if the configured alias file cannot be loaded.
pub(crate) fn run_canonicalize(config: &AppConfig, labels: &[String]) -> anyhow::Result<()> {
    let table = alias_table(config)?;
    println!("{:<40}{:<18}BRAND", "LABEL", "CANONICAL");
    for label in labels {
        let report = describe_label(label, &table);
        println!(
            "{:<40}{:<18}{}",
            truncate(report.label, 38),
            report.canonical.unwrap_or("-"),
            report.brand.unwrap_or("-")
        );
    }
    Ok(())
}

/// Print the alias rules in evaluation order: rules served by the
/// brand-configuration service (when configured and reachable) first, then
/// the static table.
///
/// # Errors
///
/// Returns an error if the configured alias file cannot be loaded or the
/// brand-configuration URL is unusable.
pub(crate) async fn run_rules(config: &AppConfig) -> anyhow::Result<()> {
    let mut table = alias_table(config)?;

    if let Some(url) = config.brand_config_url.as_deref() {
        let client = BrandConfigClient::new(url, config.request_timeout_secs, &config.user_agent)?;
        match client.fetch().await {
            Ok(Some(overrides)) => table.set_dynamic(overrides.aliases),
            Ok(None) => tracing::debug!("brand configuration service has no overrides"),
            Err(e) => {
                tracing::debug!(error = %e, "brand configuration unavailable; showing static rules");
            }
        }
    }

    println!("{:<10}{:<28}BRAND", "SOURCE", "MATCH");
    print_rules("dynamic", table.dynamic());
    print_rules("static", table.fallback());
    Ok(())
}

fn print_rules(source: &str, rules: &[AliasRule]) {
    for rule in rules {
        println!(
            "{:<10}{:<28}{}",
            source,
            truncate(&rule.match_substring, 26),
            rule.canonical_brand
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
