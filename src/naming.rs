//! Output names of peripherals and the abbreviations stripped from their registers

use anyhow::{Context, Result};
use log::trace;
use regex::Regex;

use crate::util::ToCapitalized;

/// Rewrites peripherals whose SVD name matches `pattern`. `name` and `strip` may refer to
/// the pattern's capture groups (`$1`, `${idx}`).
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeripheralRule {
    pub pattern: String,
    pub name: String,
    pub strip: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Naming {
    pub name: String,
    pub strip: Vec<String>,
}

impl Naming {
    /// `TIMER32` becomes `Timer32`, `WDT_A` becomes `WdtA`, stripping the lower-cased name
    pub fn default_for(peripheral: &str) -> Self {
        let name: String = peripheral
            .split('_')
            .take(2)
            .map(ToCapitalized::to_capitalized)
            .collect();
        let strip = vec![name.to_lowercase()];
        Self { name, strip }
    }
}

#[derive(Debug, Default)]
pub struct Namer {
    rules: Vec<(Regex, PeripheralRule)>,
}

impl Namer {
    pub fn new(rules: &[PeripheralRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<_> {
                let re = Regex::new(&format!("^(?:{})$", rule.pattern))
                    .with_context(|| format!("Invalid peripheral pattern `{}`", rule.pattern))?;
                Ok((re, rule.clone()))
            })
            .collect::<Result<_>>()?;
        Ok(Self { rules })
    }

    /// First matching rule wins, peripherals no rule matches get [`Naming::default_for`].
    pub fn name(&self, peripheral: &str) -> Naming {
        for (re, rule) in &self.rules {
            if let Some(caps) = re.captures(peripheral) {
                let expand = |template: &str| {
                    let mut s = String::new();
                    caps.expand(template, &mut s);
                    s
                };
                trace!("Peripheral {} matches `{}`", peripheral, rule.pattern);
                return Naming {
                    name: expand(&rule.name),
                    strip: rule.strip.iter().map(|s| expand(s)).collect(),
                };
            }
        }
        Naming::default_for(peripheral)
    }
}
