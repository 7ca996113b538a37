//! Named bit ranges of every register

use std::collections::HashSet;

use log::{trace, warn};

use super::{LayoutError, RawRegister};
use crate::util::{self, ToSanitizedFieldName};

/// Registers with these descriptions mirror the fields of the interrupt flag register
const REDUNDANT_ALIASES: [&str; 3] = [
    "Interrupt Enable",
    "Set Interrupt Flag",
    "Clear Interrupt Flag",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitFieldDescriptor {
    pub owner: String,
    pub name: String,
    pub high_bit: u32,
    pub low_bit: u32,
}

/// The bit ranges of one register (or of every member of a register array)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitFieldGroup {
    pub name: String,
    pub register_width: u32,
    pub fields: Vec<BitFieldDescriptor>,
}

fn is_redundant_alias(description: &str) -> bool {
    REDUNDANT_ALIASES.iter().any(|a| description.contains(a))
}

/// Emits one group per register with fields, in source order. An array run emits a single
/// group, from its first member that has fields. Two separate runs that happen to share a
/// name each emit their own group.
pub fn emit<S: AsRef<str>>(
    registers: &[RawRegister],
    strip: &[S],
) -> Result<Vec<BitFieldGroup>, LayoutError> {
    let mut groups = Vec::new();
    let mut names = HashSet::new();
    // Array run whose group is already out
    let mut emitted_run: Option<String> = None;

    for reg in registers {
        let index = util::array_index(&reg.name);
        if index.unwrap_or(0) == 0 {
            emitted_run = None;
        }

        if reg.fields.is_empty() || is_redundant_alias(&reg.description) {
            continue;
        }

        let name = util::register_name(&reg.display_name, strip);
        let name = util::array_name(name.strip_prefix('_').unwrap_or(&name), "");

        if index.is_some() {
            if emitted_run.as_deref() == Some(name.as_str()) {
                continue;
            }
            emitted_run = Some(name.clone());
        }

        let fields = reg
            .fields
            .iter()
            .map(|f| {
                let field_name = util::strip_abbrev(&f.name.to_lowercase(), strip);
                let field_name = match field_name.to_sanitized_field_name() {
                    s if s.is_empty() => f.name.to_lowercase(),
                    s => s.into_owned(),
                };
                let low_bit = f.bit_offset;
                let high_bit = (low_bit + f.bit_width).checked_sub(1);
                match high_bit {
                    Some(high_bit) if f.bit_width != 0 && high_bit < reg.bit_width => {
                        Ok(BitFieldDescriptor {
                            owner: name.clone(),
                            name: field_name,
                            high_bit,
                            low_bit,
                        })
                    }
                    _ => Err(LayoutError::FieldOutOfRange {
                        register: reg.name.clone(),
                        field: f.name.clone(),
                        high: (low_bit + f.bit_width).saturating_sub(1),
                        width: reg.bit_width,
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !names.insert(name.clone()) {
            warn!("Bit-field group {} is emitted more than once", name);
        }
        trace!("Bit-field group {} with {} fields", name, fields.len());
        groups.push(BitFieldGroup {
            name,
            register_width: reg.bit_width,
            fields,
        });
    }

    Ok(groups)
}
