//! Flattens parsed SVD peripherals into the register lists layouts are built from

use anyhow::{anyhow, Result};
use log::{debug, trace};

use crate::layout::{RawField, RawPeripheral, RawRegister};
use crate::svd::{Cluster, Device, Field, MaybeArray, PeripheralInfo, Register, RegisterCluster};
use crate::util;

/// Registers of `p` in source order, with register arrays expanded into their members
/// (`CTL[%s]` becomes `CTL[0]`, `CTL[1]`, ..). A peripheral derived from another one without
/// registers of its own takes the registers of its ancestor. Clusters are flattened into
/// plain registers at their absolute offset.
pub fn raw_peripheral(p: &PeripheralInfo, device: &Device) -> Result<RawPeripheral> {
    let registers = match (&p.registers, &p.derived_from) {
        (None, Some(df)) => device
            .peripherals
            .iter()
            .find(|x| x.name == *df)
            .ok_or_else(|| anyhow!("Couldn't find derivedFrom original: {} for {}", df, p.name))?
            .registers
            .as_deref()
            .unwrap_or(&[]),
        (registers, _) => registers.as_deref().unwrap_or(&[]),
    };

    let mut out = Vec::new();
    expand_children(registers, 0, "", &mut out)?;
    debug!("{} has {} registers", p.name, out.len());

    Ok(RawPeripheral {
        name: p.name.clone(),
        base_address: p.base_address,
        registers: out,
    })
}

/// Flattens registers and clusters found at `base` (relative to the peripheral). Registers of a
/// cluster array get the member name as `prefix`, `CH[%s]` makes `CH0_SRC`, `CH1_SRC`, ..
fn expand_children(
    children: &[RegisterCluster],
    base: u32,
    prefix: &str,
    out: &mut Vec<RawRegister>,
) -> Result<()> {
    for erc in children {
        match erc {
            RegisterCluster::Register(reg) => expand_register(reg, base, prefix, out)?,
            RegisterCluster::Cluster(cluster) => expand_cluster(cluster, base, prefix, out)?,
        }
    }
    Ok(())
}

fn expand_cluster(
    cluster: &Cluster,
    base: u32,
    prefix: &str,
    out: &mut Vec<RawRegister>,
) -> Result<()> {
    let offset = |i: u32, increment: u32| {
        i.checked_mul(increment)
            .and_then(|o| o.checked_add(cluster.address_offset))
            .and_then(|o| o.checked_add(base))
            .ok_or_else(|| anyhow!("Cluster {} is outside of the address space", cluster.name))
    };
    match cluster {
        MaybeArray::Single(info) => {
            trace!("Flattening cluster {} at +0x{:X}", info.name, info.address_offset);
            expand_children(&info.children, offset(0, 0)?, prefix, out)
        }
        MaybeArray::Array(info, dim) => {
            for (i, idx) in dim.indexes().enumerate() {
                let name = util::replace_suffix(&info.name, &idx).replace(['[', ']'], "");
                let prefix = format!("{prefix}{name}_");
                let base = offset(i as u32, dim.dim_increment)?;
                expand_children(&info.children, base, &prefix, out)?;
            }
            Ok(())
        }
    }
}

fn expand_register(
    reg: &Register,
    base: u32,
    prefix: &str,
    out: &mut Vec<RawRegister>,
) -> Result<()> {
    let bit_width = reg
        .properties
        .size
        .ok_or_else(|| anyhow!("Register {} has no `size` field", reg.name))?;
    let address_offset = reg
        .address_offset
        .checked_add(base)
        .ok_or_else(|| anyhow!("Register {} is outside of the address space", reg.name))?;

    let template = RawRegister {
        address_offset,
        bit_width,
        display_name: format!(
            "{prefix}{}",
            reg.display_name.as_deref().unwrap_or(&reg.name)
        ),
        name: format!("{prefix}{}", reg.name),
        access: reg.properties.access.map(|a| a.as_str().to_string()),
        description: util::respace(reg.description.as_deref().unwrap_or(&reg.name)),
        fields: expand_fields(reg.fields.as_deref().unwrap_or(&[])),
    };

    match reg {
        MaybeArray::Single(_) => out.push(template),
        MaybeArray::Array(info, dim) => {
            for (i, idx) in dim.indexes().enumerate() {
                let address_offset = template.address_offset + i as u32 * dim.dim_increment;
                let name = format!("{prefix}{}", util::replace_suffix(&info.name, &idx));
                // Only `[%s]` members with numeric indices make up an array run
                let is_run =
                    info.name.contains(util::ARRAY_PLACEHOLDER) && idx.parse::<u32>().is_ok();
                let (name, display_name) = if is_run {
                    (name, template.display_name.clone())
                } else {
                    let name = name.replace(['[', ']'], "");
                    (name.clone(), name)
                };
                out.push(RawRegister {
                    address_offset,
                    display_name,
                    name,
                    ..template.clone()
                });
            }
        }
    }
    Ok(())
}

fn expand_fields(fields: &[Field]) -> Vec<RawField> {
    let mut out = Vec::with_capacity(fields.len());
    for f in fields {
        match f {
            MaybeArray::Single(info) => out.push(RawField {
                name: info.name.clone(),
                bit_offset: info.bit_range.offset,
                bit_width: info.bit_range.width,
            }),
            MaybeArray::Array(info, dim) => {
                for (i, idx) in dim.indexes().enumerate() {
                    out.push(RawField {
                        name: util::replace_suffix(&info.name, &idx).replace(['[', ']'], ""),
                        bit_offset: info.bit_range.offset + i as u32 * dim.dim_increment,
                        bit_width: info.bit_range.width,
                    });
                }
            }
        }
    }
    out
}
